#![cfg(feature = "dev")]
//! Tests for the pure math layer.
//!
//! These tests pin the documented numeric choices:
//! - The Anscombe transform and standardised residuals
//! - Poisson deviance residuals (including the zero-count limit)
//! - Sample moments and the dispersion index
//! - The normal-equation solver

use approx::assert_relative_eq;

use bgfit_rs::internals::math::anscombe::{anscombe, standardized_residual};
use bgfit_rs::internals::math::deviance::deviance_residual;
use bgfit_rs::internals::math::linalg::FloatLinalg;
use bgfit_rs::internals::math::moments::{
    dispersion_index, mean, mean_squared_error, variance,
};

// ============================================================================
// Anscombe Transform
// ============================================================================

#[test]
fn anscombe_matches_the_documented_formula() {
    assert_relative_eq!(anscombe(0.0_f64), 2.0 * 0.375_f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(anscombe(10.0_f64), 2.0 * 10.375_f64.sqrt(), epsilon = 1e-12);
}

#[test]
fn residual_is_zero_at_the_mean_and_signed() {
    assert_eq!(standardized_residual(10.0_f64, 10.0), 0.0);
    assert!(standardized_residual(20.0_f64, 10.0) > 0.0);
    assert!(standardized_residual(5.0_f64, 10.0) < 0.0);
}

#[test]
fn residual_is_near_unit_scale_for_poisson_noise() {
    // One-sigma excursions of Poisson(m) land near |residual| = 1.
    for m in [5.0_f64, 50.0, 500.0] {
        let r = standardized_residual(m + m.sqrt(), m).abs();
        assert!(r > 0.8 && r < 1.2, "m={}: r={}", m, r);
    }
}

// ============================================================================
// Deviance Residuals
// ============================================================================

#[test]
fn deviance_residual_is_zero_at_the_fit_and_signed() {
    assert_eq!(deviance_residual(10.0_f64, 10.0), 0.0);
    assert!(deviance_residual(20.0_f64, 10.0) > 0.0);
    assert!(deviance_residual(5.0_f64, 10.0) < 0.0);
}

#[test]
fn deviance_residual_zero_count_limit() {
    // d(0, mu) = 2*mu, so the residual is -sqrt(2*mu).
    assert_relative_eq!(
        deviance_residual(0.0_f64, 8.0),
        -4.0,
        epsilon = 1e-12
    );
}

// ============================================================================
// Moments
// ============================================================================

#[test]
fn moments_on_simple_samples() {
    assert_eq!(mean::<f64>(&[]), 0.0);
    assert_relative_eq!(mean(&[1.0_f64, 2.0, 3.0]), 2.0, epsilon = 1e-12);

    assert_eq!(variance(&[5.0_f64]), 0.0);
    assert_relative_eq!(variance(&[1.0_f64, 2.0, 3.0]), 1.0, epsilon = 1e-12);
}

#[test]
fn dispersion_index_is_variance_over_mean() {
    // Poisson-like: variance ~ mean gives dispersion ~ 1.
    let values = [8.0_f64, 10.0, 12.0, 9.0, 11.0];
    let expected = variance(&values) / mean(&values);
    assert_relative_eq!(dispersion_index(&values), expected, epsilon = 1e-12);

    // Defined at a zero mean.
    assert_eq!(dispersion_index(&[0.0_f64, 0.0]), 0.0);
}

#[test]
fn mse_against_a_fitted_surface() {
    let observed = [10.0_f64, 12.0, 8.0];
    let fitted = [10.0_f64, 10.0, 10.0];
    assert_relative_eq!(
        mean_squared_error(&observed, &fitted),
        8.0 / 3.0,
        epsilon = 1e-12
    );
}

// ============================================================================
// Normal Equations
// ============================================================================

#[test]
fn solver_handles_a_small_spd_system() {
    // [[4, 1], [1, 3]] * beta = [1, 2]  =>  beta = [1/11, 7/11]
    let a = [4.0_f64, 1.0, 1.0, 3.0];
    let b = [1.0_f64, 2.0];
    let beta = f64::solve_normal(&a, &b, 2).unwrap();

    assert_relative_eq!(beta[0], 1.0 / 11.0, epsilon = 1e-10);
    assert_relative_eq!(beta[1], 7.0 / 11.0, epsilon = 1e-10);
}

#[test]
fn solver_survives_a_singular_system() {
    // Rank-1 matrix: QR cannot solve it; the SVD fallback returns a
    // least-squares solution instead of panicking.
    let a = [1.0_f64, 1.0, 1.0, 1.0];
    let b = [2.0_f64, 2.0];
    let beta = f64::solve_normal(&a, &b, 2);
    assert!(beta.is_some());
}
