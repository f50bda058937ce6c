//! Tests for the robust Poisson mean estimator.
//!
//! These tests verify the estimator's convergence behaviour, its
//! resistance to outliers, and the defined handling of degenerate inputs:
//! - Immediate convergence on constant samples
//! - Bounded outlier influence versus the arithmetic mean
//! - Order independence
//! - Degenerate inputs (empty sample, zero iteration bound)

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};

use bgfit_rs::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

fn arithmetic_mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

// ============================================================================
// Convergence
// ============================================================================

#[test]
fn constant_sample_converges_in_one_iteration() {
    let sample = vec![10.0; 25];
    let est = RobustPoissonMean::new(&sample, 10.0, 1.345, 1e-3, 100);

    assert!(est.converged());
    assert_eq!(est.niter(), 1);
    assert_eq!(est.mean(), 10.0);
}

#[test]
fn constant_zero_sample_is_a_valid_mean() {
    let sample = vec![0.0; 10];
    let est = RobustPoissonMean::new(&sample, 0.0, 1.345, 1e-3, 100);

    assert!(est.converged());
    assert_eq!(est.mean(), 0.0);
}

#[test]
fn converges_from_a_poor_initial_guess() {
    let sample = vec![10.0; 25];
    let est = RobustPoissonMean::new(&sample, 500.0, 1.345, 1e-3, 100);

    assert!(est.converged());
    assert_relative_eq!(est.mean(), 10.0, epsilon = 1e-9);
}

#[test]
fn negative_initial_guess_is_clamped() {
    let sample = vec![10.0; 25];
    let est = RobustPoissonMean::new(&sample, -5.0, 1.345, 1e-3, 100);

    assert!(est.converged());
    assert!(est.mean() >= 0.0);
    assert_relative_eq!(est.mean(), 10.0, epsilon = 1e-9);
}

// ============================================================================
// Outlier Resistance
// ============================================================================

#[test]
fn outlier_is_downweighted_not_followed() {
    let mut sample = vec![10.0; 24];
    sample.push(1000.0);

    let naive = arithmetic_mean(&sample);
    let est = RobustPoissonMean::new(&sample, naive, 1.345, 1e-3, 100);

    assert!(est.converged());
    // Strictly closer to the clean value than the arithmetic mean, and
    // still above it because the outlier keeps a positive weight.
    assert!(est.mean() < naive);
    assert!(est.mean() > 10.0);
    assert!((est.mean() - 10.0).abs() < 2.0);
}

#[test]
fn estimate_is_order_independent() {
    let sample: Vec<f64> = (0..40).map(|i| ((i * 7) % 13) as f64 + 2.0).collect();
    let mean0 = arithmetic_mean(&sample);

    let mut shuffled = sample.clone();
    let mut rng = StdRng::seed_from_u64(42);
    shuffled.shuffle(&mut rng);

    let a = RobustPoissonMean::new(&sample, mean0, 1.345, 1e-3, 100);
    let b = RobustPoissonMean::new(&shuffled, mean0, 1.345, 1e-3, 100);

    assert_eq!(a.niter(), b.niter());
    assert_relative_eq!(a.mean(), b.mean(), epsilon = 1e-12);
}

#[test]
fn recovers_the_mean_of_poisson_counts() {
    let mut rng = StdRng::seed_from_u64(7);
    let poisson = Poisson::new(10.0).unwrap();
    let sample: Vec<f64> = (0..200).map(|_| poisson.sample(&mut rng)).collect();

    let est = RobustPoissonMean::new(&sample, arithmetic_mean(&sample), 1.345, 1e-3, 100);

    assert!(est.converged());
    assert!(est.mean() > 8.0 && est.mean() < 12.0);
}

// ============================================================================
// Degenerate Inputs
// ============================================================================

#[test]
fn empty_sample_keeps_the_initial_guess() {
    let est = RobustPoissonMean::new(&[], 3.5_f64, 1.345, 1e-3, 100);

    assert!(!est.converged());
    assert_eq!(est.niter(), 0);
    assert_eq!(est.mean(), 3.5);
}

#[test]
fn zero_iteration_bound_performs_no_work() {
    let sample = vec![10.0, 12.0, 9.0, 11.0];
    let est = RobustPoissonMean::new(&sample, 5.0, 1.345, 1e-3, 0);

    assert!(!est.converged());
    assert_eq!(est.niter(), 0);
    assert_eq!(est.mean(), 5.0);
}

#[test]
fn iteration_bound_is_respected() {
    let mut sample = vec![10.0; 24];
    sample.push(1000.0);

    // One iteration from a bad guess cannot reach the tolerance.
    let est = RobustPoissonMean::new(&sample, 500.0, 1.345, 1e-3, 1);

    assert!(!est.converged());
    assert_eq!(est.niter(), 1);
}
