//! Log-linear Poisson background model.
//!
//! ## Purpose
//!
//! Fits a generalised linear model with a log link — background intensity
//! `exp(X * beta)` over pixel position — to the background-eligible pixels
//! of a plane or volume, by iteratively reweighted least squares.
//!
//! ## Design notes
//!
//! * **IRLS**: working weights `mu`, working response
//!   `eta + (y - mu) / mu`; the weighted normal equations are solved by the
//!   nalgebra backend (`math::linalg`).
//! * **Rejection**: once the coefficients stabilise, pixels whose Poisson
//!   deviance residual exceeds [`DEVIANCE_THRESHOLD`] are excluded and the
//!   fit resumes without them. Exclusion is monotonic within one call —
//!   a pixel is never re-admitted.
//! * **Convergence**: maximum relative coefficient change below the
//!   tolerance, with magnitudes floored at 1 so near-zero slope terms do
//!   not stall the criterion.
//!
//! ## Invariants
//!
//! * `included` entries only ever flip from `true` to `false`.
//! * Fitted means are kept strictly positive (floored) so the link and the
//!   deviance stay defined.
//!
//! ## Non-goals
//!
//! * Basis construction (which columns `X` has) belongs to the engine's
//!   modeller; this module consumes a ready design matrix.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::deviance::deviance_residual;
use crate::math::linalg::FloatLinalg;

// ============================================================================
// Constants
// ============================================================================

/// Rejection threshold on the magnitude of the Poisson deviance residual.
///
/// Deviance residuals are approximately standard normal under the model, so
/// 3.0 corresponds to the usual three-sigma rule.
pub const DEVIANCE_THRESHOLD: f64 = 3.0;

/// Floor applied to fitted means, keeping `ln` and division defined.
const MEAN_FLOOR: f64 = 1e-3;

/// Clamp on the linear predictor so `exp` stays finite in f32.
const ETA_LIMIT: f64 = 30.0;

// ============================================================================
// Fit Result
// ============================================================================

/// Converged (or iteration-bounded) state of one log-linear fit.
#[derive(Debug, Clone)]
pub struct GlmFit<T: Float> {
    /// Fitted coefficients, one per design column.
    pub coefficients: Vec<T>,

    /// IRLS iterations performed.
    pub niter: usize,

    /// Whether the coefficient change fell below the tolerance.
    pub converged: bool,
}

// ============================================================================
// Fitting
// ============================================================================

/// Fit `counts ~ Poisson(exp(design * beta))` over the included rows.
///
/// `design` is row-major with `n_coeffs` columns, one row per observation.
/// Rows whose deviance residual exceeds the threshold after the fit
/// stabilises are marked excluded in `included` (monotonically) and the fit
/// restarts from the current coefficients.
///
/// Returns `None` when the included set is smaller than the coefficient
/// count or the normal equations are singular — the caller reports that as
/// fit failure, not as an error.
pub fn fit_poisson_log_linear<T: FloatLinalg>(
    counts: &[T],
    design: &[T],
    n_coeffs: usize,
    included: &mut [bool],
    tolerance: T,
    max_iter: usize,
) -> Option<GlmFit<T>> {
    debug_assert_eq!(counts.len() * n_coeffs, design.len());
    debug_assert_eq!(counts.len(), included.len());

    let floor = T::from(MEAN_FLOOR).unwrap();
    let eta_limit = T::from(ETA_LIMIT).unwrap();
    let threshold = T::from(DEVIANCE_THRESHOLD).unwrap();

    let mut beta = initial_coefficients(counts, included, n_coeffs, floor)?;
    let mut xtw_x = vec![T::zero(); n_coeffs * n_coeffs];
    let mut xtw_z = vec![T::zero(); n_coeffs];

    let mut niter = 0;
    let mut converged = false;

    while niter < max_iter {
        if included.iter().filter(|&&inc| inc).count() < n_coeffs {
            return None;
        }

        // Assemble the weighted normal equations over the included rows.
        for v in xtw_x.iter_mut() {
            *v = T::zero();
        }
        for v in xtw_z.iter_mut() {
            *v = T::zero();
        }
        for (i, &y) in counts.iter().enumerate() {
            if !included[i] {
                continue;
            }
            let row = &design[i * n_coeffs..(i + 1) * n_coeffs];
            let eta = dot(row, &beta).max(-eta_limit).min(eta_limit);
            let mu = eta.exp().max(floor);
            let z = eta + (y - mu) / mu;
            // Working weight for the log link is mu itself.
            for j in 0..n_coeffs {
                for k in 0..n_coeffs {
                    xtw_x[j * n_coeffs + k] = xtw_x[j * n_coeffs + k] + mu * row[j] * row[k];
                }
                xtw_z[j] = xtw_z[j] + mu * row[j] * z;
            }
        }

        let next = T::solve_normal(&xtw_x, &xtw_z, n_coeffs)?;
        niter += 1;

        let change = max_relative_change(&beta, &next);
        beta = next;

        if change < tolerance {
            // Stable coefficients: run the deviance rejection pass. Any
            // newly excluded pixel restarts the iteration without it.
            let newly_rejected =
                reject_outliers(counts, design, n_coeffs, &beta, included, floor, threshold);
            if newly_rejected == 0 {
                converged = true;
                break;
            }
        }
    }

    Some(GlmFit {
        coefficients: beta,
        niter,
        converged,
    })
}

/// Evaluate the fitted background at one design row.
#[inline]
pub fn evaluate<T: Float>(row: &[T], coefficients: &[T]) -> T {
    let eta_limit = T::from(ETA_LIMIT).unwrap();
    dot(row, coefficients).max(-eta_limit).min(eta_limit).exp()
}

// ============================================================================
// Helpers
// ============================================================================

/// Start from a flat surface at the mean of the included counts.
fn initial_coefficients<T: Float>(
    counts: &[T],
    included: &[bool],
    n_coeffs: usize,
    floor: T,
) -> Option<Vec<T>> {
    let mut n = 0usize;
    let mut sum = T::zero();
    for (i, &y) in counts.iter().enumerate() {
        if included[i] {
            n += 1;
            sum = sum + y;
        }
    }
    if n < n_coeffs {
        return None;
    }
    let mean = (sum / T::from(n).unwrap()).max(floor);

    let mut beta = vec![T::zero(); n_coeffs];
    beta[0] = mean.ln();
    Some(beta)
}

/// Exclude included rows with |deviance residual| above the threshold.
///
/// Returns the number of newly excluded rows.
fn reject_outliers<T: Float>(
    counts: &[T],
    design: &[T],
    n_coeffs: usize,
    beta: &[T],
    included: &mut [bool],
    floor: T,
    threshold: T,
) -> usize {
    let mut rejected = 0;
    for (i, &y) in counts.iter().enumerate() {
        if !included[i] {
            continue;
        }
        let row = &design[i * n_coeffs..(i + 1) * n_coeffs];
        let mu = evaluate(row, beta).max(floor);
        if deviance_residual(y, mu).abs() > threshold {
            included[i] = false;
            rejected += 1;
        }
    }
    rejected
}

/// Maximum relative coefficient change, magnitudes floored at 1.
fn max_relative_change<T: Float>(old: &[T], new: &[T]) -> T {
    let mut worst = T::zero();
    for (&a, &b) in old.iter().zip(new.iter()) {
        let rel = (b - a).abs() / a.abs().max(T::one());
        worst = worst.max(rel);
    }
    worst
}

#[inline]
fn dot<T: Float>(a: &[T], b: &[T]) -> T {
    let mut sum = T::zero();
    for (&x, &y) in a.iter().zip(b.iter()) {
        sum = sum + x * y;
    }
    sum
}
