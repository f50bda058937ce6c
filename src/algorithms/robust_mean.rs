//! Robust estimation of a Poisson mean.
//!
//! ## Purpose
//!
//! This module implements the innermost primitive of the background engine:
//! an iteratively reweighted estimate of a single Poisson mean that bounds
//! the influence of outlying counts instead of letting them drag the
//! estimate, as a plain average would.
//!
//! ## Design notes
//!
//! * **Residuals**: observations are standardised through the Anscombe
//!   transform (`math::anscombe`), so residuals are approximately
//!   unit-variance and the tuning constant reads as a z-score threshold.
//! * **Weights**: Huber influence — weight 1 inside the threshold,
//!   `c / |residual|` outside it. Outliers are down-weighted, never
//!   excluded, so every observation keeps a strictly positive weight.
//! * **Eager computation**: the constructor runs the whole iteration; the
//!   resulting state is immutable and exposed through accessors.
//!
//! ## Key concepts
//!
//! * **IRLS**: each iteration recomputes weights against the current mean
//!   and replaces it with the weighted average of the sample.
//! * **Soft failure**: running out of iterations leaves `converged()`
//!   false; it is never an error.
//!
//! ## Invariants
//!
//! * The mean estimate is non-negative at every iteration (a weighted
//!   average of non-negative counts with positive weights).
//! * The input sample is never mutated.
//!
//! ## Non-goals
//!
//! * This module does not classify pixels or reject observations; discrete
//!   rejection is layered on top by the fitter.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::anscombe::standardized_residual;

// ============================================================================
// Robust Poisson Mean
// ============================================================================

/// Iteratively reweighted robust estimate of a Poisson mean.
///
/// Constructed from a sample of observed counts and an initial guess; the
/// constructor runs the reweighting iteration to convergence (or to the
/// iteration bound) and the accessors expose the final state.
///
/// Degenerate inputs are defined, not fatal: an empty sample keeps the
/// initial guess with zero iterations, and `max_iter = 0` performs no
/// iterations at all. Both leave `converged()` false.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobustPoissonMean<T: Float> {
    mean: T,
    niter: usize,
    error: T,
    converged: bool,
}

impl<T: Float> RobustPoissonMean<T> {
    /// Estimate the mean of `sample` starting from `mean0`.
    ///
    /// `c` is the Huber threshold in standardised-residual units,
    /// `tolerance` the relative-change convergence criterion, and
    /// `max_iter` the iteration bound. A negative initial guess is clamped
    /// to zero so the Anscombe transform stays defined.
    pub fn new(sample: &[T], mean0: T, c: T, tolerance: T, max_iter: usize) -> Self {
        let mut state = Self {
            mean: mean0.max(T::zero()),
            niter: 0,
            error: T::infinity(),
            converged: false,
        };

        if sample.is_empty() {
            return state;
        }

        for iter in 1..=max_iter {
            let previous = state.mean;
            let next = reweighted_mean(sample, previous, c);

            state.error = (next - previous).abs() / previous.max(T::epsilon());
            state.mean = next;
            state.niter = iter;

            if state.error < tolerance {
                state.converged = true;
                break;
            }
        }

        state
    }

    /// Final mean estimate.
    #[inline]
    pub fn mean(&self) -> T {
        self.mean
    }

    /// Number of reweighting iterations performed.
    #[inline]
    pub fn niter(&self) -> usize {
        self.niter
    }

    /// Relative change of the last iteration.
    #[inline]
    pub fn error(&self) -> T {
        self.error
    }

    /// Whether the relative change fell below the tolerance.
    #[inline]
    pub fn converged(&self) -> bool {
        self.converged
    }
}

// ============================================================================
// Reweighting Step
// ============================================================================

/// One reweighting pass: Huber-weighted average of the sample against the
/// current mean estimate.
fn reweighted_mean<T: Float>(sample: &[T], mean: T, c: T) -> T {
    let mut sum_w = T::zero();
    let mut sum_wy = T::zero();

    for &y in sample {
        let u = standardized_residual(y, mean).abs();
        let w = if u <= c { T::one() } else { c / u };
        sum_w = sum_w + w;
        sum_wy = sum_wy + w * y;
    }

    sum_wy / sum_w
}
