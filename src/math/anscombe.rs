//! Anscombe transform for Poisson counts.
//!
//! ## Purpose
//!
//! Variance stabilisation for Poisson-distributed pixel counts. The robust
//! mean estimator standardises its residuals through this transform so a
//! single dimensionless tuning constant applies across intensity scales.
//!
//! ## Key concepts
//!
//! * **Transform**: `t(y) = 2 * sqrt(y + 3/8)`. For `y ~ Poisson(m)` the
//!   transformed value has variance close to 1 for all but the smallest
//!   means, so `t(y) - t(m)` behaves as a standardised residual.
//!
//! ## Invariants
//!
//! * Defined for all `y >= 0`; monotonically increasing.

// External dependencies
use num_traits::Float;

/// Anscombe variance-stabilising transform, `2 * sqrt(y + 3/8)`.
#[inline]
pub fn anscombe<T: Float>(y: T) -> T {
    let two = T::from(2.0).unwrap();
    let c = T::from(0.375).unwrap();
    two * (y + c).sqrt()
}

/// Standardised residual of an observation against a mean estimate.
///
/// Approximately unit-variance for Poisson counts, which makes the Huber
/// tuning constant directly comparable to a z-score threshold.
#[inline]
pub fn standardized_residual<T: Float>(y: T, mean: T) -> T {
    anscombe(y) - anscombe(mean)
}
