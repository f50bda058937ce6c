//! Poisson deviance residuals.
//!
//! ## Purpose
//!
//! The log-linear background model rejects pixels whose deviance residual
//! against the fitted surface is implausibly large. This module provides
//! that residual.
//!
//! ## Key concepts
//!
//! * **Unit deviance**: `d(y, mu) = 2 * (y * ln(y / mu) - (y - mu))`, with
//!   the `y = 0` limit `d(0, mu) = 2 * mu`.
//! * **Deviance residual**: `sign(y - mu) * sqrt(d(y, mu))`; approximately
//!   standard normal under the Poisson model, so a fixed threshold on its
//!   magnitude is a calibrated rejection rule.
//!
//! ## Invariants
//!
//! * `d(y, mu) >= 0` for all `y >= 0`, `mu > 0`.

// External dependencies
use num_traits::Float;

/// Signed Poisson deviance residual of `y` against fitted mean `mu`.
///
/// `mu` must be strictly positive; callers clamp fitted means away from
/// zero before evaluating.
#[inline]
pub fn deviance_residual<T: Float>(y: T, mu: T) -> T {
    let two = T::from(2.0).unwrap();
    let unit = if y > T::zero() {
        two * (y * (y / mu).ln() - (y - mu))
    } else {
        two * mu
    };
    // Clamp tiny negative round-off before the square root.
    let unit = unit.max(T::zero());
    let r = unit.sqrt();
    if y < mu {
        -r
    } else {
        r
    }
}
