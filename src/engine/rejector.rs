//! Outlier rejection policies for the outer fitting loop.
//!
//! ## Purpose
//!
//! After an inner fit converges, a rejector may flag further pixels as
//! outliers against the latest background estimate; the fitter then refits
//! without them and repeats until the rejector reports no change. The
//! policy is a capability injected at construction, so alternative
//! discriminators can be swapped in without touching the fitter.
//!
//! ## Key concepts
//!
//! * **Monotonicity**: a rejector may only flip pixels from included to
//!   excluded. Re-admission would break the fitter's termination argument.
//! * **Fixed point**: returning `false` ("no change") ends the outer loop.
//!
//! ## Non-goals
//!
//! * Rejectors do not refit; they only flag.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::engine::validator::Validator;
use crate::primitives::errors::BackgroundError;

// ============================================================================
// Capability
// ============================================================================

/// Flags additional outliers among the currently included pixels.
///
/// All three slices are index-aligned over the background-eligible pixels
/// of the fitted region. Implementations must only flip `included` entries
/// from `true` to `false`, and return whether any entry changed.
pub trait OutlierRejector<T: Float> {
    /// Apply the rejection rule; returns `true` when new pixels were
    /// flagged.
    fn reject(&self, data: &[T], background: &[T], included: &mut [bool]) -> bool;
}

// ============================================================================
// Sigma Clipping
// ============================================================================

/// Poisson-scaled sigma clipping.
///
/// A pixel is rejected when its residual against the fitted background
/// exceeds `n_sigma` times the Poisson scale `sqrt(background)`, with the
/// scale floored at 1 so a near-zero background still admits unit-level
/// noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmaClipRejector {
    /// Rejection threshold in Poisson sigma units.
    pub n_sigma: f64,
}

impl SigmaClipRejector {
    /// Build a clipping policy with the given threshold.
    ///
    /// A non-positive or non-finite threshold is a configuration error.
    pub fn new(n_sigma: f64) -> Result<Self, BackgroundError> {
        Validator::validate_sigma(n_sigma)?;
        Ok(Self { n_sigma })
    }
}

impl Default for SigmaClipRejector {
    fn default() -> Self {
        Self { n_sigma: 3.0 }
    }
}

impl<T: Float> OutlierRejector<T> for SigmaClipRejector {
    fn reject(&self, data: &[T], background: &[T], included: &mut [bool]) -> bool {
        let n_sigma = T::from(self.n_sigma).unwrap();
        let mut changed = false;
        for (i, inc) in included.iter_mut().enumerate() {
            if !*inc {
                continue;
            }
            let scale = background[i].max(T::one()).sqrt();
            if (data[i] - background[i]).abs() > n_sigma * scale {
                *inc = false;
                changed = true;
            }
        }
        changed
    }
}
