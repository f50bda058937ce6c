//! Configuration and buffer validation.
//!
//! ## Purpose
//!
//! Fail-fast checks for creator configuration and caller-supplied buffers.
//! Malformed configuration is a programming error and is rejected at
//! construction; numerical trouble during fitting never lands here.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: each check returns on the first violation.
//! * **Ordering**: checks are ordered from cheap to expensive.
//!
//! ## Non-goals
//!
//! * This module does not inspect pixel intensities; untrustworthy pixels
//!   are excluded through the mask, not validated here.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::BackgroundError;
use crate::primitives::shoebox::Shoebox;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for creator configuration and input buffers.
///
/// All methods return `Result<(), BackgroundError>` and fail fast on the
/// first violation.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Configuration
    // ========================================================================

    /// Validate the Huber tuning constant.
    pub fn validate_tuning_constant<T: Float>(c: T) -> Result<(), BackgroundError> {
        if !c.is_finite() || c <= T::zero() {
            return Err(BackgroundError::InvalidTuningConstant(
                c.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(())
    }

    /// Validate the convergence tolerance.
    pub fn validate_tolerance<T: Float>(tol: T) -> Result<(), BackgroundError> {
        if !tol.is_finite() || tol <= T::zero() {
            return Err(BackgroundError::InvalidTolerance(
                tol.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(())
    }

    /// Validate the iteration bound.
    ///
    /// # Notes
    ///
    /// * The estimator itself tolerates `max_iter = 0` as a degenerate run;
    ///   a creator configured that way could never succeed, so it is
    ///   rejected here instead of failing every shoebox silently.
    pub fn validate_max_iter(max_iter: usize) -> Result<(), BackgroundError> {
        if max_iter == 0 {
            return Err(BackgroundError::InvalidMaxIter(max_iter));
        }
        Ok(())
    }

    /// Validate a rejector sigma threshold.
    pub fn validate_sigma(n_sigma: f64) -> Result<(), BackgroundError> {
        if !n_sigma.is_finite() || n_sigma <= 0.0 {
            return Err(BackgroundError::InvalidSigma(n_sigma));
        }
        Ok(())
    }

    /// Validate that no builder parameter was set multiple times.
    pub fn validate_no_duplicates(
        duplicate_param: Option<&'static str>,
    ) -> Result<(), BackgroundError> {
        if let Some(parameter) = duplicate_param {
            return Err(BackgroundError::DuplicateParameter { parameter });
        }
        Ok(())
    }

    // ========================================================================
    // Buffers
    // ========================================================================

    /// Validate that a shoebox's arrays agree with its dimensions.
    pub fn validate_shoebox<T: Float>(sbox: &Shoebox<T>) -> Result<(), BackgroundError> {
        let expected = sbox.frames * sbox.height * sbox.width;
        if sbox.data.len() != expected
            || sbox.mask.len() != expected
            || sbox.background.len() != expected
        {
            return Err(BackgroundError::ShapeMismatch {
                expected,
                data_len: sbox.data.len(),
                mask_len: sbox.mask.len(),
                background_len: sbox.background.len(),
            });
        }
        Ok(())
    }

    /// Validate a caller-allocated output buffer length.
    pub fn validate_buffer(expected: usize, got: usize) -> Result<(), BackgroundError> {
        if got != expected {
            return Err(BackgroundError::BufferMismatch { expected, got });
        }
        Ok(())
    }
}
