//! Sample moments and background quality statistics.
//!
//! ## Purpose
//!
//! Small statistics helpers shared by the fitter and the creator: sample
//! mean and variance of the background pixels, the dispersion index used to
//! flag non-Poisson backgrounds, and the mean squared residual against a
//! fitted surface.
//!
//! ## Design notes
//!
//! * All helpers are single-pass or two-pass over slices; no allocation.
//! * The dispersion index is defined as 0 for a zero or empty mean so
//!   degenerate shoeboxes produce a defined value rather than NaN.

// External dependencies
use num_traits::Float;

/// Arithmetic mean of a sample. Zero for an empty sample.
#[inline]
pub fn mean<T: Float>(values: &[T]) -> T {
    if values.is_empty() {
        return T::zero();
    }
    let mut sum = T::zero();
    for &v in values {
        sum = sum + v;
    }
    sum / T::from(values.len()).unwrap()
}

/// Unbiased sample variance. Zero for fewer than two observations.
pub fn variance<T: Float>(values: &[T]) -> T {
    let n = values.len();
    if n < 2 {
        return T::zero();
    }
    let m = mean(values);
    let mut ss = T::zero();
    for &v in values {
        let d = v - m;
        ss = ss + d * d;
    }
    ss / T::from(n - 1).unwrap()
}

/// Dispersion index: sample variance over sample mean.
///
/// A Poisson background has dispersion near 1; values well above 1 suggest
/// contamination (for example an unflagged spot). Defined as 0 when the
/// mean is 0.
pub fn dispersion_index<T: Float>(values: &[T]) -> T {
    let m = mean(values);
    if m <= T::zero() {
        return T::zero();
    }
    variance(values) / m
}

/// Mean squared residual of observations against fitted values.
///
/// Both slices are index-aligned; zero for empty input.
pub fn mean_squared_error<T: Float>(observed: &[T], fitted: &[T]) -> T {
    debug_assert_eq!(observed.len(), fitted.len());
    if observed.is_empty() {
        return T::zero();
    }
    let mut ss = T::zero();
    for (&y, &b) in observed.iter().zip(fitted.iter()) {
        let d = y - b;
        ss = ss + d * d;
    }
    ss / T::from(observed.len()).unwrap()
}
