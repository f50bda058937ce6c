//! Background model fitting over shoebox regions.
//!
//! ## Purpose
//!
//! This module orchestrates one shoebox fit: classify the background
//! pixels, fit the configured model family per plane or per volume, run the
//! optional outer rejection loop, and write the fitted background and mask
//! updates back into the caller's buffers.
//!
//! ## Design notes
//!
//! * **Regions**: a planar family fits each image plane independently; a
//!   volumetric family fits the whole array once. Both go through the same
//!   region routine, so the rejection discipline is identical.
//! * **Inner fits**: the constant families call the robust Poisson mean on
//!   the eligible intensities (numerically identical to invoking the
//!   estimator directly); the log-linear families run the Poisson GLM.
//! * **Outer loop**: with a rejector configured, residuals against the
//!   latest background may flag further pixels; the region is refitted
//!   until a fixed point or the pass cap.
//!
//! ## Invariants
//!
//! * The included pixel set never grows during one region fit.
//! * The background array is fully defined on return: fitted values where a
//!   model was obtained, zeros where fitting was degenerate.
//!
//! ## Non-goals
//!
//! * No summary statistics here; the API layer derives MSE and dispersion
//!   from the written-back buffers.

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
use core::ops::Range;
use num_traits::Float;

// Internal dependencies
use crate::algorithms::classify::{eligible_plane_indices, eligible_volume_indices};
use crate::algorithms::glm::fit_poisson_log_linear;
use crate::algorithms::robust_mean::RobustPoissonMean;
use crate::engine::modeller::{Basis, ModelFamily, Modeller};
use crate::engine::rejector::OutlierRejector;
use crate::math::linalg::FloatLinalg;
use crate::math::moments;
use crate::primitives::mask::{mark_background_used, mark_outlier};

/// Cap on outer rejection passes. Rejection is monotonic, so the loop is
/// already bounded by the pixel count; the cap keeps worst-case latency
/// flat on pathological shoeboxes.
const MAX_REJECTION_PASSES: usize = 10;

// ============================================================================
// Outcome Types
// ============================================================================

/// Result of fitting one shoebox.
#[derive(Debug, Clone)]
pub struct FitOutcome<T: Float> {
    /// Whether every region fit converged on a non-empty pixel set.
    pub success: bool,

    /// Largest inner-iteration count across regions and passes.
    pub iterations: usize,

    /// Mean fitted background per image plane, for the planar families.
    ///
    /// Lets callers aggregate across the frame axis without refitting.
    pub plane_means: Option<Vec<T>>,
}

/// Result of one region (plane or volume) fit.
struct RegionFit<T: Float> {
    success: bool,
    iterations: usize,
    mean: T,
}

// ============================================================================
// Fitter
// ============================================================================

/// Fits the configured model family to one shoebox at a time.
pub struct BackgroundFitter<'a, T: FloatLinalg> {
    /// Model family to fit.
    pub family: ModelFamily,

    /// Huber tuning constant for the robust mean.
    pub tuning_constant: T,

    /// Relative convergence tolerance for the inner fits.
    pub tolerance: T,

    /// Iteration bound for the inner fits.
    pub max_iter: usize,

    /// Optional outer rejection policy.
    pub rejector: Option<&'a dyn OutlierRejector<T>>,
}

impl<'a, T: FloatLinalg> BackgroundFitter<'a, T> {
    /// Fit the background of one shoebox-shaped array set.
    ///
    /// `data`, `mask`, and `background` are frame-major with the given
    /// dimensions. `background` is overwritten; `mask` gains
    /// `BACKGROUND_USED` and `OUTLIER` bits.
    pub fn fit(
        &self,
        frames: usize,
        height: usize,
        width: usize,
        data: &[T],
        mask: &mut [i32],
        background: &mut [T],
    ) -> FitOutcome<T> {
        for b in background.iter_mut() {
            *b = T::zero();
        }

        let basis = self.family.basis();

        if self.family.is_planar() {
            let plane_len = height * width;
            let mut plane_means = Vec::with_capacity(frames);
            let mut success = true;
            let mut iterations = 0;

            for frame in 0..frames {
                let region = frame * plane_len..(frame + 1) * plane_len;
                let eligible = eligible_plane_indices(mask, frame, plane_len);
                let out = self.fit_region(
                    frames, height, width, data, mask, background, region, eligible, &basis,
                );
                success &= out.success;
                iterations = iterations.max(out.iterations);
                plane_means.push(out.mean);
            }

            FitOutcome {
                success,
                iterations,
                plane_means: Some(plane_means),
            }
        } else {
            let eligible = eligible_volume_indices(mask);
            let out = self.fit_region(
                frames,
                height,
                width,
                data,
                mask,
                background,
                0..data.len(),
                eligible,
                &basis,
            );
            FitOutcome {
                success: out.success,
                iterations: out.iterations,
                plane_means: None,
            }
        }
    }

    /// Fit one contiguous region (an image plane or the whole volume).
    #[allow(clippy::too_many_arguments)]
    fn fit_region(
        &self,
        frames: usize,
        height: usize,
        width: usize,
        data: &[T],
        mask: &mut [i32],
        background: &mut [T],
        region: Range<usize>,
        eligible: Vec<usize>,
        basis: &Basis,
    ) -> RegionFit<T> {
        if eligible.is_empty() {
            return RegionFit {
                success: false,
                iterations: 0,
                mean: T::zero(),
            };
        }

        let counts: Vec<T> = eligible.iter().map(|&i| data[i]).collect();
        let mut included = vec![true; eligible.len()];
        let n_coeffs = Modeller::<T>::n_coeffs(basis);

        // Design rows for the eligible pixels, built once per fit.
        let design = if self.family.is_constant() {
            Vec::new()
        } else {
            let mut rows = vec![T::zero(); eligible.len() * n_coeffs];
            for (r, &idx) in eligible.iter().enumerate() {
                let (x, y, z) = centered_coords(idx, frames, height, width);
                basis.fill_row(x, y, z, &mut rows[r * n_coeffs..(r + 1) * n_coeffs]);
            }
            rows
        };

        let mut success = false;
        let mut iterations = 0;
        let mut fitted = false;
        let mut mean = T::zero();

        for _pass in 0..MAX_REJECTION_PASSES {
            let inner = if self.family.is_constant() {
                self.fit_constant_pass(&counts, &included, region.clone(), background)
            } else {
                self.fit_log_linear_pass(
                    &counts,
                    &design,
                    n_coeffs,
                    &mut included,
                    region.clone(),
                    frames,
                    height,
                    width,
                    basis,
                    background,
                )
            };

            let (region_mean, niter, converged) = match inner {
                Some(v) => v,
                None => {
                    // Degenerate or singular inner fit; background keeps
                    // whatever the previous pass wrote (zeros on the first).
                    success = false;
                    break;
                }
            };

            fitted = true;
            mean = region_mean;
            iterations = iterations.max(niter);
            success = converged;

            match self.rejector {
                Some(rejector) => {
                    let bg: Vec<T> = eligible.iter().map(|&i| background[i]).collect();
                    let changed = rejector.reject(&counts, &bg, &mut included);
                    if !changed {
                        break;
                    }
                    if included.iter().all(|&inc| !inc) {
                        success = false;
                        break;
                    }
                }
                None => break,
            }
        }

        if fitted {
            for (r, &idx) in eligible.iter().enumerate() {
                if !included[r] {
                    mark_outlier(&mut mask[idx]);
                } else if success {
                    mark_background_used(&mut mask[idx]);
                }
            }
        }

        RegionFit {
            success,
            iterations,
            mean,
        }
    }

    /// One constant-model pass: robust mean of the included counts,
    /// broadcast over the region.
    fn fit_constant_pass(
        &self,
        counts: &[T],
        included: &[bool],
        region: Range<usize>,
        background: &mut [T],
    ) -> Option<(T, usize, bool)> {
        let values: Vec<T> = counts
            .iter()
            .zip(included.iter())
            .filter(|(_, &inc)| inc)
            .map(|(&y, _)| y)
            .collect();
        if values.is_empty() {
            return None;
        }

        let mean0 = moments::mean(&values);
        let est = RobustPoissonMean::new(
            &values,
            mean0,
            self.tuning_constant,
            self.tolerance,
            self.max_iter,
        );

        for idx in region {
            background[idx] = est.mean();
        }
        Some((est.mean(), est.niter(), est.converged()))
    }

    /// One log-linear pass: Poisson GLM over the included rows, surface
    /// evaluated at every region pixel.
    #[allow(clippy::too_many_arguments)]
    fn fit_log_linear_pass(
        &self,
        counts: &[T],
        design: &[T],
        n_coeffs: usize,
        included: &mut [bool],
        region: Range<usize>,
        frames: usize,
        height: usize,
        width: usize,
        basis: &Basis,
        background: &mut [T],
    ) -> Option<(T, usize, bool)> {
        let fit = fit_poisson_log_linear(
            counts,
            design,
            n_coeffs,
            included,
            self.tolerance,
            self.max_iter,
        )?;

        let mut row = vec![T::zero(); n_coeffs];
        let mut sum = T::zero();
        let len = region.len();
        for idx in region {
            let (x, y, z) = centered_coords(idx, frames, height, width);
            basis.fill_row(x, y, z, &mut row);
            let value = crate::algorithms::glm::evaluate(&row, &fit.coefficients);
            background[idx] = value;
            sum = sum + value;
        }
        let mean = sum / T::from(len).unwrap();

        Some((mean, fit.niter, fit.converged))
    }
}

// ============================================================================
// Coordinates
// ============================================================================

/// Pixel coordinates centred on the array midpoint.
///
/// Centring keeps the GLM normal equations well conditioned and makes the
/// intercept the background at the region centre.
fn centered_coords<T: Float>(
    idx: usize,
    frames: usize,
    height: usize,
    width: usize,
) -> (T, T, T) {
    let plane_len = height * width;
    let frame = idx / plane_len;
    let rem = idx % plane_len;
    let row = rem / width;
    let col = rem % width;

    let half = T::from(0.5).unwrap();
    let x = T::from(col).unwrap() - T::from(width - 1).unwrap() * half;
    let y = T::from(row).unwrap() - T::from(height - 1).unwrap() * half;
    let z = T::from(frame).unwrap() - T::from(frames - 1).unwrap() * half;
    (x, y, z)
}
