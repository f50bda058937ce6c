//! High-level API for background estimation.
//!
//! ## Purpose
//!
//! This module provides the user-facing entry point: a fluent builder for
//! configuring the background model, and the creator it builds, with one
//! explicitly named operation per input shape (single shoebox, shoebox
//! batch, reflection set over an image volume).
//!
//! ## Design notes
//!
//! * **Ergonomic**: fluent builder with the conventional defaults
//!   (`tuning_constant = 1.345`, `tolerance = 1e-3`, `max_iter = 100`).
//! * **Validated**: `build()` rejects malformed configuration; the fit
//!   operations reject mismatched buffers. Numerical failures surface as
//!   per-shoebox success flags.
//! * **Named operations**: one method per call shape rather than a single
//!   polymorphic entry point.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`BackgroundBuilder`] via `Background::new()`.
//! 2. Chain configuration methods (`.model()`, `.tuning_constant()`, ...).
//! 3. Call `.build()` to obtain a validated [`BackgroundCreator`].

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::boxed::Box;
#[cfg(feature = "std")]
use std::vec::Vec;

// Internal dependencies
use crate::engine::fitter::BackgroundFitter;
use crate::engine::validator::Validator;
use crate::math::linalg::FloatLinalg;
use crate::math::moments;
use crate::primitives::mask::MaskCode;

// Publicly re-exported types
pub use crate::engine::fitter::FitOutcome;
pub use crate::engine::modeller::{Basis, ConstantBasis, LogLinearBasis, ModelFamily, Modeller};
pub use crate::engine::rejector::{OutlierRejector, SigmaClipRejector};
pub use crate::primitives::errors::BackgroundError;
pub use crate::primitives::mask::is_background_eligible;
pub use crate::primitives::shoebox::Shoebox;
pub use crate::primitives::volume::{Bbox, ImageVolume, MultiPanelImageVolume, ReflectionRef};

// ============================================================================
// Fit Statistics
// ============================================================================

/// Per-shoebox result summary.
#[derive(Debug, Clone)]
pub struct FitStats<T: FloatLinalg> {
    /// Whether every region fit converged on a non-empty pixel set.
    pub success: bool,

    /// Largest inner-iteration count reached during the fit.
    pub iterations: usize,

    /// Mean squared residual of the background-used pixels against the
    /// fitted background.
    pub mse: T,

    /// Dispersion index (variance / mean) of the background-used pixel
    /// intensities. Values well above 1 suggest a contaminated background.
    pub dispersion: T,

    /// Mean fitted background per image plane, for the planar families.
    pub plane_means: Option<Vec<T>>,
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for a [`BackgroundCreator`].
pub struct BackgroundBuilder<T: FloatLinalg> {
    /// Model family to fit.
    pub model: Option<ModelFamily>,

    /// Huber tuning constant in standardised-residual units.
    pub tuning_constant: Option<T>,

    /// Relative convergence tolerance.
    pub tolerance: Option<T>,

    /// Iteration bound for the inner fits.
    pub max_iter: Option<usize>,

    /// Optional outer rejection policy.
    pub rejector: Option<Box<dyn OutlierRejector<T> + Send + Sync>>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl<T: FloatLinalg> Default for BackgroundBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FloatLinalg> BackgroundBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            model: None,
            tuning_constant: None,
            tolerance: None,
            max_iter: None,
            rejector: None,
            duplicate_param: None,
        }
    }

    /// Set the model family.
    pub fn model(mut self, model: ModelFamily) -> Self {
        if self.model.is_some() {
            self.duplicate_param = Some("model");
        }
        self.model = Some(model);
        self
    }

    /// Set the Huber tuning constant (default 1.345).
    pub fn tuning_constant(mut self, c: T) -> Self {
        if self.tuning_constant.is_some() {
            self.duplicate_param = Some("tuning_constant");
        }
        self.tuning_constant = Some(c);
        self
    }

    /// Set the relative convergence tolerance (default 1e-3).
    pub fn tolerance(mut self, tolerance: T) -> Self {
        if self.tolerance.is_some() {
            self.duplicate_param = Some("tolerance");
        }
        self.tolerance = Some(tolerance);
        self
    }

    /// Set the iteration bound (default 100).
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        if self.max_iter.is_some() {
            self.duplicate_param = Some("max_iter");
        }
        self.max_iter = Some(max_iter);
        self
    }

    /// Inject an outer outlier-rejection policy.
    pub fn rejector<R>(mut self, rejector: R) -> Self
    where
        R: OutlierRejector<T> + Send + Sync + 'static,
    {
        if self.rejector.is_some() {
            self.duplicate_param = Some("rejector");
        }
        self.rejector = Some(Box::new(rejector));
        self
    }

    /// Validate the configuration and build the creator.
    pub fn build(self) -> Result<BackgroundCreator<T>, BackgroundError> {
        let tuning_constant = self.tuning_constant.unwrap_or_else(|| T::from(1.345).unwrap());
        let tolerance = self.tolerance.unwrap_or_else(|| T::from(1e-3).unwrap());
        let max_iter = self.max_iter.unwrap_or(100);

        Validator::validate_no_duplicates(self.duplicate_param)?;
        Validator::validate_tuning_constant(tuning_constant)?;
        Validator::validate_tolerance(tolerance)?;
        Validator::validate_max_iter(max_iter)?;

        Ok(BackgroundCreator {
            family: self.model.unwrap_or_default(),
            tuning_constant,
            tolerance,
            max_iter,
            rejector: self.rejector,
        })
    }
}

// ============================================================================
// Creator
// ============================================================================

/// Validated background creator.
///
/// Stateless between invocations; every operation is an independent
/// computation over the buffers it is handed, so an external driver may
/// fan shoeboxes out across threads with disjoint buffers.
pub struct BackgroundCreator<T: FloatLinalg> {
    family: ModelFamily,
    tuning_constant: T,
    tolerance: T,
    max_iter: usize,
    rejector: Option<Box<dyn OutlierRejector<T> + Send + Sync>>,
}

impl<T: FloatLinalg + core::fmt::Debug> core::fmt::Debug for BackgroundCreator<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackgroundCreator")
            .field("family", &self.family)
            .field("tuning_constant", &self.tuning_constant)
            .field("tolerance", &self.tolerance)
            .field("max_iter", &self.max_iter)
            .field("rejector", &self.rejector.as_ref().map(|_| "<rejector>"))
            .finish()
    }
}

impl<T: FloatLinalg> BackgroundCreator<T> {
    /// Model family this creator fits.
    #[inline]
    pub fn family(&self) -> ModelFamily {
        self.family
    }

    /// Fit the background of a single shoebox.
    ///
    /// Overwrites `sbox.background`, updates `sbox.mask`
    /// (`BACKGROUND_USED` / `OUTLIER`), and returns the summary
    /// statistics. A non-converged or degenerate fit is reported through
    /// `FitStats::success`, not as an error.
    pub fn shoebox(&self, sbox: &mut Shoebox<T>) -> Result<FitStats<T>, BackgroundError> {
        Validator::validate_shoebox(sbox)?;

        let outcome = self.fitter().fit(
            sbox.frames,
            sbox.height,
            sbox.width,
            &sbox.data,
            &mut sbox.mask,
            &mut sbox.background,
        );

        Ok(self.summarize(sbox, outcome))
    }

    /// Fit a batch of shoeboxes, filling the caller-allocated MSE and
    /// dispersion buffers.
    ///
    /// Returns one success flag per shoebox; individual failures do not
    /// abort the batch.
    pub fn shoeboxes(
        &self,
        sboxes: &mut [Shoebox<T>],
        mse: &mut [T],
        dispersion: &mut [T],
    ) -> Result<Vec<bool>, BackgroundError> {
        Validator::validate_buffer(sboxes.len(), mse.len())?;
        Validator::validate_buffer(sboxes.len(), dispersion.len())?;

        let mut flags = Vec::with_capacity(sboxes.len());
        for (i, sbox) in sboxes.iter_mut().enumerate() {
            let stats = self.shoebox(sbox)?;
            mse[i] = stats.mse;
            dispersion[i] = stats.dispersion;
            flags.push(stats.success);
        }
        Ok(flags)
    }

    /// Fit every reflection of a multi-panel image volume.
    ///
    /// Each reflection's bounding box is clipped to its panel's recorded
    /// extent, the covered pixels are fitted, and the background and mask
    /// updates are written back into the volume. Returns one success flag
    /// per reflection; a box that clips to nothing is a failed fit, not an
    /// error.
    pub fn volume(
        &self,
        reflections: &[ReflectionRef],
        volume: &mut MultiPanelImageVolume<T>,
    ) -> Result<Vec<bool>, BackgroundError> {
        let mut flags = Vec::with_capacity(reflections.len());

        for refl in reflections {
            let panels = volume.len();
            let panel = volume
                .panels
                .get_mut(refl.panel)
                .ok_or(BackgroundError::PanelOutOfRange {
                    panel: refl.panel,
                    panels,
                })?;

            let bbox = panel.clip(&refl.bbox);
            if bbox.x0 >= bbox.x1 || bbox.y0 >= bbox.y1 || bbox.z0 >= bbox.z1 {
                flags.push(false);
                continue;
            }

            let frames = (bbox.z1 - bbox.z0) as usize;
            let height = (bbox.y1 - bbox.y0) as usize;
            let width = (bbox.x1 - bbox.x0) as usize;

            // Extract the covered pixels into a scratch shoebox.
            let mut sbox = Shoebox::new(frames, height, width);
            for fz in 0..frames {
                for fy in 0..height {
                    for fx in 0..width {
                        let src = panel.index(
                            bbox.z0 + fz as isize,
                            (bbox.y0 as usize) + fy,
                            (bbox.x0 as usize) + fx,
                        );
                        let dst = sbox.index(fz, fy, fx);
                        sbox.data[dst] = panel.data[src];
                        sbox.mask[dst] = panel.mask[src];
                    }
                }
            }

            let stats = self.shoebox(&mut sbox)?;

            // Write the fitted background and mask updates back.
            for fz in 0..frames {
                for fy in 0..height {
                    for fx in 0..width {
                        let src = sbox.index(fz, fy, fx);
                        let dst = panel.index(
                            bbox.z0 + fz as isize,
                            (bbox.y0 as usize) + fy,
                            (bbox.x0 as usize) + fx,
                        );
                        panel.background[dst] = sbox.background[src];
                        panel.mask[dst] = sbox.mask[src];
                    }
                }
            }

            flags.push(stats.success);
        }

        Ok(flags)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Borrow the configured region fitter.
    fn fitter(&self) -> BackgroundFitter<'_, T> {
        BackgroundFitter {
            family: self.family,
            tuning_constant: self.tuning_constant,
            tolerance: self.tolerance,
            max_iter: self.max_iter,
            rejector: self
                .rejector
                .as_deref()
                .map(|r| r as &dyn OutlierRejector<T>),
        }
    }

    /// Derive the per-shoebox summary from the written-back buffers.
    fn summarize(&self, sbox: &Shoebox<T>, outcome: FitOutcome<T>) -> FitStats<T> {
        let mut used = Vec::new();
        let mut fitted = Vec::new();
        for (i, &code) in sbox.mask.iter().enumerate() {
            if code & MaskCode::BACKGROUND_USED != 0 {
                used.push(sbox.data[i]);
                fitted.push(sbox.background[i]);
            }
        }

        FitStats {
            success: outcome.success,
            iterations: outcome.iterations,
            mse: moments::mean_squared_error(&used, &fitted),
            dispersion: moments::dispersion_index(&used),
            plane_means: outcome.plane_means,
        }
    }
}
