//! # bgfit — robust shoebox background estimation
//!
//! Robust estimation of the background signal under small 2D/3D pixel
//! regions ("shoeboxes") extracted around detected diffraction spots, so
//! that a spot's true signal can later be separated from noise and
//! background by the integration stage.
//!
//! ## What does it do?
//!
//! Detector pixels under a diffraction spot record signal plus background.
//! Before the spot intensity can be integrated, the background underneath
//! it has to be estimated from the surrounding non-signal pixels — which
//! are Poisson counts, occasionally contaminated by zingers, hot pixels,
//! or the tails of unflagged neighbouring spots. A plain average is badly
//! biased by such outliers.
//!
//! This crate provides:
//!
//! - **[`RobustPoissonMean`](prelude::RobustPoissonMean)** — an
//!   iteratively reweighted estimate of a single Poisson mean that bounds
//!   the influence of outliers through Huber weights on Anscombe-
//!   standardised residuals.
//! - **A background creator** — fits a constant or log-linear intensity
//!   surface (per image plane or across the volume) to a shoebox's
//!   background-eligible pixels, iteratively rejecting outlier pixels,
//!   writing a per-pixel background estimate back into the shoebox and
//!   flagging what it rejected in the mask.
//!
//! **Key behaviours:**
//! - Outliers are down-weighted inside the estimator, and optionally
//!   rejected outright by a pluggable outer policy
//! - Numerical non-convergence and degenerate pixel sets are reported as
//!   per-shoebox success flags — batches keep going when single shoeboxes
//!   fail
//! - Every loop is bounded, every fit is an independent computation over
//!   caller-owned buffers
//!
//! ## Quick Start
//!
//! ```rust
//! use bgfit_rs::prelude::*;
//!
//! // A 5x5 single-frame shoebox of flat background at 10 counts.
//! let mut sbox = Shoebox::<f64>::new(1, 5, 5);
//! for i in 0..sbox.len() {
//!     sbox.data[i] = 10.0;
//!     sbox.mask[i] = MaskCode::VALID | MaskCode::BACKGROUND;
//! }
//!
//! // Build the creator
//! let creator = Background::<f64>::new()
//!     .model(Constant2d)      // one robust mean per image plane
//!     .build()?;
//!
//! // Fit the shoebox
//! let stats = creator.shoebox(&mut sbox)?;
//!
//! assert!(stats.success);
//! assert_eq!(sbox.background[12], 10.0);
//! # Result::<(), BackgroundError>::Ok(())
//! ```
//!
//! ### With outlier rejection
//!
//! ```rust
//! use bgfit_rs::prelude::*;
//!
//! let mut sbox = Shoebox::<f64>::new(1, 5, 5);
//! for i in 0..sbox.len() {
//!     sbox.data[i] = 10.0;
//!     sbox.mask[i] = MaskCode::VALID | MaskCode::BACKGROUND;
//! }
//! sbox.data[7] = 1000.0; // a zinger
//!
//! let creator = Background::<f64>::new()
//!     .model(Constant2d)
//!     .tuning_constant(1.345)            // Huber threshold (z-score units)
//!     .tolerance(1e-3)                   // relative convergence criterion
//!     .max_iter(100)                     // iteration bound
//!     .rejector(SigmaClipRejector::new(3.0)?) // clip against sqrt(background)
//!     .build()?;
//!
//! let stats = creator.shoebox(&mut sbox)?;
//!
//! assert!(stats.success);
//! // The zinger neither pulled the estimate nor survived in the mask.
//! assert!((sbox.background[0] - 10.0).abs() < 0.5);
//! assert_ne!(sbox.mask[7] & MaskCode::OUTLIER, 0);
//! # Result::<(), BackgroundError>::Ok(())
//! ```
//!
//! ### Batch and image-volume operation
//!
//! The creator exposes one named operation per input shape:
//!
//! | Operation    | Input                                        | Output                                           |
//! |--------------|----------------------------------------------|--------------------------------------------------|
//! | `shoebox`    | one `&mut Shoebox`                           | [`FitStats`](prelude::FitStats) summary          |
//! | `shoeboxes`  | `&mut [Shoebox]` + MSE/dispersion buffers    | per-shoebox success flags, buffers filled        |
//! | `volume`     | `&[ReflectionRef]` + `MultiPanelImageVolume` | per-reflection success flags, volume written back |
//!
//! ## Parameters
//!
//! | Parameter           | Default      | Range        | Description                                   |
//! |---------------------|--------------|--------------|-----------------------------------------------|
//! | **model**           | `Constant2d` | 4 families   | Background surface shape and extent           |
//! | **tuning_constant** | 1.345        | (0, ∞)       | Huber threshold in standardised-residual units |
//! | **tolerance**       | 1e-3         | (0, ∞)       | Relative-change convergence criterion         |
//! | **max_iter**        | 100          | [1, ∞)       | Inner iteration bound                         |
//! | **rejector**        | none         | any policy   | Outer outlier-rejection capability            |
//!
//! ### Model families
//!
//! | Family        | Surface                     | Fitted over      |
//! |---------------|-----------------------------|------------------|
//! | `Constant2d`  | single level                | each image plane |
//! | `Constant3d`  | single level                | whole volume     |
//! | `LogLinear2d` | `exp(a + b*x + c*y)`        | each image plane |
//! | `LogLinear3d` | `exp(a + b*x + c*y + d*z)`  | whole volume     |
//!
//! The constant families reduce exactly to the robust mean of the
//! background-eligible intensities; the log-linear families fit a Poisson
//! GLM with a log link by iteratively reweighted least squares, excluding
//! pixels whose deviance residual exceeds a three-sigma threshold.
//!
//! ## Error handling
//!
//! Only malformed configuration and mismatched buffers are errors
//! ([`BackgroundError`](prelude::BackgroundError)). A fit that fails to
//! converge, or a shoebox whose eligible pixel set empties out, reports
//! `success = false` with defined output (zeros where no model was
//! obtained) so thousands of shoeboxes can be processed without
//! interruption:
//!
//! ```rust
//! use bgfit_rs::prelude::*;
//!
//! // No pixel is background-eligible: a degenerate input, not an error.
//! let mut sbox = Shoebox::<f64>::new(1, 3, 3);
//! for i in 0..sbox.len() {
//!     sbox.data[i] = 7.0;
//!     sbox.mask[i] = MaskCode::VALID | MaskCode::FOREGROUND;
//! }
//!
//! let creator = Background::<f64>::new().model(Constant3d).build()?;
//! let stats = creator.shoebox(&mut sbox)?;
//!
//! assert!(!stats.success);
//! assert!(sbox.background.iter().all(|&b| b == 0.0));
//! # Result::<(), BackgroundError>::Ok(())
//! ```
//!
//! ## Mask contract
//!
//! The per-pixel `i32` mask uses bit flags shared with the surrounding
//! pipeline ([`MaskCode`](prelude::MaskCode)). A pixel enters background
//! fitting iff `VALID` is set and `FOREGROUND` is clear. The creator sets
//! `BACKGROUND_USED` on pixels a successful fit retained, and `OUTLIER` on
//! pixels it rejected.
//!
//! ## References
//!
//! - Huber, P. J. (1981). "Robust Statistics"
//! - Anscombe, F. J. (1948). "The Transformation of Poisson, Binomial and
//!   Negative-Binomial Data"
//! - McCullagh, P. & Nelder, J. A. (1989). "Generalized Linear Models"

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - data containers and shared types.
//
// Contains the error type, the pixel mask contract, and the caller-owned
// pixel containers (shoeboxes, image volumes).
mod primitives;

// Layer 2: Math - pure mathematical functions.
//
// Contains the Anscombe transform, Poisson deviance residuals, sample
// moments, and the nalgebra linear-algebra bridge.
mod math;

// Layer 3: Algorithms - the numerical core.
//
// Contains the robust Poisson mean (IRLS with Huber weights), pixel
// classification, and the log-linear Poisson GLM.
mod algorithms;

// Layer 4: Engine - orchestration of one shoebox fit.
//
// Contains configuration validation, model bases, rejection policies, and
// the region fitter.
mod engine;

// High-level fluent API for background estimation.
//
// Provides the `Background` builder and the creator operations.
mod api;

// ============================================================================
// Prelude
// ============================================================================

/// Standard prelude.
///
/// This module is intended to be wildcard-imported for convenient access
/// to the most commonly used types:
///
/// ```
/// use bgfit_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{
        BackgroundBuilder as Background, BackgroundCreator, BackgroundError, Bbox, FitStats,
        ImageVolume,
        ModelFamily::{Constant2d, Constant3d, LogLinear2d, LogLinear3d},
        ModelFamily, MultiPanelImageVolume, OutlierRejector, ReflectionRef, Shoebox,
        SigmaClipRejector,
    };
    pub use crate::algorithms::robust_mean::RobustPoissonMean;
    pub use crate::primitives::mask::MaskCode;
}

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// This module re-exports internal modules for development and testing
/// purposes. It is only available with the `dev` feature enabled.
///
/// **Warning**: These are internal implementation details and may change
/// without notice. Do not use in production code.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types and utilities.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal core algorithms.
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    /// Internal execution engine.
    pub mod engine {
        pub use crate::engine::*;
    }
    /// Internal API.
    pub mod api {
        pub use crate::api::*;
    }
}
