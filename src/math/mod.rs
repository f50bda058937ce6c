//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides pure mathematical functions used by the fitting
//! algorithms:
//! - Anscombe transform for Poisson variance stabilisation
//! - Poisson deviance residuals
//! - Sample moments and background quality statistics
//! - Linear algebra backend for the log-linear normal equations
//!
//! These are reusable mathematical building blocks with no fitting-specific
//! logic.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Anscombe transform and standardised residuals.
pub mod anscombe;

/// Poisson deviance residuals.
pub mod deviance;

/// Linear algebra backend (nalgebra bridge).
pub mod linalg;

/// Sample moments, dispersion index, mean squared error.
pub mod moments;
