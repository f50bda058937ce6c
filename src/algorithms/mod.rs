//! Layer 3: Algorithms
//!
//! # Purpose
//!
//! This layer implements the numerical core of the background engine:
//! - Robust estimation of a Poisson mean (IRLS with Huber weights)
//! - Pixel classification from mask bits
//! - The log-linear Poisson GLM with deviance-based rejection
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Algorithms ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Pixel classification from mask bits.
pub mod classify;

/// Log-linear Poisson GLM (IRLS, deviance rejection).
pub mod glm;

/// Robust Poisson mean estimation.
pub mod robust_mean;
