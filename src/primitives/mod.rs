//! Layer 1: Primitives
//!
//! Core data containers and shared types.
//!
//! This layer provides the error type, the pixel mask contract, and the
//! caller-owned pixel containers (shoeboxes and image volumes). It has zero
//! internal dependencies within the crate.
//!
//! # Module Organization
//!
//! - **errors**: Shared error type (`BackgroundError`)
//! - **mask**: Pixel mask bit codes and eligibility predicates
//! - **shoebox**: Per-reflection pixel container
//! - **volume**: Multi-panel image volume and reflection bounding boxes
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Engine (validator, modeller, rejector, fitter)
//!   ↓
//! Layer 3: Algorithms (robust mean, classification, GLM)
//!   ↓
//! Layer 2: Math (anscombe, deviance, moments, linalg)
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Shared error type.
///
/// Provides:
/// - Unified `BackgroundError` enum
/// - Construction-time configuration failures
pub mod errors;

/// Pixel mask contract.
///
/// Provides:
/// - `MaskCode` bit constants
/// - Background-eligibility predicates
pub mod mask;

/// Per-reflection pixel container.
///
/// Provides:
/// - `Shoebox` record (data, mask, background)
/// - Shape-checked construction and indexing helpers
pub mod shoebox;

/// Detector image volume containers.
///
/// Provides:
/// - `ImageVolume` / `MultiPanelImageVolume`
/// - `Bbox` / `ReflectionRef` reflection addressing
pub mod volume;
