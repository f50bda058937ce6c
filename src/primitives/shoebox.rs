//! Shoebox pixel container.
//!
//! ## Purpose
//!
//! A shoebox is the small 3D sub-volume of detector pixels surrounding one
//! detected reflection: a data array, a same-shaped bit mask, and a
//! same-shaped background array the fitter writes into.
//!
//! ## Design notes
//!
//! * **Plain record**: the container is a struct with public fields and a
//!   handful of free helpers. There is exactly one concrete shape, so no
//!   accessor trait is involved; model selection is dispatched on
//!   `ModelFamily` alone.
//! * **Caller-owned buffers**: all three arrays are allocated by the caller
//!   (directly or via [`Shoebox::new`]); the fitter only overwrites
//!   `background` and flips mask bits in place.
//!
//! ## Invariants
//!
//! * `data`, `mask`, and `background` all have exactly
//!   `frames * height * width` elements.
//! * Storage order is frame-major: `index = frame*height*width + row*width
//!   + col`.

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
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::BackgroundError;

// ============================================================================
// Shoebox
// ============================================================================

/// Pixel data, mask, and background buffers for one reflection.
#[derive(Debug, Clone)]
pub struct Shoebox<T: Float> {
    /// Number of image frames spanned by the shoebox.
    pub frames: usize,

    /// Shoebox height in pixels.
    pub height: usize,

    /// Shoebox width in pixels.
    pub width: usize,

    /// Observed pixel counts, frame-major.
    pub data: Vec<T>,

    /// Per-pixel status bits (see [`MaskCode`](crate::prelude::MaskCode)).
    pub mask: Vec<i32>,

    /// Fitted background, written by the creator. Same shape as `data`.
    pub background: Vec<T>,
}

impl<T: Float> Shoebox<T> {
    /// Allocate a zeroed shoebox of the given dimensions.
    pub fn new(frames: usize, height: usize, width: usize) -> Self {
        let n = frames * height * width;
        Self {
            frames,
            height,
            width,
            data: vec![T::zero(); n],
            mask: vec![0; n],
            background: vec![T::zero(); n],
        }
    }

    /// Build a shoebox from caller-owned buffers, checking shapes.
    pub fn from_parts(
        frames: usize,
        height: usize,
        width: usize,
        data: Vec<T>,
        mask: Vec<i32>,
        background: Vec<T>,
    ) -> Result<Self, BackgroundError> {
        let expected = frames * height * width;
        if data.len() != expected || mask.len() != expected || background.len() != expected {
            return Err(BackgroundError::ShapeMismatch {
                expected,
                data_len: data.len(),
                mask_len: mask.len(),
                background_len: background.len(),
            });
        }
        Ok(Self {
            frames,
            height,
            width,
            data,
            mask,
            background,
        })
    }

    /// Total number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames * self.height * self.width
    }

    /// Whether the shoebox holds no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of pixels in one image plane.
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.height * self.width
    }

    /// Flat index of a pixel.
    #[inline]
    pub fn index(&self, frame: usize, row: usize, col: usize) -> usize {
        (frame * self.height + row) * self.width + col
    }
}
