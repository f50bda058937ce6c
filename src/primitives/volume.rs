//! Multi-panel image volume and reflection bounding boxes.
//!
//! ## Purpose
//!
//! The batch entry point that processes a whole set of reflections works
//! directly against the detector image volume rather than pre-extracted
//! shoeboxes. This module holds the minimal volume containers that
//! operation needs: per-panel pixel/background/mask planes over a frame
//! range, and per-reflection bounding boxes addressing them.
//!
//! ## Design notes
//!
//! * **Minimal on purpose**: reflection bookkeeping is owned by the
//!   surrounding pipeline. Only the fields the background stage touches are
//!   modelled here.
//! * **Half-open bounds**: bounding boxes follow the upstream convention
//!   `[x0, x1) x [y0, y1) x [z0, z1)` with `z` counting detector frames.
//!   Boxes may overhang the recorded volume; they are clipped before
//!   extraction.
//!
//! ## Invariants
//!
//! * All three arrays of a panel have `frames() * height * width` elements,
//!   frame-major.

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

// ============================================================================
// Bounding Boxes
// ============================================================================

/// Half-open pixel bounds of one reflection: `[x0, x1) x [y0, y1) x [z0, z1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bbox {
    /// First column.
    pub x0: isize,
    /// One past the last column.
    pub x1: isize,
    /// First row.
    pub y0: isize,
    /// One past the last row.
    pub y1: isize,
    /// First frame.
    pub z0: isize,
    /// One past the last frame.
    pub z1: isize,
}

/// One reflection's location in a multi-panel volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectionRef {
    /// Detector panel holding the reflection.
    pub panel: usize,
    /// Bounding box on that panel.
    pub bbox: Bbox,
}

// ============================================================================
// Image Volume
// ============================================================================

/// Pixel, background, and mask planes of one detector panel over a frame
/// range `[frame0, frame1)`.
#[derive(Debug, Clone)]
pub struct ImageVolume<T: Float> {
    /// First recorded frame.
    pub frame0: isize,
    /// One past the last recorded frame.
    pub frame1: isize,
    /// Panel height in pixels.
    pub height: usize,
    /// Panel width in pixels.
    pub width: usize,
    /// Observed counts, frame-major.
    pub data: Vec<T>,
    /// Fitted background, written by the creator.
    pub background: Vec<T>,
    /// Per-pixel status bits.
    pub mask: Vec<i32>,
}

impl<T: Float> ImageVolume<T> {
    /// Allocate a zeroed panel volume with every pixel marked valid.
    pub fn new(frame0: isize, frame1: isize, height: usize, width: usize) -> Self {
        let frames = (frame1 - frame0).max(0) as usize;
        let n = frames * height * width;
        Self {
            frame0,
            frame1,
            height,
            width,
            data: vec![T::zero(); n],
            background: vec![T::zero(); n],
            mask: vec![crate::primitives::mask::MaskCode::VALID; n],
        }
    }

    /// Number of recorded frames.
    #[inline]
    pub fn frames(&self) -> usize {
        (self.frame1 - self.frame0).max(0) as usize
    }

    /// Flat index of a pixel addressed by absolute frame number.
    #[inline]
    pub fn index(&self, frame: isize, row: usize, col: usize) -> usize {
        ((frame - self.frame0) as usize * self.height + row) * self.width + col
    }

    /// Clip a bounding box to the recorded extent of this panel.
    pub fn clip(&self, bbox: &Bbox) -> Bbox {
        Bbox {
            x0: bbox.x0.max(0),
            x1: bbox.x1.min(self.width as isize),
            y0: bbox.y0.max(0),
            y1: bbox.y1.min(self.height as isize),
            z0: bbox.z0.max(self.frame0),
            z1: bbox.z1.min(self.frame1),
        }
    }
}

// ============================================================================
// Multi-Panel Volume
// ============================================================================

/// Image volumes for every panel of the detector.
#[derive(Debug, Clone)]
pub struct MultiPanelImageVolume<T: Float> {
    /// Per-panel volumes, indexed by panel number.
    pub panels: Vec<ImageVolume<T>>,
}

impl<T: Float> MultiPanelImageVolume<T> {
    /// Wrap a set of panel volumes.
    pub fn new(panels: Vec<ImageVolume<T>>) -> Self {
        Self { panels }
    }

    /// Number of panels.
    #[inline]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Whether the volume has no panels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
