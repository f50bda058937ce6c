//! Pixel classification from mask bits.
//!
//! ## Purpose
//!
//! Partitions shoebox pixels into the background-eligible set and the
//! excluded set, from the mask alone. The planar variant serves the 2D
//! model families (one classification per image plane), the volume variant
//! the 3D families.
//!
//! ## Design notes
//!
//! * Pure functions of the mask; intensities are never consulted.
//! * Eligibility is `VALID` set and `FOREGROUND` clear (`mask` module);
//!   everything else — including `OVERLAPPED` handling — is the upstream
//!   pipeline's concern, encoded in the bits before the fit is invoked.
//!
//! ## Non-goals
//!
//! * No outlier logic here; rejection during fitting operates on the
//!   eligible set after classification.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// Internal dependencies
use crate::primitives::mask::is_background_eligible;

/// Flat indices of background-eligible pixels across the whole volume.
pub fn eligible_volume_indices(mask: &[i32]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|(_, &code)| is_background_eligible(code))
        .map(|(i, _)| i)
        .collect()
}

/// Flat indices of background-eligible pixels within one image plane.
///
/// `plane_len` is `height * width`; returned indices address the full
/// volume array.
pub fn eligible_plane_indices(mask: &[i32], plane: usize, plane_len: usize) -> Vec<usize> {
    let start = plane * plane_len;
    let end = start + plane_len;
    mask[start..end]
        .iter()
        .enumerate()
        .filter(|(_, &code)| is_background_eligible(code))
        .map(|(i, _)| start + i)
        .collect()
}
