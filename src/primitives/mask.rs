//! Pixel mask codes and eligibility predicates.
//!
//! ## Purpose
//!
//! The per-pixel `i32` mask carried by shoeboxes and image volumes encodes
//! pixel status as bit flags. The flag layout is an external contract shared
//! with the spot-finding and integration stages; this module records the
//! layout and the predicates the background stage needs.
//!
//! ## Key concepts
//!
//! * **Eligibility**: a pixel may enter background fitting iff it is valid
//!   and not part of the diffraction signal (`VALID` set, `FOREGROUND`
//!   clear).
//! * **Write-back**: after a successful fit, pixels that contributed to the
//!   model gain `BACKGROUND_USED`; pixels rejected during fitting gain
//!   `OUTLIER`.
//!
//! ## Non-goals
//!
//! * This module does not decide which pixels are foreground; that is the
//!   spot finder's job upstream.

/// Bit codes for the shared pixel mask contract.
///
/// The first six codes mirror the upstream processing contract. `OUTLIER`
/// is written by this crate to mark background pixels rejected during
/// robust fitting, so downstream stages can distinguish "never eligible"
/// from "eligible but rejected".
pub struct MaskCode;

impl MaskCode {
    /// Pixel holds a trustworthy count (inside trusted range, not masked).
    pub const VALID: i32 = 1 << 0;

    /// Pixel was labelled as background by the spot finder.
    pub const BACKGROUND: i32 = 1 << 1;

    /// Pixel belongs to the diffraction signal.
    pub const FOREGROUND: i32 = 1 << 2;

    /// Pixel belongs to a strong reflection.
    pub const STRONG: i32 = 1 << 3;

    /// Pixel was used by a background model fit.
    pub const BACKGROUND_USED: i32 = 1 << 4;

    /// Pixel is shared with a neighbouring reflection's shoebox.
    pub const OVERLAPPED: i32 = 1 << 5;

    /// Pixel was rejected as an outlier during background fitting.
    pub const OUTLIER: i32 = 1 << 6;
}

/// Whether a pixel may participate in background fitting.
#[inline]
pub fn is_background_eligible(code: i32) -> bool {
    code & MaskCode::VALID != 0 && code & MaskCode::FOREGROUND == 0
}

/// Mark a pixel as used by a successful background fit.
#[inline]
pub fn mark_background_used(code: &mut i32) {
    *code |= MaskCode::BACKGROUND_USED;
}

/// Mark a pixel as rejected by the fitting loop.
#[inline]
pub fn mark_outlier(code: &mut i32) {
    *code |= MaskCode::OUTLIER;
}
