//! Linear algebra backend for the log-linear model.
//!
//! ## Purpose
//!
//! This module bridges the crate's generic `Float` parameter to the
//! nalgebra backend that solves the weighted normal equations of the
//! log-linear background model.
//!
//! ## Design notes
//!
//! * Uses QR decomposition (Householder reflections) first, with an SVD
//!   fallback for rank-deficient systems — a nearly-flat background on a
//!   degenerate pixel layout can make the position columns collinear.
//! * The systems are tiny (3 or 4 coefficients); dynamic matrices keep the
//!   two plane/volume cases on one code path.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

// ============================================================================
// FloatLinalg Trait
// ============================================================================

/// Helper trait bridging generic `Float` types to the nalgebra backend.
pub trait FloatLinalg: Float + 'static {
    /// Solve the normal equations `X'WX * beta = X'Wz`.
    ///
    /// `a` is the `n x n` normal matrix in column-major order, `b` the
    /// right-hand side. Returns `None` when the system is singular beyond
    /// the SVD tolerance.
    fn solve_normal(a: &[Self], b: &[Self], n: usize) -> Option<Vec<Self>>;
}

impl FloatLinalg for f64 {
    #[inline]
    fn solve_normal(a: &[Self], b: &[Self], n: usize) -> Option<Vec<Self>> {
        nalgebra_backend::solve_normal_equations_f64(a, b, n)
    }
}

impl FloatLinalg for f32 {
    #[inline]
    fn solve_normal(a: &[Self], b: &[Self], n: usize) -> Option<Vec<Self>> {
        nalgebra_backend::solve_normal_equations_f32(a, b, n)
    }
}

// ============================================================================
// Nalgebra Backend Implementation
// ============================================================================

/// Nalgebra-based solvers.
pub mod nalgebra_backend {
    use super::*;
    use nalgebra::{DMatrix, DVector};

    /// Solve `X'WX * beta = X'Wz` in f64 precision.
    pub fn solve_normal_equations_f64(
        xtw_x: &[f64],
        xtw_z: &[f64],
        n_coeffs: usize,
    ) -> Option<Vec<f64>> {
        let matrix = DMatrix::from_column_slice(n_coeffs, n_coeffs, xtw_x);
        let rhs = DVector::from_column_slice(xtw_z);

        let qr = matrix.clone().qr();
        if let Some(solution) = qr.solve(&rhs) {
            return Some(solution.as_slice().to_vec());
        }

        matrix
            .svd(true, true)
            .solve(&rhs, f64::EPSILON * 100.0)
            .ok()
            .map(|s: DVector<f64>| s.as_slice().to_vec())
    }

    /// Solve `X'WX * beta = X'Wz` in f32 precision.
    pub fn solve_normal_equations_f32(
        xtw_x: &[f32],
        xtw_z: &[f32],
        n_coeffs: usize,
    ) -> Option<Vec<f32>> {
        let matrix = DMatrix::from_column_slice(n_coeffs, n_coeffs, xtw_x);
        let rhs = DVector::from_column_slice(xtw_z);

        let qr = matrix.clone().qr();
        if let Some(solution) = qr.solve(&rhs) {
            return Some(solution.as_slice().to_vec());
        }

        matrix
            .svd(true, true)
            .solve(&rhs, f32::EPSILON * 100.0)
            .ok()
            .map(|s: DVector<f32>| s.as_slice().to_vec())
    }
}
