//! Tests for the log-linear model families and the outer rejection loop.
//!
//! These tests verify:
//! - GLM recovery of flat and graded background surfaces
//! - Failure semantics when the eligible set cannot support the basis
//! - Monotonicity of the rejection loop across passes

use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;

use bgfit_rs::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

fn eligible_shoebox(frames: usize, height: usize, width: usize) -> Shoebox<f64> {
    let mut sbox = Shoebox::new(frames, height, width);
    for code in sbox.mask.iter_mut() {
        *code = MaskCode::VALID | MaskCode::BACKGROUND;
    }
    sbox
}

// ============================================================================
// Log-Linear Fits
// ============================================================================

#[test]
fn loglinear2d_recovers_a_flat_surface() {
    let mut sbox = eligible_shoebox(1, 5, 5);
    for v in sbox.data.iter_mut() {
        *v = 10.0;
    }

    let creator = Background::<f64>::new().model(LogLinear2d).build().unwrap();
    let stats = creator.shoebox(&mut sbox).unwrap();

    assert!(stats.success);
    for &b in &sbox.background {
        assert_relative_eq!(b, 10.0, epsilon = 1e-6);
    }
}

#[test]
fn loglinear3d_recovers_a_graded_surface() {
    let mut sbox = eligible_shoebox(2, 5, 5);
    // Noise-free log-linear intensities over the fitter's centred
    // coordinates: x = col - 2, y = row - 2, z = frame - 0.5.
    for frame in 0..2 {
        for row in 0..5 {
            for col in 0..5 {
                let x = col as f64 - 2.0;
                let y = row as f64 - 2.0;
                let z = frame as f64 - 0.5;
                let idx = sbox.index(frame, row, col);
                sbox.data[idx] = (1.5 + 0.1 * x + 0.05 * y - 0.2 * z).exp();
            }
        }
    }
    let expected = sbox.data.clone();

    let creator = Background::<f64>::new().model(LogLinear3d).build().unwrap();
    let stats = creator.shoebox(&mut sbox).unwrap();

    assert!(stats.success);
    for (&b, &e) in sbox.background.iter().zip(expected.iter()) {
        assert_relative_eq!(b, e, max_relative = 5e-2);
    }
}

#[test]
fn loglinear2d_graded_planes_fit_independently() {
    let mut sbox = eligible_shoebox(2, 5, 5);
    for frame in 0..2 {
        for row in 0..5 {
            for col in 0..5 {
                let x = col as f64 - 2.0;
                let scale = if frame == 0 { 2.0 } else { 2.5 };
                let idx = sbox.index(frame, row, col);
                sbox.data[idx] = (scale + 0.1 * x).exp();
            }
        }
    }
    let expected = sbox.data.clone();

    let creator = Background::<f64>::new().model(LogLinear2d).build().unwrap();
    let stats = creator.shoebox(&mut sbox).unwrap();

    assert!(stats.success);
    for (&b, &e) in sbox.background.iter().zip(expected.iter()) {
        assert_relative_eq!(b, e, max_relative = 5e-2);
    }
    assert_eq!(stats.plane_means.as_ref().map(Vec::len), Some(2));
}

#[test]
fn loglinear_fails_when_the_basis_is_unsupported() {
    // Two eligible pixels cannot determine three coefficients.
    let mut sbox = eligible_shoebox(1, 1, 2);
    sbox.data[0] = 5.0;
    sbox.data[1] = 6.0;

    let creator = Background::<f64>::new().model(LogLinear2d).build().unwrap();
    let stats = creator.shoebox(&mut sbox).unwrap();

    assert!(!stats.success);
    assert!(sbox.background.iter().all(|&b| b == 0.0));
}

// ============================================================================
// Rejection Loop
// ============================================================================

/// Rejects one additional pixel per pass and records the included count it
/// observed, so the test can assert the set never grows.
struct CountingRejector {
    observed: Arc<Mutex<Vec<usize>>>,
}

impl OutlierRejector<f64> for CountingRejector {
    fn reject(&self, _data: &[f64], _background: &[f64], included: &mut [bool]) -> bool {
        let count = included.iter().filter(|&&inc| inc).count();
        self.observed.lock().unwrap().push(count);

        for inc in included.iter_mut() {
            if *inc {
                *inc = false;
                return true;
            }
        }
        false
    }
}

#[test]
fn rejection_is_monotonic_across_passes() {
    let mut sbox = eligible_shoebox(1, 5, 5);
    for v in sbox.data.iter_mut() {
        *v = 10.0;
    }

    let observed = Arc::new(Mutex::new(Vec::new()));
    let creator = Background::<f64>::new()
        .model(Constant2d)
        .rejector(CountingRejector {
            observed: Arc::clone(&observed),
        })
        .build()
        .unwrap();

    creator.shoebox(&mut sbox).unwrap();

    let counts = observed.lock().unwrap().clone();
    assert!(!counts.is_empty());
    for pair in counts.windows(2) {
        assert!(pair[1] < pair[0]);
    }

    let outliers = sbox
        .mask
        .iter()
        .filter(|&&code| code & MaskCode::OUTLIER != 0)
        .count();
    assert_eq!(outliers, counts.len());
}
