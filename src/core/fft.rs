//! FFT-related constants shared across the crate.

use rustfft::num_complex::Complex;

/// Zero-valued complex number, used for FFT buffer initialization.
pub const COMPLEX_ZERO: Complex<f64> = Complex::new(0.0, 0.0);

/// Threshold below which a spectral mass or magnitude sum counts as silent.
///
/// Divisions by quantities smaller than this are clamped or short-circuited
/// before they can produce non-finite state.
pub const MIN_MASS_THRESHOLD: f64 = 1e-10;

/// Reassigned frequencies below this cutoff are attenuated by a squared
/// linear ramp to suppress near-DC beating between hops.
pub const LOW_FREQ_CUTOFF_HZ: f64 = 30.0;

/// Absolute floor for overlap-add gain normalization to prevent division
/// by zero at window edges.
pub const OVERLAP_GAIN_EPSILON: f64 = 1e-6;
