//! Window functions for spectral analysis.
//!
//! Provides the plain Hann window used by both engine variants, plus the
//! time-weighted and derivative Hann variants that drive spectrogram
//! reassignment (Auger–Flandrin). The reassignment trio is evaluated on a
//! centered sample axis so that the three transforms stay phase-aligned.

use std::f64::consts::PI;

const TWO_PI: f64 = 2.0 * PI;

/// Returns `Some(trivial_window)` for degenerate sizes (0 or 1), or `None`
/// to indicate the caller should compute the full window.
#[inline]
fn trivial_window(size: usize) -> Option<Vec<f64>> {
    match size {
        0 => Some(vec![]),
        1 => Some(vec![1.0]),
        _ => None,
    }
}

/// Generates a symmetric Hann window: `w[n] = 0.5·(1 − cos(2πn/(L−1)))`.
pub fn hann_window(size: usize) -> Vec<f64> {
    if let Some(w) = trivial_window(size) {
        return w;
    }
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = TWO_PI * i as f64 / (n - 1.0);
            0.5 * (1.0 - x.cos())
        })
        .collect()
}

/// Plain Hann evaluated at a centered offset `n ∈ [−(L−1)/2, (L−1)/2]`.
///
/// Same `L−1` denominator as [`hann_window`], so the centered and indexed
/// forms describe the identical window.
#[inline]
pub fn hann_point(n: f64, size: usize) -> f64 {
    0.5 * (1.0 + (TWO_PI * n / (size as f64 - 1.0)).cos())
}

/// Time-weighted Hann: the plain window scaled by the offset in seconds.
#[inline]
pub fn hann_time_point(n: f64, size: usize, sample_rate: f64) -> f64 {
    (n / sample_rate) * hann_point(n, size)
}

/// Derivative Hann: `d/dt` of the plain window, in units of 1/s.
#[inline]
pub fn hann_derivative_point(n: f64, size: usize, sample_rate: f64) -> f64 {
    let denom = size as f64 - 1.0;
    -(PI / denom) * (TWO_PI * n / denom).sin() * sample_rate
}

/// Builds the reassignment window trio (plain, time-weighted, derivative),
/// all evaluated on the centered axis `n = i − (L−1)/2`.
pub fn reassignment_windows(size: usize, sample_rate: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut plain = vec![0.0; size];
    let mut time = vec![0.0; size];
    let mut derivative = vec![0.0; size];
    let center = (size as f64 - 1.0) / 2.0;
    for i in 0..size {
        let n = i as f64 - center;
        plain[i] = hann_point(n, size);
        time[i] = hann_time_point(n, size, sample_rate);
        derivative[i] = hann_derivative_point(n, size, sample_rate);
    }
    (plain, time, derivative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window_properties() {
        let w = hann_window(1024);
        assert_eq!(w.len(), 1024);
        // First and last should be near zero
        assert!(w[0].abs() < 1e-12);
        assert!(w[1023].abs() < 1e-12);
        // Symmetric
        for i in 0..512 {
            assert!((w[i] - w[1023 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_empty_and_single_sample_window() {
        assert!(hann_window(0).is_empty());
        assert_eq!(hann_window(1), vec![1.0]);
    }

    #[test]
    fn test_reassignment_plain_peaks_at_center() {
        let (plain, _, _) = reassignment_windows(512, 44100.0);
        let max = plain.iter().cloned().fold(0.0f64, f64::max);
        assert!((max - 1.0).abs() < 1e-4);
        let peak_idx = plain
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert!(peak_idx == 255 || peak_idx == 256);
    }

    #[test]
    fn test_centered_form_matches_indexed_window() {
        // The centered trio and the indexed CDF window must describe the
        // same Hann curve.
        let size = 512;
        let w = hann_window(size);
        let center = (size as f64 - 1.0) / 2.0;
        for i in 0..size {
            let n = i as f64 - center;
            assert!(
                (w[i] - hann_point(n, size)).abs() < 1e-12,
                "mismatch at {}: {} vs {}",
                i,
                w[i],
                hann_point(n, size)
            );
        }
    }

    #[test]
    fn test_time_window_is_offset_scaled_plain() {
        let sr = 48000.0;
        let (plain, time, _) = reassignment_windows(256, sr);
        let center = (256.0 - 1.0) / 2.0;
        for i in 0..256 {
            let n = i as f64 - center;
            assert!((time[i] - (n / sr) * plain[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_derivative_window_matches_finite_difference() {
        let sr = 44100.0;
        let size = 1024usize;
        let center = (size as f64 - 1.0) / 2.0;
        // Compare the analytic derivative against a central difference of the
        // plain window, scaled from per-sample to per-second.
        for i in 1..size - 1 {
            let n = i as f64 - center;
            let analytic = hann_derivative_point(n, size, sr);
            let numeric = (hann_point(n + 1.0, size) - hann_point(n - 1.0, size)) / 2.0 * sr;
            assert!(
                (analytic - numeric).abs() < 1e-2 * sr / size as f64,
                "derivative mismatch at {}: {} vs {}",
                i,
                analytic,
                numeric
            );
        }
    }

    #[test]
    fn test_derivative_window_antisymmetric() {
        let (_, _, d) = reassignment_windows(512, 44100.0);
        for i in 0..256 {
            assert!((d[i] + d[511 - i]).abs() < 1e-6);
        }
    }
}
