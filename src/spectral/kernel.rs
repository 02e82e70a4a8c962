//! Windowed, zero-padded forward/inverse real FFT kernels.
//!
//! Two kernels share the same scaffold: the input frame is centred inside a
//! zero-padded FFT buffer, multiplied point-wise by the analysis window(s),
//! and transformed; synthesis mirrors the spectrum into a full complex
//! buffer, inverse-transforms, applies the plain window again and extracts
//! the centred `window_len` samples. Plans and scratch are allocated once at
//! construction; the per-hop path never allocates.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::core::fft::{COMPLEX_ZERO, MIN_MASS_THRESHOLD};
use crate::core::window::{hann_window, reassignment_windows};
use crate::spectral::frame::SpectralPoint;

const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

/// Plain-Hann analysis/synthesis kernel used by the CDF engine.
pub struct StftKernel {
    window_len: usize,
    fft_len: usize,
    num_bins: usize,
    pad_offset: usize,
    window: Vec<f64>,
    fft_forward: Arc<dyn Fft<f64>>,
    fft_inverse: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl StftKernel {
    /// Builds the kernel for the given window and (even) FFT length.
    pub fn new(window_len: usize, fft_len: usize) -> Self {
        debug_assert!(fft_len >= window_len);
        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(fft_len);
        let fft_inverse = planner.plan_fft_inverse(fft_len);
        let scratch_len = fft_forward
            .get_inplace_scratch_len()
            .max(fft_inverse.get_inplace_scratch_len());
        Self {
            window_len,
            fft_len,
            num_bins: fft_len / 2 + 1,
            pad_offset: (fft_len - window_len) / 2,
            window: hann_window(window_len),
            fft_forward,
            fft_inverse,
            buffer: vec![COMPLEX_ZERO; fft_len],
            scratch: vec![COMPLEX_ZERO; scratch_len],
        }
    }

    /// Number of spectral bins (`fft_len / 2 + 1`).
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// The analysis window.
    #[inline]
    pub fn window(&self) -> &[f64] {
        &self.window
    }

    /// Windows `frame`, zero-pads symmetrically and writes `num_bins`
    /// complex bins into `spectrum`.
    pub fn analyse(&mut self, frame: &[f64], spectrum: &mut [Complex<f64>]) {
        debug_assert_eq!(frame.len(), self.window_len);
        debug_assert_eq!(spectrum.len(), self.num_bins);
        self.buffer.fill(COMPLEX_ZERO);
        for (i, (&sample, &w)) in frame.iter().zip(self.window.iter()).enumerate() {
            self.buffer[self.pad_offset + i] = Complex::new(sample * w, 0.0);
        }
        self.fft_forward
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        spectrum.copy_from_slice(&self.buffer[..self.num_bins]);
    }

    /// Inverse-transforms `spectrum`, applies the plain window for
    /// squared-window overlap-add, scales by `1/fft_len` and writes the
    /// centred `window_len` samples.
    pub fn synthesise(&mut self, spectrum: &[Complex<f64>], frame_out: &mut [f64]) {
        debug_assert_eq!(spectrum.len(), self.num_bins);
        debug_assert_eq!(frame_out.len(), self.window_len);
        mirror_spectrum(&mut self.buffer, spectrum, self.fft_len);
        self.fft_inverse
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        let norm = 1.0 / self.fft_len as f64;
        for (i, out) in frame_out.iter_mut().enumerate() {
            *out = self.buffer[self.pad_offset + i].re * self.window[i] * norm;
        }
    }
}

/// Three-window analysis kernel for the reassignment engine.
///
/// Runs the plain, time-weighted and derivative Hann transforms of the same
/// frame; the ratios `X_t/X` and `X_d/X` yield the reassigned time and
/// frequency per bin.
pub struct ReassignKernel {
    window_len: usize,
    fft_len: usize,
    num_bins: usize,
    pad_offset: usize,
    window: Vec<f64>,
    window_time: Vec<f64>,
    window_deriv: Vec<f64>,
    freqs: Vec<f64>,
    fft_forward: Arc<dyn Fft<f64>>,
    fft_inverse: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex<f64>>,
    buffer_t: Vec<Complex<f64>>,
    buffer_d: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl ReassignKernel {
    /// Builds the kernel. `fft_len` must be even and at least `window_len`.
    pub fn new(window_len: usize, fft_len: usize, sample_rate: f64) -> Self {
        debug_assert!(fft_len >= window_len);
        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(fft_len);
        let fft_inverse = planner.plan_fft_inverse(fft_len);
        let scratch_len = fft_forward
            .get_inplace_scratch_len()
            .max(fft_inverse.get_inplace_scratch_len());
        let (window, window_time, window_deriv) = reassignment_windows(window_len, sample_rate);
        let num_bins = fft_len / 2 + 1;
        let freqs = (0..num_bins)
            .map(|i| i as f64 * sample_rate / fft_len as f64)
            .collect();
        Self {
            window_len,
            fft_len,
            num_bins,
            pad_offset: (fft_len - window_len) / 2,
            window,
            window_time,
            window_deriv,
            freqs,
            fft_forward,
            fft_inverse,
            buffer: vec![COMPLEX_ZERO; fft_len],
            buffer_t: vec![COMPLEX_ZERO; fft_len],
            buffer_d: vec![COMPLEX_ZERO; fft_len],
            scratch: vec![COMPLEX_ZERO; scratch_len],
        }
    }

    /// Number of spectral bins (`fft_len / 2 + 1`).
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// The plain analysis window.
    #[inline]
    pub fn window(&self) -> &[f64] {
        &self.window
    }

    /// Nominal bin-centre frequencies in Hz.
    #[inline]
    pub fn freqs(&self) -> &[f64] {
        &self.freqs
    }

    /// Analyzes one frame into spectral points with reassigned frequency and
    /// time. Bins whose plain-transform magnitude is numerically silent keep
    /// their nominal values.
    pub fn analyse(&mut self, frame: &[f64], spectrum: &mut [SpectralPoint]) {
        debug_assert_eq!(frame.len(), self.window_len);
        debug_assert_eq!(spectrum.len(), self.num_bins);

        self.buffer.fill(COMPLEX_ZERO);
        self.buffer_t.fill(COMPLEX_ZERO);
        self.buffer_d.fill(COMPLEX_ZERO);
        for (i, &sample) in frame.iter().enumerate() {
            let j = self.pad_offset + i;
            self.buffer[j] = Complex::new(sample * self.window[i], 0.0);
            self.buffer_t[j] = Complex::new(sample * self.window_time[i], 0.0);
            self.buffer_d[j] = Complex::new(sample * self.window_deriv[i], 0.0);
        }
        self.fft_forward
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        self.fft_forward
            .process_with_scratch(&mut self.buffer_t, &mut self.scratch);
        self.fft_forward
            .process_with_scratch(&mut self.buffer_d, &mut self.scratch);

        for (i, point) in spectrum.iter_mut().enumerate() {
            let x = self.buffer[i];
            let freq = self.freqs[i];
            point.value = x;
            point.freq = freq;
            if x.norm() > MIN_MASS_THRESHOLD {
                let ratio_d = self.buffer_d[i] / x;
                let ratio_t = self.buffer_t[i] / x;
                point.freq_reassigned = freq - ratio_d.im / TWO_PI;
                point.time_reassigned = ratio_t.re;
            } else {
                point.freq_reassigned = freq;
                point.time_reassigned = 0.0;
            }
        }
    }

    /// Inverse-transforms the point values, applies the plain window and
    /// scales by `1/fft_len`, writing the centred `window_len` samples.
    pub fn synthesise(&mut self, spectrum: &[SpectralPoint], frame_out: &mut [f64]) {
        debug_assert_eq!(spectrum.len(), self.num_bins);
        debug_assert_eq!(frame_out.len(), self.window_len);
        for (i, point) in spectrum.iter().enumerate() {
            self.buffer[i] = point.value;
        }
        mirror_in_place(&mut self.buffer, self.num_bins, self.fft_len);
        self.fft_inverse
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        let norm = 1.0 / self.fft_len as f64;
        for (i, out) in frame_out.iter_mut().enumerate() {
            *out = self.buffer[self.pad_offset + i].re * self.window[i] * norm;
        }
    }
}

/// Copies `spectrum` into the low half of `buffer` and mirrors the
/// conjugates into the negative-frequency half.
fn mirror_spectrum(buffer: &mut [Complex<f64>], spectrum: &[Complex<f64>], fft_len: usize) {
    let num_bins = spectrum.len();
    buffer[..num_bins].copy_from_slice(spectrum);
    for bin in 1..num_bins - 1 {
        buffer[fft_len - bin] = spectrum[bin].conj();
    }
}

/// Mirrors conjugates for a buffer whose low half is already populated.
fn mirror_in_place(buffer: &mut [Complex<f64>], num_bins: usize, fft_len: usize) {
    for bin in 1..num_bins - 1 {
        buffer[fft_len - bin] = buffer[bin].conj();
    }
}
