//! CDF transport engine: the lower-latency variant.
//!
//! Per hop: analyse both streams with a plain Hann window, build the
//! cumulative-distribution transport map between the magnitude spectra,
//! deposit interpolated magnitude along the map, and resynthesize with
//! squared-window overlap-add. Latency is half the analysis window.

use rustfft::num_complex::Complex;

use crate::core::fft::COMPLEX_ZERO;
use crate::core::types::MorphParams;
use crate::spectral::kernel::StftKernel;
use crate::stream::dispatcher::HopDispatcher;
use crate::transport::interpolate::CdfInterpolator;

pub struct CdfEngine {
    window_len: usize,
    hop_len: usize,
    fft_len: usize,
    num_bins: usize,
    latency: usize,
    window_secs: f64,
    kernel: StftKernel,
    dispatcher: HopDispatcher,
    interpolator: CdfInterpolator,
    // Scratch reused every hop; nothing below allocates after construction.
    main_scratch: Vec<f64>,
    side_scratch: Vec<f64>,
    synth_frame: Vec<f64>,
    spec_main: Vec<Complex<f64>>,
    spec_side: Vec<Complex<f64>>,
    spec_out: Vec<Complex<f64>>,
    mag_main: Vec<f64>,
    mag_side: Vec<f64>,
    phase_main: Vec<f64>,
    phase_side: Vec<f64>,
    mag_out: Vec<f64>,
    phase_out: Vec<f64>,
    freqs: Vec<f64>,
    /// Running next-hop phase seeds, one per bin.
    phases: Vec<f64>,
    warnings: u64,
}

impl CdfEngine {
    /// Builds the engine from validated parameters.
    pub fn new(params: &MorphParams) -> Self {
        // The window is rounded up to a multiple of 2·hop_divisor so the
        // squared-window overlap-add sums to a constant.
        let window_len = params.aligned_window_len();
        let hop_len = window_len / params.hop_divisor;
        let fft_len = window_len.next_power_of_two() * params.fft_multiplier;
        let num_bins = fft_len / 2 + 1;
        let latency = window_len / 2;
        let window_secs = window_len as f64 / params.sample_rate;

        let kernel = StftKernel::new(window_len, fft_len);
        let dispatcher = HopDispatcher::new(window_len, hop_len, 0, kernel.window());
        let freqs = (0..num_bins)
            .map(|i| i as f64 * params.sample_rate / fft_len as f64)
            .collect();

        Self {
            window_len,
            hop_len,
            fft_len,
            num_bins,
            latency,
            window_secs,
            kernel,
            dispatcher,
            interpolator: CdfInterpolator::new(num_bins),
            main_scratch: vec![0.0; window_len],
            side_scratch: vec![0.0; window_len],
            synth_frame: vec![0.0; window_len],
            spec_main: vec![COMPLEX_ZERO; num_bins],
            spec_side: vec![COMPLEX_ZERO; num_bins],
            spec_out: vec![COMPLEX_ZERO; num_bins],
            mag_main: vec![0.0; num_bins],
            mag_side: vec![0.0; num_bins],
            phase_main: vec![0.0; num_bins],
            phase_side: vec![0.0; num_bins],
            mag_out: vec![0.0; num_bins],
            phase_out: vec![0.0; num_bins],
            freqs,
            phases: vec![0.0; num_bins],
            warnings: 0,
        }
    }

    /// Fixed latency in samples: half the analysis window.
    #[inline]
    pub fn latency_samples(&self) -> usize {
        self.latency
    }

    /// The hop length in samples.
    #[inline]
    pub fn hop_len(&self) -> usize {
        self.hop_len
    }

    /// The analysis window length in samples, rounded up to a multiple of
    /// `2·hop_divisor`.
    #[inline]
    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// The zero-padded FFT length.
    #[inline]
    pub fn fft_len(&self) -> usize {
        self.fft_len
    }

    /// Recovered-degeneracy tally since construction.
    #[inline]
    pub fn warning_count(&self) -> u64 {
        self.warnings
    }

    /// Zeros all ring buffers, the phase vector, and cursors.
    pub fn reset(&mut self) {
        self.dispatcher.reset();
        self.phases.fill(0.0);
    }

    /// Streams `io.len()` samples through the morph: `io` is the main input
    /// on entry and the morphed output on return.
    pub fn process_buffer(&mut self, io: &mut [f32], side: &[f32], k: f64) {
        debug_assert_eq!(io.len(), side.len());
        let mut done = 0;
        while done < io.len() {
            let take = self.dispatcher.ingest(&io[done..], &side[done..]);
            if self.dispatcher.hop_ready() {
                self.process_hop(k);
                self.dispatcher.complete_hop();
            }
            self.dispatcher.emit(&mut io[done..done + take]);
            done += take;
        }
    }

    /// Runs the analyse → transport → interpolate → synthesise chain for
    /// one hop and overlap-adds the result into the output ring.
    fn process_hop(&mut self, k: f64) {
        self.dispatcher
            .copy_frames(&mut self.main_scratch, &mut self.side_scratch);
        self.kernel.analyse(&self.main_scratch, &mut self.spec_main);
        self.kernel.analyse(&self.side_scratch, &mut self.spec_side);

        for i in 0..self.num_bins {
            self.mag_main[i] = self.spec_main[i].norm();
            self.mag_side[i] = self.spec_side[i].norm();
            self.phase_main[i] = self.spec_main[i].arg();
            self.phase_side[i] = self.spec_side[i].arg();
        }

        self.interpolator.interpolate(
            &self.mag_main,
            &self.phase_main,
            &self.mag_side,
            &self.phase_side,
            &self.freqs,
            self.window_secs,
            k,
            &mut self.phases,
            &mut self.mag_out,
            &mut self.phase_out,
            &mut self.warnings,
        );

        for i in 0..self.num_bins {
            self.spec_out[i] = Complex::from_polar(self.mag_out[i], self.phase_out[i]);
        }
        self.kernel.synthesise(&self.spec_out, &mut self.synth_frame);
        self.dispatcher.overlap_add(&self.synth_frame);
    }
}
