//! Reassignment transport engine: the higher-resolution variant.
//!
//! Per hop: analyse both streams with the plain/time/derivative window
//! trio, group each spectrum into masses by the sign of the reassigned
//! frequency offset, match the masses with the greedy 1-D Wasserstein plan,
//! and copy-shift each matched pair onto its interpolated centre with a
//! phase derived from the running phase vector. The interpolator needs one
//! lookahead hop to stabilise phase seeds, so latency is
//! `(2·hop_divisor − 1)` hops.

use crate::core::types::MorphParams;
use crate::spectral::frame::SpectralPoint;
use crate::spectral::kernel::ReassignKernel;
use crate::stream::dispatcher::HopDispatcher;
use crate::transport::interpolate::MassInterpolator;

pub struct ReassignEngine {
    window_len: usize,
    hop_len: usize,
    fft_len: usize,
    latency: usize,
    window_secs: f64,
    kernel: ReassignKernel,
    dispatcher: HopDispatcher,
    interpolator: MassInterpolator,
    main_scratch: Vec<f64>,
    side_scratch: Vec<f64>,
    synth_frame: Vec<f64>,
    spec_main: Vec<SpectralPoint>,
    spec_side: Vec<SpectralPoint>,
    spec_out: Vec<SpectralPoint>,
    /// Running next-hop phase seeds, one per bin.
    phases: Vec<f64>,
    warnings: u64,
}

impl ReassignEngine {
    /// Builds the engine from validated parameters.
    pub fn new(params: &MorphParams) -> Self {
        // The window must divide evenly into 2·hop_divisor hops so the
        // half-hop overlap pattern tiles exactly.
        let window_len = params.aligned_window_len();
        let hop_len = window_len / (2 * params.hop_divisor);
        let fft_len = window_len * (1 + params.fft_multiplier);
        let num_bins = fft_len / 2 + 1;
        let latency = (2 * params.hop_divisor - 1) * hop_len;
        let window_secs = params.window_ms / 1000.0;

        let kernel = ReassignKernel::new(window_len, fft_len, params.sample_rate);
        let dispatcher =
            HopDispatcher::new(window_len, hop_len, latency - hop_len, kernel.window());

        Self {
            window_len,
            hop_len,
            fft_len,
            latency,
            window_secs,
            kernel,
            dispatcher,
            interpolator: MassInterpolator::new(num_bins),
            main_scratch: vec![0.0; window_len],
            side_scratch: vec![0.0; window_len],
            synth_frame: vec![0.0; window_len],
            spec_main: vec![SpectralPoint::at_freq(0.0); num_bins],
            spec_side: vec![SpectralPoint::at_freq(0.0); num_bins],
            spec_out: vec![SpectralPoint::at_freq(0.0); num_bins],
            phases: vec![0.0; num_bins],
            warnings: 0,
        }
    }

    /// Fixed latency in samples: `(2·hop_divisor − 1)` hops.
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

    fn process_hop(&mut self, k: f64) {
        self.dispatcher
            .copy_frames(&mut self.main_scratch, &mut self.side_scratch);
        self.kernel.analyse(&self.main_scratch, &mut self.spec_main);
        self.kernel.analyse(&self.side_scratch, &mut self.spec_side);

        self.interpolator.interpolate(
            &self.spec_main,
            &self.spec_side,
            self.window_secs,
            k,
            &mut self.phases,
            &mut self.spec_out,
            &mut self.warnings,
        );

        self.kernel.synthesise(&self.spec_out, &mut self.synth_frame);
        self.dispatcher.overlap_add(&self.synth_frame);
    }
}
