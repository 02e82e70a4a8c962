//! Engine façade: lifecycle, algorithm selection, and the real-time
//! process entry points.

pub mod cdf;
pub mod reassign;

pub use cdf::CdfEngine;
pub use reassign::ReassignEngine;

use crate::core::types::{Algorithm, MorphParams};
use crate::error::MorphError;

/// Real-time spectral morpher between a main and a sidechain stream.
///
/// Both engine variants are instantiated at construction and kept alive, so
/// switching algorithms is a flip plus a warm-up of the incoming engine.
/// `process` is the only real-time operation: it never blocks, allocates or
/// fails. Construction, `reset`, `set_sample_rate` and `reconfigure` are
/// host-sequenced non-real-time events.
///
/// # Example
///
/// ```
/// use spectromorph::{MorphParams, SpectralMorph};
///
/// let mut morph = SpectralMorph::new(MorphParams::new()).unwrap();
/// let main = vec![0.0f32; 512];
/// let side = vec![0.0f32; 512];
/// let mut out = vec![0.0f32; 512];
/// morph.process(&main, &side, &mut out, 0.5);
/// assert!(morph.latency_samples() > 0);
/// ```
pub struct SpectralMorph {
    params: MorphParams,
    algorithm: Algorithm,
    cdf: CdfEngine,
    reassign: ReassignEngine,
}

impl SpectralMorph {
    /// Builds both engine variants and zeros all state.
    ///
    /// # Errors
    ///
    /// Returns a [`MorphError`] when the parameters cannot produce a usable
    /// window/hop/FFT configuration.
    pub fn new(params: MorphParams) -> Result<Self, MorphError> {
        params.validate()?;
        Ok(Self {
            algorithm: params.algorithm,
            cdf: CdfEngine::new(&params),
            reassign: ReassignEngine::new(&params),
            params,
        })
    }

    /// Morphs one block: reads `main` and `side`, writes `out`.
    ///
    /// All three slices must have equal length; `k` is clamped to `[0, 1]`
    /// (`0` = pure main, `1` = pure sidechain). Block sizes are arbitrary
    /// and may vary call to call without affecting the output stream.
    pub fn process(&mut self, main: &[f32], side: &[f32], out: &mut [f32], k: f32) {
        assert_eq!(main.len(), out.len(), "main/out length mismatch");
        out.copy_from_slice(main);
        self.process_in_place(out, side, k);
    }

    /// Morphs one block in place: `io` is the main input on entry and the
    /// morphed output on return. This is the aliasing form the plugin host
    /// uses when output overwrites the main input buffer.
    pub fn process_in_place(&mut self, io: &mut [f32], side: &[f32], k: f32) {
        assert_eq!(io.len(), side.len(), "main/side length mismatch");
        let k = f64::from(k.clamp(0.0, 1.0));
        match self.algorithm {
            Algorithm::Cdf => self.cdf.process_buffer(io, side, k),
            Algorithm::Reassignment => self.reassign.process_buffer(io, side, k),
        }
    }

    /// Zeros all ring buffers, phase vectors and cursors of both variants.
    /// Idempotent; the engine is immediately reusable.
    pub fn reset(&mut self) {
        self.cdf.reset();
        self.reassign.reset();
    }

    /// Latency of the active algorithm in samples. Constant between
    /// reconfigurations; hosts re-query it after `prepare` and after every
    /// algorithm switch.
    #[inline]
    pub fn latency_samples(&self) -> usize {
        match self.algorithm {
            Algorithm::Cdf => self.cdf.latency_samples(),
            Algorithm::Reassignment => self.reassign.latency_samples(),
        }
    }

    /// The active algorithm.
    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Switches the transport algorithm.
    ///
    /// The incoming engine is reset so it re-latches from silence within
    /// one latency interval. Returns `true` when the reported latency
    /// changed and the host should re-apply delay compensation.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> bool {
        if algorithm == self.algorithm {
            return false;
        }
        let old_latency = self.latency_samples();
        match algorithm {
            Algorithm::Cdf => self.cdf.reset(),
            Algorithm::Reassignment => self.reassign.reset(),
        }
        self.algorithm = algorithm;
        self.latency_samples() != old_latency
    }

    /// Rebuilds both engines for a new sample rate, keeping the configured
    /// window duration, overlap and padding. Calling it with the current
    /// rate is a no-op that preserves all streaming state. Not real-time
    /// safe.
    ///
    /// # Errors
    ///
    /// Returns a [`MorphError`] when the resulting configuration is
    /// invalid; the previous configuration stays live in that case.
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<(), MorphError> {
        if sample_rate == self.params.sample_rate {
            return Ok(());
        }
        let params = self.params.clone().with_sample_rate(sample_rate);
        self.reconfigure(params)
    }

    /// Replaces the configuration wholesale, rebuilding both engines.
    /// Not real-time safe.
    ///
    /// # Errors
    ///
    /// Returns a [`MorphError`] when the parameters are invalid; the
    /// previous configuration stays live in that case.
    pub fn reconfigure(&mut self, params: MorphParams) -> Result<(), MorphError> {
        params.validate()?;
        self.cdf = CdfEngine::new(&params);
        self.reassign = ReassignEngine::new(&params);
        self.algorithm = params.algorithm;
        self.params = params;
        Ok(())
    }

    /// The current configuration.
    #[inline]
    pub fn params(&self) -> &MorphParams {
        &self.params
    }

    /// Total recovered numerical degeneracies across both variants since
    /// construction. Diagnostics only; recoveries never affect the
    /// real-time contract.
    #[inline]
    pub fn warning_count(&self) -> u64 {
        self.cdf.warning_count() + self.reassign.warning_count()
    }
}

impl std::fmt::Debug for SpectralMorph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralMorph")
            .field("algorithm", &self.algorithm)
            .field("sample_rate", &self.params.sample_rate)
            .field("window_ms", &self.params.window_ms)
            .field("latency_samples", &self.latency_samples())
            .finish()
    }
}
