//! Core types shared across the crate: samples, parameters, algorithm choice.

use crate::error::MorphError;

/// A single audio sample (32-bit float, range -1.0 to 1.0).
pub type Sample = f32;

/// Transport algorithm variant.
///
/// Both variants share the streaming skeleton (hop dispatcher, overlap-add
/// ring, phase vector) and differ in how the transport map between the two
/// spectra is built and applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Cumulative-distribution transport map, `O(N)` per hop. Lower latency.
    #[default]
    Cdf,
    /// Spectral-mass grouping over reassigned frequencies plus a greedy
    /// 1-D Wasserstein matcher. Better frequency localization, one extra
    /// lookahead hop of latency.
    Reassignment,
}

/// Parameters for the spectral morphing engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphParams {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Analysis window duration in milliseconds.
    pub window_ms: f64,
    /// Hop size as a fraction of the window; 4 means 75% overlap.
    pub hop_divisor: usize,
    /// FFT zero-padding multiplier; 2 means 2x padding.
    pub fft_multiplier: usize,
    /// Transport algorithm variant.
    pub algorithm: Algorithm,
}

impl Default for MorphParams {
    fn default() -> Self {
        Self::new()
    }
}

impl MorphParams {
    /// Creates parameters with the plugin defaults: 44.1 kHz, 100 ms window,
    /// 75% overlap, 2x zero-padding, CDF transport.
    pub fn new() -> Self {
        Self {
            sample_rate: 44100.0,
            window_ms: 100.0,
            hop_divisor: 4,
            fft_multiplier: 2,
            algorithm: Algorithm::Cdf,
        }
    }

    /// Sets the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Sets the analysis window duration in milliseconds.
    pub fn with_window_ms(mut self, window_ms: f64) -> Self {
        self.window_ms = window_ms;
        self
    }

    /// Sets the hop divisor (overlap ratio is `1 − 1/divisor`).
    pub fn with_hop_divisor(mut self, hop_divisor: usize) -> Self {
        self.hop_divisor = hop_divisor;
        self
    }

    /// Sets the FFT zero-padding multiplier.
    pub fn with_fft_multiplier(mut self, fft_multiplier: usize) -> Self {
        self.fft_multiplier = fft_multiplier;
        self
    }

    /// Sets the transport algorithm variant.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Window length in samples at the configured rate, before alignment.
    #[inline]
    pub fn window_len(&self) -> usize {
        (self.window_ms * self.sample_rate / 1000.0) as usize
    }

    /// Window length rounded up to the next multiple of `2·hop_divisor`.
    ///
    /// Both engine variants use this length so that overlapped hops tile
    /// the window exactly and the squared-window overlap-add sums to a
    /// constant.
    #[inline]
    pub fn aligned_window_len(&self) -> usize {
        let step = 2 * self.hop_divisor;
        let window_len = self.window_len();
        match window_len % step {
            0 => window_len,
            rem => window_len + step - rem,
        }
    }

    /// Validates the parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::InvalidConfig`] for non-positive sizes and
    /// [`MorphError::WindowTooShort`] when the window cannot hold a single
    /// hop at the requested overlap.
    pub fn validate(&self) -> Result<(), MorphError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(MorphError::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if !self.window_ms.is_finite() || self.window_ms <= 0.0 {
            return Err(MorphError::InvalidConfig(format!(
                "window size must be positive, got {} ms",
                self.window_ms
            )));
        }
        if self.hop_divisor < 2 {
            return Err(MorphError::InvalidConfig(format!(
                "hop divisor must be at least 2, got {}",
                self.hop_divisor
            )));
        }
        if self.fft_multiplier == 0 {
            return Err(MorphError::InvalidConfig(
                "fft multiplier must be at least 1".to_string(),
            ));
        }
        let window_len = self.window_len();
        let minimum = 2 * self.hop_divisor;
        if window_len < minimum {
            return Err(MorphError::WindowTooShort {
                window_len,
                minimum,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_defaults() {
        let params = MorphParams::new();
        assert_eq!(params.window_len(), 4410);
        assert_eq!(params.hop_divisor, 4);
        assert_eq!(params.fft_multiplier, 2);
        assert_eq!(params.algorithm, Algorithm::Cdf);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_builder() {
        let params = MorphParams::new()
            .with_sample_rate(48000.0)
            .with_window_ms(50.0)
            .with_hop_divisor(8)
            .with_fft_multiplier(4)
            .with_algorithm(Algorithm::Reassignment);
        assert_eq!(params.window_len(), 2400);
        assert_eq!(params.hop_divisor, 8);
        assert_eq!(params.algorithm, Algorithm::Reassignment);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_rejects_nonpositive_sizes() {
        assert!(MorphParams::new().with_sample_rate(0.0).validate().is_err());
        assert!(MorphParams::new().with_sample_rate(-1.0).validate().is_err());
        assert!(MorphParams::new().with_window_ms(0.0).validate().is_err());
        assert!(MorphParams::new()
            .with_window_ms(f64::NAN)
            .validate()
            .is_err());
        assert!(MorphParams::new().with_fft_multiplier(0).validate().is_err());
        assert!(MorphParams::new().with_hop_divisor(1).validate().is_err());
    }

    #[test]
    fn test_aligned_window_len_is_divisible() {
        let params = MorphParams::new();
        assert_eq!(params.window_len(), 4410);
        // 4410 is not a multiple of 8; alignment bumps it to 4416.
        assert_eq!(params.aligned_window_len(), 4416);

        let params = MorphParams::new().with_sample_rate(48000.0);
        assert_eq!(params.aligned_window_len(), 4800);

        for divisor in [2usize, 4, 8] {
            let params = MorphParams::new().with_hop_divisor(divisor);
            assert_eq!(params.aligned_window_len() % (2 * divisor), 0);
        }
    }

    #[test]
    fn test_params_rejects_unusably_short_window() {
        // 0.1 ms at 44.1 kHz is 4 samples; an 8-sample minimum applies at
        // hop divisor 4.
        let params = MorphParams::new().with_window_ms(0.1);
        assert!(matches!(
            params.validate(),
            Err(MorphError::WindowTooShort { .. })
        ));
    }
}
