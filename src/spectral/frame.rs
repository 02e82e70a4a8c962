//! Per-bin spectral data produced by the analysis kernels.

use rustfft::num_complex::Complex;

/// One bin of an analyzed frame.
///
/// `freq` is the nominal bin-centre frequency. The reassigned fields refine
/// it from the ratios of the three parallel transforms (plain, time-weighted
/// and derivative windows); the CDF engine never reads them.
#[derive(Debug, Clone, Copy)]
pub struct SpectralPoint {
    /// Complex amplitude of the bin.
    pub value: Complex<f64>,
    /// Nominal bin-centre frequency in Hz.
    pub freq: f64,
    /// Reassigned frequency in Hz.
    pub freq_reassigned: f64,
    /// Reassigned time offset in seconds, relative to the window center.
    pub time_reassigned: f64,
}

impl SpectralPoint {
    /// A zero-amplitude point at the given nominal frequency.
    #[inline]
    pub fn at_freq(freq: f64) -> Self {
        Self {
            value: Complex::new(0.0, 0.0),
            freq,
            freq_reassigned: freq,
            time_reassigned: 0.0,
        }
    }
}

/// A contiguous run of bins treated as one transportable quantum.
///
/// The masses of a frame partition `[0, num_bins)`: each mass's `left_bin`
/// is the previous mass's `right_bin`. `mass` is normalised by the frame's
/// total magnitude sum, so the masses of one frame sum to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectralMass {
    /// First bin of the run (inclusive).
    pub left_bin: usize,
    /// Turning bin where the reassigned frequency crosses nominal.
    pub center_bin: usize,
    /// One past the last bin of the run.
    pub right_bin: usize,
    /// Normalised weight in [0, 1].
    pub mass: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_point_preserves_frequency() {
        let p = SpectralPoint::at_freq(440.0);
        assert_eq!(p.freq, 440.0);
        assert_eq!(p.freq_reassigned, 440.0);
        assert_eq!(p.value.norm(), 0.0);
    }
}
