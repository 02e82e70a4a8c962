//! Cumulative-distribution transport map between two magnitude spectra.
//!
//! For 1-D distributions the optimal transport map has the closed form
//! `T = F_Y⁻¹ ∘ F_X` where `F_X`, `F_Y` are the cumulative distributions.
//! The map is computed bin-wise with a binary search over the monotone
//! target CDF.

use crate::core::fft::MIN_MASS_THRESHOLD;

/// Reusable CDF transport-map builder.
///
/// All buffers are allocated once for a fixed bin count; `build` never
/// allocates.
#[derive(Debug)]
pub struct CdfMapper {
    cdf_x: Vec<f64>,
    cdf_y: Vec<f64>,
    map: Vec<usize>,
}

impl CdfMapper {
    /// Creates a mapper for spectra of `num_bins` bins.
    pub fn new(num_bins: usize) -> Self {
        Self {
            cdf_x: vec![0.0; num_bins],
            cdf_y: vec![0.0; num_bins],
            map: vec![0; num_bins],
        }
    }

    /// Builds the transport map from `mag_x` to `mag_y`.
    ///
    /// `map[i]` is the smallest target bin `j` with `F_Y[j] ≥ F_X[i] − ε`.
    /// Callers are expected to short-circuit numerically silent spectra
    /// before invoking the builder; the internal sums are still clamped to
    /// `ε` so a degenerate call cannot divide by zero.
    pub fn build(&mut self, mag_x: &[f64], mag_y: &[f64]) -> &[usize] {
        let num_bins = self.map.len();
        debug_assert_eq!(mag_x.len(), num_bins);
        debug_assert_eq!(mag_y.len(), num_bins);

        let sum_x: f64 = mag_x.iter().sum::<f64>().max(MIN_MASS_THRESHOLD);
        let sum_y: f64 = mag_y.iter().sum::<f64>().max(MIN_MASS_THRESHOLD);

        let mut cumsum_x = 0.0;
        let mut cumsum_y = 0.0;
        for i in 0..num_bins {
            cumsum_x += mag_x[i] / sum_x;
            cumsum_y += mag_y[i] / sum_y;
            self.cdf_x[i] = cumsum_x;
            self.cdf_y[i] = cumsum_y;
        }

        for i in 0..num_bins {
            let target = self.cdf_x[i] - MIN_MASS_THRESHOLD;
            let j = self.cdf_y.partition_point(|&c| c < target);
            self.map[i] = j.min(num_bins - 1);
        }
        &self.map
    }

    /// The most recently built map.
    #[inline]
    pub fn map(&self) -> &[usize] {
        &self.map
    }
}
