//! Spectrum interpolators: combine two analyzed frames through a transport
//! map into one frame while keeping phase continuous across hops.
//!
//! Both variants share the silence short-circuit and the running phase
//! vector contract: the vector stores the next-hop phase seed per bin and is
//! the only spectral memory between hops besides the overlap-add ring.

use log::{debug, warn};
use rustfft::num_complex::Complex;

use crate::core::fft::{LOW_FREQ_CUTOFF_HZ, MIN_MASS_THRESHOLD};
use crate::spectral::frame::{SpectralMass, SpectralPoint};
use crate::transport::cdf::CdfMapper;
use crate::transport::mass::{group_spectrum, transport_matrix, TransportTriple};

const TWO_PI: f64 = 2.0 * std::f64::consts::PI;
const PI: f64 = std::f64::consts::PI;

/// CDF-map interpolator over magnitude/phase spectra.
///
/// Each source bin is moved toward its transport target by the morph factor,
/// depositing linearly interpolated magnitude into the two nearest bins and
/// accumulating a magnitude-weighted source-phase average.
#[derive(Debug)]
pub struct CdfInterpolator {
    mapper: CdfMapper,
    weight_sum: Vec<f64>,
    phase_accum: Vec<f64>,
}

impl CdfInterpolator {
    /// Creates an interpolator for spectra of `num_bins` bins.
    pub fn new(num_bins: usize) -> Self {
        Self {
            mapper: CdfMapper::new(num_bins),
            weight_sum: vec![0.0; num_bins],
            phase_accum: vec![0.0; num_bins],
        }
    }

    /// Interpolates the two spectra at morph factor `k` and advances the
    /// running phase vector by half a window per bin.
    ///
    /// `freqs` are the nominal bin-centre frequencies in Hz; `window_secs`
    /// the analysis window duration. Recovered degeneracies are added to
    /// `warnings`.
    #[allow(clippy::too_many_arguments)]
    pub fn interpolate(
        &mut self,
        mag_x: &[f64],
        phase_x: &[f64],
        mag_y: &[f64],
        phase_y: &[f64],
        freqs: &[f64],
        window_secs: f64,
        k: f64,
        phases: &mut [f64],
        mag_out: &mut [f64],
        phase_out: &mut [f64],
        warnings: &mut u64,
    ) {
        let num_bins = mag_x.len();
        let sum_x: f64 = mag_x.iter().sum();
        let sum_y: f64 = mag_y.iter().sum();
        let x_silent = sum_x < MIN_MASS_THRESHOLD;
        let y_silent = sum_y < MIN_MASS_THRESHOLD;

        if x_silent && y_silent {
            mag_out.fill(0.0);
            phase_out.fill(0.0);
            return;
        }

        if x_silent || y_silent {
            // One side is numerically silent: scale the other by its share
            // of the morph and seed the phase vector from it, advanced by
            // the nominal frequency over half a window.
            *warnings += 1;
            let (mag, phase, scale) = if x_silent {
                (mag_y, phase_y, k)
            } else {
                (mag_x, phase_x, 1.0 - k)
            };
            for i in 0..num_bins {
                mag_out[i] = mag[i] * scale;
                phase_out[i] = phase[i];
                if mag[i] > 0.0 {
                    phases[i] = phase[i] + TWO_PI * freqs[i] * window_secs / 2.0;
                }
            }
            return;
        }

        let map = self.mapper.build(mag_x, mag_y);

        mag_out.fill(0.0);
        self.weight_sum.fill(MIN_MASS_THRESHOLD);
        self.phase_accum.fill(0.0);

        for i in 0..num_bins {
            let target = map[i];
            let pos = (1.0 - k) * i as f64 + k * target as f64;
            let interp_mag = (1.0 - k) * mag_x[i] + k * mag_y[target];
            if !interp_mag.is_finite() || !pos.is_finite() {
                warn!("non-finite deposit at bin {}, skipping", i);
                *warnings += 1;
                continue;
            }

            let low_bin = (pos.floor() as usize).min(num_bins - 1);
            let high_bin = (pos.ceil() as usize).min(num_bins - 1);
            let frac = pos - low_bin as f64;

            let low_weight = (1.0 - frac) * interp_mag;
            mag_out[low_bin] += low_weight;
            self.weight_sum[low_bin] += low_weight;
            self.phase_accum[low_bin] += low_weight * phase_x[i];

            if high_bin != low_bin {
                let high_weight = frac * interp_mag;
                mag_out[high_bin] += high_weight;
                self.weight_sum[high_bin] += high_weight;
                self.phase_accum[high_bin] += high_weight * phase_x[i];
            }
        }

        for i in 0..num_bins {
            phase_out[i] = if self.weight_sum[i] > MIN_MASS_THRESHOLD {
                self.phase_accum[i] / self.weight_sum[i]
            } else {
                // No deposit landed here; adopt the target phase.
                phase_y[i]
            };
        }

        for i in 0..num_bins {
            phases[i] += TWO_PI * freqs[i] * window_secs / 2.0;
        }
    }
}

/// Mass-transport interpolator for the reassignment engine.
///
/// Each transport triple interpolates a centre bin and a reassigned
/// frequency, derives a centre phase from the running phase vector, and
/// copy-shifts both source bin ranges onto the interpolated centre.
#[derive(Debug)]
pub struct MassInterpolator {
    left_masses: Vec<SpectralMass>,
    right_masses: Vec<SpectralMass>,
    plan: Vec<TransportTriple>,
    new_phases: Vec<f64>,
    new_amplitudes: Vec<f64>,
}

impl MassInterpolator {
    /// Creates an interpolator for spectra of `num_bins` bins.
    pub fn new(num_bins: usize) -> Self {
        // A mass needs at least one sign flip in each direction, so at most
        // every other bin can start one.
        let max_masses = num_bins / 2 + 2;
        Self {
            left_masses: Vec::with_capacity(max_masses),
            right_masses: Vec::with_capacity(max_masses),
            plan: Vec::with_capacity(2 * max_masses),
            new_phases: vec![0.0; num_bins],
            new_amplitudes: vec![0.0; num_bins],
        }
    }

    /// Interpolates the two frames at morph factor `k`, updating the
    /// running phase vector with the next-hop seeds.
    #[allow(clippy::too_many_arguments)]
    pub fn interpolate(
        &mut self,
        left: &[SpectralPoint],
        right: &[SpectralPoint],
        window_secs: f64,
        k: f64,
        phases: &mut [f64],
        out: &mut [SpectralPoint],
        warnings: &mut u64,
    ) {
        let num_bins = left.len();
        let left_sum: f64 = left.iter().map(|p| p.value.norm()).sum();
        let right_sum: f64 = right.iter().map(|p| p.value.norm()).sum();
        let left_silent = left_sum < MIN_MASS_THRESHOLD;
        let right_silent = right_sum < MIN_MASS_THRESHOLD;

        if left_silent && right_silent {
            for (o, l) in out.iter_mut().zip(left.iter()) {
                *o = SpectralPoint::at_freq(l.freq);
            }
            return;
        }

        if left_silent || right_silent {
            // Scale the audible side instead of transporting, and advance
            // the phase vector from its reassigned frequencies.
            *warnings += 1;
            let (source, scale) = if left_silent {
                (right, k)
            } else {
                (left, 1.0 - k)
            };
            for i in 0..num_bins {
                out[i] = source[i];
                out[i].value *= scale;
                if source[i].value.norm() > 0.0 {
                    phases[i] = source[i].value.arg()
                        + TWO_PI * source[i].freq_reassigned * window_secs / 2.0;
                }
            }
            return;
        }

        if group_spectrum(left, &mut self.left_masses) {
            *warnings += 1;
        }
        if group_spectrum(right, &mut self.right_masses) {
            *warnings += 1;
        }
        transport_matrix(&self.left_masses, &self.right_masses, &mut self.plan);

        for (o, l) in out.iter_mut().zip(left.iter()) {
            *o = SpectralPoint::at_freq(l.freq);
        }
        self.new_phases.fill(0.0);
        self.new_amplitudes.fill(0.0);

        for idx in 0..self.plan.len() {
            let (a, b, transported) = self.plan[idx];
            let left_mass = self.left_masses[a];
            let right_mass = self.right_masses[b];

            let center_bin = ((1.0 - k) * left_mass.center_bin as f64
                + k * right_mass.center_bin as f64)
                .round() as usize;

            // Rounding the centre changes the effective morph factor; the
            // frequency interpolation must follow the rounded position.
            let k_rounded = if left_mass.center_bin != right_mass.center_bin {
                (center_bin as f64 - left_mass.center_bin as f64)
                    / (right_mass.center_bin as f64 - left_mass.center_bin as f64)
            } else {
                k
            };
            let interp_freq = (1.0 - k_rounded) * left[left_mass.center_bin].freq_reassigned
                + k_rounded * right[right_mass.center_bin].freq_reassigned;

            if !phases[center_bin].is_finite() {
                warn!("invalid phase at bin {}, resetting to 0", center_bin);
                phases[center_bin] = 0.0;
                *warnings += 1;
            }

            let omega = TWO_PI * interp_freq;
            let center_phase =
                phases[center_bin] + omega * window_secs / 4.0 - PI * center_bin as f64;
            let next_phase = center_phase + omega * window_secs / 4.0 + PI * center_bin as f64;

            let left_scale = if left_mass.mass > MIN_MASS_THRESHOLD {
                (1.0 - k) * transported / left_mass.mass
            } else if left_mass.mass > 0.0 {
                warn!(
                    "very small left mass {:.3e} at bin {}, clamping scale",
                    left_mass.mass, left_mass.center_bin
                );
                *warnings += 1;
                1.0 - k
            } else {
                0.0
            };
            let right_scale = if right_mass.mass > MIN_MASS_THRESHOLD {
                k * transported / right_mass.mass
            } else if right_mass.mass > 0.0 {
                warn!(
                    "very small right mass {:.3e} at bin {}, clamping scale",
                    right_mass.mass, right_mass.center_bin
                );
                *warnings += 1;
                k
            } else {
                0.0
            };

            self.place_mass(
                &left_mass,
                center_bin,
                left_scale,
                interp_freq,
                center_phase,
                left,
                next_phase,
                out,
                warnings,
            );
            self.place_mass(
                &right_mass,
                center_bin,
                right_scale,
                interp_freq,
                center_phase,
                right,
                next_phase,
                out,
                warnings,
            );
        }

        phases.copy_from_slice(&self.new_phases);
    }

    /// Copy-shifts one mass's bin range onto the interpolated centre with a
    /// complex gain and a phase rotation that aligns the centre bin to the
    /// running phase.
    #[allow(clippy::too_many_arguments)]
    fn place_mass(
        &mut self,
        mass: &SpectralMass,
        center_bin: usize,
        scale: f64,
        interp_freq: f64,
        center_phase: f64,
        input: &[SpectralPoint],
        next_phase: f64,
        out: &mut [SpectralPoint],
        warnings: &mut u64,
    ) {
        if !scale.is_finite() || scale < 0.0 {
            warn!("invalid scale {} at bin {}, skipping mass", scale, center_bin);
            *warnings += 1;
            return;
        }
        if !interp_freq.is_finite() {
            warn!(
                "invalid interpolated frequency at bin {}, skipping mass",
                center_bin
            );
            *warnings += 1;
            return;
        }

        // Attenuate near-DC placements: a squared linear ramp from zero at
        // DC to unity at the cutoff suppresses audible beating between hops.
        let mut scale = scale;
        let abs_freq = interp_freq.abs();
        if abs_freq < LOW_FREQ_CUTOFF_HZ {
            let attenuation = (abs_freq / LOW_FREQ_CUTOFF_HZ).powi(2);
            scale *= attenuation;
            if attenuation < 0.5 && scale > 1e-3 {
                debug!(
                    "attenuating low frequency {:.1} Hz (gain {:.3})",
                    interp_freq, attenuation
                );
            }
        }

        let phase_shift = center_phase - input[mass.center_bin].value.arg();
        if !phase_shift.is_finite() {
            warn!(
                "invalid phase shift at bin {}, skipping mass",
                center_bin
            );
            *warnings += 1;
            return;
        }

        let offset = center_bin as isize - mass.center_bin as isize;
        for i in mass.left_bin..mass.right_bin {
            let new_i = i as isize + offset;
            if new_i < 0 || new_i >= out.len() as isize {
                continue;
            }
            let new_i = new_i as usize;

            let phase = phase_shift + input[i].value.arg();
            let mag = scale * input[i].value.norm();
            if !mag.is_finite() || !phase.is_finite() {
                *warnings += 1;
                continue;
            }

            out[new_i].value += Complex::from_polar(mag, phase);

            // The loudest contributor to a bin owns its next-hop phase seed
            // and reassigned frequency.
            if mag > self.new_amplitudes[new_i] {
                self.new_amplitudes[new_i] = mag;
                if next_phase.is_finite() {
                    self.new_phases[new_i] = next_phase;
                } else {
                    warn!("invalid next phase at bin {}, keeping previous", new_i);
                    *warnings += 1;
                }
                out[new_i].freq_reassigned = interp_freq;
            }
        }
    }
}
