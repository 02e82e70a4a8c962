//! Spectral-mass grouping and the greedy 1-D transport matcher.
//!
//! Grouping scans the sign of `freq_reassigned − freq` across bins: a mass
//! is a maximal run from a rising overshoot to a falling one, its centre the
//! turning bin. The matcher is the classical two-pointer solution to the
//! 1-D Wasserstein problem over the two sorted mass lists.

use log::warn;

use crate::core::fft::MIN_MASS_THRESHOLD;
use crate::spectral::frame::{SpectralMass, SpectralPoint};

/// One entry of a transport plan: source mass index, target mass index,
/// transported mass.
pub type TransportTriple = (usize, usize, f64);

/// Groups a spectrum into contiguous masses.
///
/// The sign vector is seeded from bin 0 and that bin never closes a
/// boundary by itself; runs whose magnitude sum is zero extend the current
/// mass instead of closing it. Both behaviors match the reference and are
/// load-bearing for determinism.
///
/// Returns `true` on the silence-degenerate path, where a single unit mass
/// spanning the whole spectrum is emitted instead.
pub fn group_spectrum(spectrum: &[SpectralPoint], masses: &mut Vec<SpectralMass>) -> bool {
    masses.clear();

    let mass_sum: f64 = spectrum.iter().map(|p| p.value.norm()).sum();
    if mass_sum < MIN_MASS_THRESHOLD {
        warn!(
            "near-silent spectrum (mass sum {:.3e}), grouping as a single unit mass",
            mass_sum
        );
        masses.push(SpectralMass {
            left_bin: 0,
            center_bin: spectrum.len() / 2,
            right_bin: spectrum.len(),
            mass: 1.0,
        });
        return true;
    }

    masses.push(SpectralMass {
        left_bin: 0,
        center_bin: 0,
        right_bin: 0,
        mass: 0.0,
    });

    let mut sign = false;
    let mut first = true;
    for (i, point) in spectrum.iter().enumerate() {
        let current_sign = point.freq_reassigned > point.freq;

        if first {
            first = false;
            sign = current_sign;
            continue;
        }
        if current_sign == sign {
            continue;
        }

        if sign {
            // Falling edge: this is the centre. Pick whichever neighbour
            // sits closer to its nominal frequency.
            let left_dist = spectrum[i - 1].freq_reassigned - spectrum[i - 1].freq;
            let right_dist = point.freq - point.freq_reassigned;
            let last = masses.len() - 1;
            masses[last].center_bin = if left_dist < right_dist { i - 1 } else { i };
        } else {
            // Rising edge: the current mass ends here, provided it actually
            // carries magnitude.
            let last = masses.len() - 1;
            let run_mass: f64 = spectrum[masses[last].left_bin..i]
                .iter()
                .map(|p| p.value.norm())
                .sum();
            if run_mass > 0.0 {
                masses[last].mass = run_mass / mass_sum;
                masses[last].right_bin = i;
                masses.push(SpectralMass {
                    left_bin: i,
                    center_bin: i,
                    right_bin: 0,
                    mass: 0.0,
                });
            }
        }
        sign = current_sign;
    }

    // Close the trailing mass.
    let last = masses.len() - 1;
    masses[last].right_bin = spectrum.len();
    masses[last].mass = spectrum[masses[last].left_bin..]
        .iter()
        .map(|p| p.value.norm())
        .sum::<f64>()
        / mass_sum;

    false
}

/// Builds the optimal transport plan between two sorted mass lists.
///
/// Two cursors walk the lists; each step transports `min(remaining_left,
/// remaining_right)` and advances whichever side was exhausted. For sorted
/// 1-D distributions this greedy plan is optimal.
pub fn transport_matrix(
    left: &[SpectralMass],
    right: &[SpectralMass],
    plan: &mut Vec<TransportTriple>,
) {
    plan.clear();
    if left.is_empty() || right.is_empty() {
        return;
    }

    let mut left_index = 0;
    let mut right_index = 0;
    let mut left_mass = left[0].mass;
    let mut right_mass = right[0].mass;

    loop {
        if left_mass < right_mass {
            plan.push((left_index, right_index, left_mass));
            right_mass -= left_mass;
            left_index += 1;
            if left_index >= left.len() {
                break;
            }
            left_mass = left[left_index].mass;
        } else {
            plan.push((left_index, right_index, right_mass));
            left_mass -= right_mass;
            right_index += 1;
            if right_index >= right.len() {
                break;
            }
            right_mass = right[right_index].mass;
        }
    }
}
