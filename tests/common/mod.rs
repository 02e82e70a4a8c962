use std::f64::consts::PI;

/// Generates a mono sine wave as f32 samples.
pub fn sine_wave(freq: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin() as f32)
        .collect()
}

/// Generates a sine wave with per-sample amplitude.
pub fn sine_wave_with<F>(freq: f64, sample_rate: f64, num_samples: usize, amp_fn: F) -> Vec<f32>
where
    F: Fn(usize) -> f32,
{
    (0..num_samples)
        .map(|i| amp_fn(i) * (2.0 * PI * freq * i as f64 / sample_rate).sin() as f32)
        .collect()
}

/// Root-mean-square of a signal.
pub fn rms(signal: &[f32]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = signal.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / signal.len() as f64).sqrt()
}

/// Single-frequency DFT magnitude probe (normalized by length).
pub fn energy_at_freq(signal: &[f32], sample_rate: f64, target_freq: f64) -> f64 {
    let n = signal.len();
    if n == 0 {
        return 0.0;
    }
    let mut real = 0.0f64;
    let mut imag = 0.0f64;
    for (i, &s) in signal.iter().enumerate() {
        let angle = 2.0 * PI * target_freq * i as f64 / sample_rate;
        real += s as f64 * angle.cos();
        imag += s as f64 * angle.sin();
    }
    ((real * real + imag * imag) / n as f64).sqrt()
}

/// Scans a frequency grid and returns the frequency with the strongest
/// probe response.
pub fn dominant_freq(signal: &[f32], sample_rate: f64, lo: f64, hi: f64, step: f64) -> f64 {
    let mut best_freq = lo;
    let mut best_energy = -1.0;
    let mut f = lo;
    while f <= hi {
        let e = energy_at_freq(signal, sample_rate, f);
        if e > best_energy {
            best_energy = e;
            best_freq = f;
        }
        f += step;
    }
    best_freq
}

/// L2 distance between two equal-length signals, normalized by the RMS of
/// the reference.
pub fn relative_l2(reference: &[f32], candidate: &[f32]) -> f64 {
    assert_eq!(reference.len(), candidate.len());
    let ref_rms = rms(reference);
    if ref_rms == 0.0 {
        return rms(candidate);
    }
    let diff_sq: f64 = reference
        .iter()
        .zip(candidate.iter())
        .map(|(&a, &b)| {
            let d = a as f64 - b as f64;
            d * d
        })
        .sum();
    (diff_sq / reference.len() as f64).sqrt() / ref_rms
}
