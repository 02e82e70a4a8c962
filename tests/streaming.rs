mod common;

use common::{rms, sine_wave};
use spectromorph::{Algorithm, MorphParams, SpectralMorph};

/// Streams `main`/`side` through a fresh engine in `block`-sized chunks.
fn run_blocked(
    main: &[f32],
    side: &[f32],
    params: MorphParams,
    block: usize,
    k: f32,
) -> Vec<f32> {
    let mut engine = SpectralMorph::new(params).unwrap();
    let mut output = vec![0.0f32; main.len()];
    let mut pos = 0;
    while pos < main.len() {
        let end = (pos + block).min(main.len());
        engine.process(&main[pos..end], &side[pos..end], &mut output[pos..end], k);
        pos = end;
    }
    output
}

#[test]
fn test_silence_in_silence_out() {
    let main = vec![0.0f32; 1024];
    let side = vec![0.0f32; 1024];
    for &alg in &[Algorithm::Cdf, Algorithm::Reassignment] {
        let mut engine =
            SpectralMorph::new(MorphParams::new().with_algorithm(alg)).unwrap();
        for _ in 0..10 {
            let mut out = vec![0.0f32; 1024];
            engine.process(&main, &side, &mut out, 0.5);
            assert!(
                out.iter().all(|&s| s == 0.0),
                "{:?}: silence must produce exact silence",
                alg
            );
        }
    }
}

#[test]
fn test_block_size_independence() {
    let sr = 44100.0;
    let n = 44100;
    let main = sine_wave(440.0, sr, n);
    let side = sine_wave(554.37, sr, n);

    for &alg in &[Algorithm::Cdf, Algorithm::Reassignment] {
        let params = MorphParams::new().with_algorithm(alg);
        let small = run_blocked(&main, &side, params.clone(), 32, 0.5);
        let large = run_blocked(&main, &side, params.clone(), 2048, 0.5);

        let latency = SpectralMorph::new(params).unwrap().latency_samples();
        let max_diff = small[latency..]
            .iter()
            .zip(large[latency..].iter())
            .map(|(&a, &b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(
            max_diff < 1e-6,
            "{:?}: block-size dependent output, max diff {}",
            alg,
            max_diff
        );
    }
}

#[test]
fn test_uneven_block_sizes_match_streamed_run() {
    let sr = 44100.0;
    let n = 22050;
    let main = sine_wave(330.0, sr, n);
    let side = sine_wave(495.0, sr, n);
    let params = MorphParams::new();

    let reference = run_blocked(&main, &side, params.clone(), 512, 0.3);

    // Host-style jittered block sizes covering the 32..2048 range.
    let mut engine = SpectralMorph::new(params).unwrap();
    let mut output = vec![0.0f32; n];
    let sizes = [32usize, 1024, 64, 2048, 128, 480, 512, 33, 2000];
    let mut pos = 0;
    let mut size_idx = 0;
    while pos < n {
        let block = sizes[size_idx % sizes.len()];
        size_idx += 1;
        let end = (pos + block).min(n);
        engine.process(&main[pos..end], &side[pos..end], &mut output[pos..end], 0.3);
        pos = end;
    }

    let max_diff = reference
        .iter()
        .zip(output.iter())
        .map(|(&a, &b)| (a - b).abs())
        .fold(0.0f32, f32::max);
    assert!(max_diff < 1e-6, "jittered blocks diverged by {}", max_diff);
}

#[test]
fn test_in_place_matches_out_of_place() {
    let sr = 44100.0;
    let n = 16384;
    let main = sine_wave(440.0, sr, n);
    let side = sine_wave(660.0, sr, n);

    let mut out_of_place = SpectralMorph::new(MorphParams::new()).unwrap();
    let mut expected = vec![0.0f32; n];
    out_of_place.process(&main, &side, &mut expected, 0.4);

    let mut in_place = SpectralMorph::new(MorphParams::new()).unwrap();
    let mut io = main.clone();
    in_place.process_in_place(&mut io, &side, 0.4);

    assert_eq!(expected, io);
}

#[test]
fn test_first_latency_samples_are_quiet() {
    // Nothing can leave the engine before one hop has been analyzed; the
    // reported latency region ramps in from silence.
    let sr = 44100.0;
    let main = sine_wave(440.0, sr, 8192);
    let side = sine_wave(660.0, sr, 8192);
    for &alg in &[Algorithm::Cdf, Algorithm::Reassignment] {
        let params = MorphParams::new().with_algorithm(alg);
        let mut engine = SpectralMorph::new(params).unwrap();
        let hop = match alg {
            Algorithm::Cdf => 1104,
            Algorithm::Reassignment => 552,
        };
        let mut out = vec![0.0f32; 8192];
        engine.process(&main, &side, &mut out, 0.5);
        assert!(
            out[..hop].iter().all(|&s| s == 0.0),
            "{:?}: output before the first hop must be exactly silent",
            alg
        );
    }
}

#[test]
fn test_long_stream_stays_finite_and_bounded() {
    let sr = 44100.0;
    let block = 512;
    let mut engine = SpectralMorph::new(MorphParams::new()).unwrap();
    let main = sine_wave(123.0, sr, block);
    let side = sine_wave(987.0, sr, block);
    let mut peak = 0.0f32;
    for i in 0..400 {
        let k = (i % 100) as f32 / 100.0;
        let mut out = vec![0.0f32; block];
        engine.process(&main, &side, &mut out, k);
        for &s in &out {
            assert!(s.is_finite());
            peak = peak.max(s.abs());
        }
    }
    // Unity-gain overlap-add of two unit sines cannot legitimately exceed
    // a small multiple of the input peak.
    assert!(peak < 8.0, "output blew up to {}", peak);
}

#[test]
fn test_output_rms_tracks_input_after_warmup() {
    let sr = 44100.0;
    let n = 44100;
    let main = sine_wave(440.0, sr, n);
    let out = run_blocked(&main, &main, MorphParams::new(), 1024, 0.5);
    // Identical inputs pass through the CDF transport untouched.
    let settled = &out[10000..];
    let ratio = rms(settled) / rms(&main[10000..]);
    assert!(
        (ratio - 1.0).abs() < 0.05,
        "RMS ratio {} after warmup",
        ratio
    );
}
