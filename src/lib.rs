#![forbid(unsafe_code)]
//! Real-time spectral morphing between two audio streams.
//!
//! `spectromorph` interpolates the short-time spectra of a *main* and a
//! *sidechain* stream along the 1-D optimal-transport map between them,
//! parameterised by a morph factor `k ∈ [0, 1]`. Unlike a crossfade, which
//! blends amplitudes, the transport map moves spectral energy *along the
//! frequency axis*: morphing a 440 Hz tone into a 554 Hz tone glides the
//! pitch instead of playing both.
//!
//! Two interchangeable engine variants share one streaming skeleton: a
//! CDF-based transport map (cheap, latency of half a window) and a
//! spectral-reassignment mass transport (finer frequency localization, one
//! extra lookahead hop of latency). The engine is built for plugin-style
//! block processing: arbitrary 32–2048 sample buffers on a time-critical
//! callback, with no allocation between calls.
//!
//! # Quick Start
//!
//! ```
//! use spectromorph::{morph, MorphParams};
//!
//! // 250 ms of 440 Hz against 250 ms of 660 Hz at 44.1 kHz
//! let n = 11025;
//! let main: Vec<f32> = (0..n)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
//!     .collect();
//! let side: Vec<f32> = (0..n)
//!     .map(|i| (2.0 * std::f32::consts::PI * 660.0 * i as f32 / 44100.0).sin())
//!     .collect();
//!
//! let output = morph(&main, &side, &MorphParams::new(), 0.5).unwrap();
//! assert_eq!(output.len(), main.len());
//! ```
//!
//! # Streaming
//!
//! For real-time use, keep a [`SpectralMorph`] and feed it host-sized
//! blocks:
//!
//! ```
//! use spectromorph::{MorphParams, SpectralMorph};
//!
//! let mut engine = SpectralMorph::new(MorphParams::new()).unwrap();
//! // engine.process(&main_block, &side_block, &mut out_block, k) per callback;
//! // engine.latency_samples() for host delay compensation.
//! let latency = engine.latency_samples();
//! assert_eq!(latency, 2208);
//! ```

pub mod core;
pub mod engine;
pub mod error;
pub mod spectral;
pub mod stream;
pub mod transport;

pub use core::types::{Algorithm, MorphParams, Sample};
pub use engine::SpectralMorph;
pub use error::MorphError;

/// Morphs two equal-length mono signals at a fixed morph factor.
///
/// This is the one-shot entry point for offline use: it builds an engine,
/// streams the input through it in one call, and returns exactly
/// `main.len()` samples. The engine's latency is not trimmed from the
/// output, so the first `latency_samples()` samples ramp in from silence.
///
/// # Errors
///
/// Returns [`MorphError`] if the parameters are invalid.
///
/// # Panics
///
/// Panics if `main` and `side` differ in length (host contract).
///
/// # Example
///
/// ```
/// use spectromorph::{morph, Algorithm, MorphParams};
///
/// let main = vec![0.0f32; 4410];
/// let side = vec![0.0f32; 4410];
/// let params = MorphParams::new().with_algorithm(Algorithm::Cdf);
/// let out = morph(&main, &side, &params, 0.25).unwrap();
/// assert!(out.iter().all(|&s| s == 0.0));
/// ```
pub fn morph(
    main: &[f32],
    side: &[f32],
    params: &MorphParams,
    k: f32,
) -> Result<Vec<f32>, MorphError> {
    assert_eq!(main.len(), side.len(), "main/side length mismatch");
    let mut engine = SpectralMorph::new(params.clone())?;
    let mut output = main.to_vec();
    engine.process_in_place(&mut output, side, k);
    Ok(output)
}
