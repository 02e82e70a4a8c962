//! Core types, window functions, and shared constants.

pub mod fft;
pub mod types;
pub mod window;

pub use types::{Algorithm, MorphParams, Sample};
