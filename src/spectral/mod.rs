//! Spectral frames and the windowed FFT kernels that produce them.

pub mod frame;
pub mod kernel;

pub use frame::{SpectralMass, SpectralPoint};
pub use kernel::{ReassignKernel, StftKernel};
