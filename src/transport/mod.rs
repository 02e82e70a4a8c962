//! Transport-map builders and the spectrum interpolators that consume them.

pub mod cdf;
pub mod interpolate;
pub mod mass;

pub use cdf::CdfMapper;
pub use interpolate::{CdfInterpolator, MassInterpolator};
pub use mass::{group_spectrum, transport_matrix, TransportTriple};
