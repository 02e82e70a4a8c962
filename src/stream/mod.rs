//! Streaming machinery: the hop dispatcher and its overlap-add ring.

pub mod dispatcher;

pub use dispatcher::HopDispatcher;
