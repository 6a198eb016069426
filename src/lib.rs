//! framescope library crate: the layered frame decoder, capture sources and
//! the capture loop, shared by the binary, tests and benchmarks.

pub mod capture;
pub mod config;
pub mod display;
pub mod protocol;
pub mod sniffer;

pub use protocol::{decode, DecodeResult, Outcome};
