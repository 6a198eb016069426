//! Frame acquisition.
//!
//! A [`FrameSource`] hands out one link-layer frame per call and reports a
//! read timeout and end-of-capture as ordinary values, distinct from real
//! errors. [`engine`] provides the libpcap-backed sources (live interface or
//! savefile); [`replay`] provides an in-memory source.

pub mod engine;
pub mod replay;

pub use engine::{CaptureConfig, CaptureError, PcapSource};
pub use replay::ReplaySource;

/// One captured frame, borrowed from the source's buffer.
#[derive(Debug, Clone, Copy)]
pub struct CapturedFrame<'a> {
    /// Capture timestamp as seconds since epoch.
    pub ts: f64,
    /// Length of the frame on the wire (may exceed `data.len()` when the
    /// snapshot length cut it short).
    pub wire_len: u32,
    /// Captured bytes.
    pub data: &'a [u8],
}

/// Result of a single pull from a [`FrameSource`].
#[derive(Debug)]
pub enum NextFrame<'a> {
    Frame(CapturedFrame<'a>),
    /// The bounded wait elapsed with no frame. Not an error.
    Timeout,
    /// The source is exhausted (savefile end, replay end).
    EndOfCapture,
}

/// Anything that can deliver raw link-layer frames.
///
/// The read timeout is part of how a source is opened, so `next_frame`
/// blocks for at most that long.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<NextFrame<'_>, CaptureError>;
}
