//! In-memory frame source.
//!
//! Plays back a fixed script of frames and idle timeouts. Used by the
//! tests and benchmarks to drive the sniffer loop without a pcap handle.

use super::{CaptureError, CapturedFrame, FrameSource, NextFrame};

#[derive(Debug, Clone)]
enum Step {
    Frame(Vec<u8>),
    Timeout,
}

/// Scripted [`FrameSource`]. Returns `EndOfCapture` once the script is
/// exhausted, and keeps returning it.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    steps: Vec<Step>,
    pos: usize,
    frames_seen: u64,
}

impl ReplaySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that yields each buffer in order, with no timeouts.
    pub fn from_frames<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        ReplaySource {
            steps: frames.into_iter().map(Step::Frame).collect(),
            ..Self::default()
        }
    }

    pub fn push_frame(&mut self, frame: Vec<u8>) -> &mut Self {
        self.steps.push(Step::Frame(frame));
        self
    }

    pub fn push_timeout(&mut self) -> &mut Self {
        self.steps.push(Step::Timeout);
        self
    }

    /// Steps not yet played back.
    pub fn remaining(&self) -> usize {
        self.steps.len() - self.pos
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<NextFrame<'_>, CaptureError> {
        let Some(step) = self.steps.get(self.pos) else {
            return Ok(NextFrame::EndOfCapture);
        };
        self.pos += 1;

        match step {
            Step::Timeout => Ok(NextFrame::Timeout),
            Step::Frame(data) => {
                self.frames_seen += 1;
                Ok(NextFrame::Frame(CapturedFrame {
                    // One frame per millisecond of synthetic time.
                    ts: self.frames_seen as f64 / 1000.0,
                    wire_len: data.len() as u32,
                    data,
                }))
            }
        }
    }
}
