//! The capture loop: pull a frame, decode it, hand the result to a sink.
//!
//! Decode failures are per frame and never stop the loop. Read timeouts are
//! idle ticks. Only an error from the frame source ends the loop early.

use crate::capture::{CaptureError, CapturedFrame, FrameSource, NextFrame};
use crate::protocol::{self, DecodeResult, Outcome};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Receives every decoded frame.
pub trait FrameSink {
    fn on_frame(&mut self, index: u64, frame: &CapturedFrame<'_>, result: &DecodeResult);
}

/// Sink that drops every result; useful when only the statistics matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl FrameSink for Discard {
    fn on_frame(&mut self, _: u64, _: &CapturedFrame<'_>, _: &DecodeResult) {}
}

/// Sink that keeps every result in memory, tagged with its frame index.
#[derive(Debug, Default, Clone)]
pub struct Collect {
    pub results: Vec<(u64, DecodeResult)>,
}

impl FrameSink for Collect {
    fn on_frame(&mut self, index: u64, _: &CapturedFrame<'_>, result: &DecodeResult) {
        self.results.push((index, result.clone()));
    }
}

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// The running flag was cleared.
    #[default]
    Interrupted,
    /// The frame limit was reached.
    CountReached,
    /// The source ran out of frames.
    EndOfCapture,
    /// The source returned an error.
    SourceError,
}

/// Counters accumulated over one run of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureStats {
    pub frames: u64,
    /// Captured bytes (what was decoded, not the wire length).
    pub bytes: u64,
    pub timeouts: u64,
    pub complete: u64,
    pub not_ip: u64,
    pub unsupported: u64,
    pub failed: u64,
    pub stop: StopReason,
}

impl CaptureStats {
    fn record(&mut self, len: usize, outcome: &Outcome) {
        self.frames += 1;
        self.bytes += len as u64;
        match outcome {
            Outcome::Complete => self.complete += 1,
            Outcome::NotIp(_) => self.not_ip += 1,
            Outcome::Unsupported(_) => self.unsupported += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Share of frames that decoded without a structural failure, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        (self.frames - self.failed) as f64 / self.frames as f64 * 100.0
    }
}

/// A source error that ended the loop, with the counters gathered up to it.
#[derive(Debug)]
pub struct RunError {
    pub error: CaptureError,
    pub stats: CaptureStats,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "capture stopped after {} frames: {}", self.stats.frames, self.error)
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Run the capture loop until `running` is cleared, `limit` frames have been
/// decoded (0 = unlimited) or the source reports end-of-capture.
pub fn run<S, K>(
    source: &mut S,
    running: &AtomicBool,
    limit: u64,
    sink: &mut K,
) -> Result<CaptureStats, RunError>
where
    S: FrameSource + ?Sized,
    K: FrameSink + ?Sized,
{
    let mut stats = CaptureStats::default();

    loop {
        if !running.load(Ordering::SeqCst) {
            stats.stop = StopReason::Interrupted;
            break;
        }
        if limit > 0 && stats.frames >= limit {
            stats.stop = StopReason::CountReached;
            break;
        }

        let frame = match source.next_frame() {
            Ok(NextFrame::Frame(frame)) => frame,
            Ok(NextFrame::Timeout) => {
                stats.timeouts += 1;
                tracing::trace!("read timeout, no frame");
                continue;
            }
            Ok(NextFrame::EndOfCapture) => {
                stats.stop = StopReason::EndOfCapture;
                break;
            }
            Err(error) => {
                stats.stop = StopReason::SourceError;
                tracing::error!(error = %error, frames = stats.frames, "capture error");
                return Err(RunError { error, stats });
            }
        };

        let result = protocol::decode(frame.data);
        stats.record(frame.data.len(), &result.outcome);
        if result.outcome.is_failure() {
            tracing::debug!(
                frame = stats.frames,
                len = frame.data.len(),
                outcome = %result.outcome,
                "decode stopped early"
            );
        }

        sink.on_frame(stats.frames, &frame, &result);
    }

    tracing::info!(
        frames = stats.frames,
        failed = stats.failed,
        stop = ?stats.stop,
        "capture loop finished"
    );
    Ok(stats)
}
