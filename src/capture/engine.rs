//! libpcap capture engine: opens a live or offline handle and yields raw
//! Ethernet frames.

use super::{CapturedFrame, FrameSource, NextFrame};
use pcap::{Activated, Active, Capture, Device, Linktype, Offline};
use std::fmt;
use std::path::Path;

/// Errors from the capture engine.
#[derive(Debug)]
pub enum CaptureError {
    /// Failed to find a suitable network device.
    NoDevice(String),
    /// The handle's data link type is not Ethernet.
    UnsupportedLinkType(i32),
    /// pcap error.
    Pcap(pcap::Error),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoDevice(msg) => write!(f, "no capture device: {}", msg),
            CaptureError::UnsupportedLinkType(lt) => {
                write!(f, "unsupported link type {} (only Ethernet is decoded)", lt)
            }
            CaptureError::Pcap(e) => write!(f, "pcap error: {}", e),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Pcap(e) => Some(e),
            _ => None,
        }
    }
}

impl From<pcap::Error> for CaptureError {
    fn from(e: pcap::Error) -> Self {
        CaptureError::Pcap(e)
    }
}

/// Default read timeout: the capture loop wakes at least this often.
pub const DEFAULT_TIMEOUT_MS: i32 = 2000;

/// Configuration for opening a live capture.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub interface: Option<String>,
    pub promiscuous: bool,
    pub snaplen: i32,
    pub timeout_ms: i32,
    pub filter: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            interface: None,
            promiscuous: true,
            snaplen: 65535,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            filter: None,
        }
    }
}

/// A [`FrameSource`] backed by a pcap handle. The handle is closed when the
/// source is dropped.
pub struct PcapSource<T: Activated + ?Sized> {
    cap: Capture<T>,
}

impl<T: Activated + ?Sized> PcapSource<T> {
    fn new(cap: Capture<T>) -> Result<Self, CaptureError> {
        let linktype = cap.get_datalink();
        if linktype != Linktype::ETHERNET {
            return Err(CaptureError::UnsupportedLinkType(linktype.0));
        }
        Ok(PcapSource { cap })
    }

    /// Apply a BPF filter to the handle.
    pub fn set_filter(&mut self, filter: &str) -> Result<(), CaptureError> {
        self.cap.filter(filter, true)?;
        Ok(())
    }
}

impl<T: Activated + ?Sized> FrameSource for PcapSource<T> {
    fn next_frame(&mut self) -> Result<NextFrame<'_>, CaptureError> {
        match self.cap.next_packet() {
            Ok(packet) => Ok(NextFrame::Frame(CapturedFrame {
                ts: packet.header.ts.tv_sec as f64
                    + packet.header.ts.tv_usec as f64 / 1_000_000.0,
                wire_len: packet.header.len,
                data: packet.data,
            })),
            Err(e) => idle_or_error(e),
        }
    }
}

/// Timeouts and savefile end are ordinary outcomes of a read; everything
/// else is a real error.
fn idle_or_error(e: pcap::Error) -> Result<NextFrame<'static>, CaptureError> {
    match e {
        pcap::Error::TimeoutExpired => Ok(NextFrame::Timeout),
        pcap::Error::NoMorePackets => Ok(NextFrame::EndOfCapture),
        e => Err(CaptureError::Pcap(e)),
    }
}

/// List all available network interfaces.
pub fn list_interfaces() -> Result<Vec<Device>, CaptureError> {
    Device::list().map_err(CaptureError::Pcap)
}

/// Open a live packet capture with the given configuration.
///
/// Device lookup, permission and filter errors all surface here, before any
/// frame is read.
pub fn open_live(config: &CaptureConfig) -> Result<PcapSource<Active>, CaptureError> {
    let device = match &config.interface {
        Some(name) => {
            let devices = Device::list().map_err(CaptureError::Pcap)?;
            devices
                .into_iter()
                .find(|d| d.name == *name)
                .ok_or_else(|| CaptureError::NoDevice(format!("interface '{}' not found", name)))?
        }
        None => Device::lookup()
            .map_err(CaptureError::Pcap)?
            .ok_or_else(|| CaptureError::NoDevice("no default device found".into()))?,
    };

    let device_name = device.name.clone();

    let cap = Capture::from_device(device)
        .map_err(CaptureError::Pcap)?
        .promisc(config.promiscuous)
        .snaplen(config.snaplen)
        .timeout(config.timeout_ms)
        .open()
        .map_err(CaptureError::Pcap)?;

    let mut source = PcapSource::new(cap)?;
    if let Some(filter) = &config.filter {
        source.set_filter(filter)?;
    }

    tracing::info!(
        interface = %device_name,
        promiscuous = config.promiscuous,
        snaplen = config.snaplen,
        timeout_ms = config.timeout_ms,
        filter = config.filter.as_deref().unwrap_or("none"),
        "capture started"
    );

    Ok(source)
}

/// Open a pcap savefile for replay.
pub fn open_offline(path: &Path, filter: Option<&str>) -> Result<PcapSource<Offline>, CaptureError> {
    let cap = Capture::from_file(path).map_err(CaptureError::Pcap)?;
    let mut source = PcapSource::new(cap)?;
    if let Some(filter) = filter {
        source.set_filter(filter)?;
    }

    tracing::info!(
        file = %path.display(),
        filter = filter.unwrap_or("none"),
        "replay started"
    );

    Ok(source)
}
