//! Frame display / pretty-printing for the CLI.
//!
//! Turns a [`DecodeResult`] into human-readable text: MACs as colon-hex,
//! addresses as dotted-decimal, TCP flags as eight binary digits. Also
//! renders one JSON object per frame for machine consumption.

use crate::capture::CapturedFrame;
use crate::protocol::{ethernet::format_mac, DecodeResult, Outcome, TransportSegment};
use crate::sniffer::{CaptureStats, FrameSink, StopReason};
use serde_json::{json, Value};
use std::fmt::Write as _;

/// Limit hex dumps to the first 256 bytes for readability.
const HEX_DUMP_LIMIT: usize = 256;

/// TCP flags byte as eight binary digits, e.g. `00010010` for SYN+ACK.
pub fn format_tcp_flags(flags: u8) -> String {
    format!("{:08b}", flags)
}

/// Build the one-line summary of a decoded frame.
pub fn summary_line(index: u64, timestamp: f64, len: usize, result: &DecodeResult) -> String {
    let ts = format_timestamp(timestamp);
    let mut line = format!("#{:<6} {} {:>5}B", index, ts, len);

    if let Some(eth) = &result.ethernet {
        let _ = write!(line, " Eth: {}", eth);
    }
    if let Some(ip) = &result.ipv4 {
        let _ = write!(line, " | IPv4: {}", ip);
    }
    match &result.transport {
        Some(TransportSegment::Tcp(hdr)) => {
            let _ = write!(line, " | TCP {} flags={}", hdr, format_tcp_flags(hdr.flags()));
        }
        Some(TransportSegment::Udp(hdr)) => {
            let _ = write!(line, " | UDP {}", hdr);
        }
        None => {}
    }
    match &result.outcome {
        Outcome::Complete => {}
        Outcome::NotIp(_) => {}
        outcome => {
            let _ = write!(line, " [{}]", outcome);
        }
    }
    line
}

/// Build the multi-line detail view of a decoded frame, optionally followed
/// by a hex dump of the captured bytes.
pub fn detail_block(
    index: u64,
    timestamp: f64,
    raw_data: &[u8],
    result: &DecodeResult,
    hex_dump: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(80));
    let _ = writeln!(out, "{}", summary_line(index, timestamp, raw_data.len(), result));
    let _ = writeln!(out, "{}", "-".repeat(80));

    if let Some(eth) = &result.ethernet {
        let _ = writeln!(out, "  Ethernet Frame:");
        let _ = writeln!(out, "    Destination: {}", format_mac(&eth.dst_mac()));
        let _ = writeln!(out, "    Source:      {}", format_mac(&eth.src_mac()));
        let _ = writeln!(
            out,
            "    EtherType:   {} (0x{:04x})",
            eth.ether_type(),
            eth.ether_type_raw()
        );
    }

    if let Some(ip) = &result.ipv4 {
        let _ = writeln!(out, "  IP Packet:");
        let _ = writeln!(
            out,
            "    Version:      {}, Header Length: {} bytes",
            ip.version(),
            ip.header_len()
        );
        let _ = writeln!(out, "    TTL:          {}, Protocol: {}", ip.ttl(), ip.protocol_raw());
        let _ = writeln!(out, "    Source:       {}", ip.src_addr());
        let _ = writeln!(out, "    Destination:  {}", ip.dst_addr());
        let _ = writeln!(out, "    Total Length: {}", ip.total_length());
        let _ = writeln!(out, "    ID:           0x{:04x}", ip.identification());
        let _ = writeln!(
            out,
            "    Flags:        DF={} MF={}",
            ip.dont_fragment(),
            ip.more_fragments()
        );
        let _ = writeln!(out, "    Frag Offset:  {}", ip.fragment_offset());
        let _ = writeln!(out, "    DSCP/ECN:     {}/{}", ip.dscp(), ip.ecn());
        let _ = writeln!(out, "    Checksum:     0x{:04x}", ip.checksum());
        if !ip.options().is_empty() {
            let _ = writeln!(out, "    Options:      {} bytes", ip.options().len());
        }
    }

    match &result.transport {
        Some(TransportSegment::Tcp(hdr)) => {
            let _ = writeln!(out, "  TCP Segment:");
            let _ = writeln!(
                out,
                "    Source Port:  {}, Dest Port: {}",
                hdr.src_port(),
                hdr.dst_port()
            );
            let _ = writeln!(
                out,
                "    Flags:        {} {}",
                format_tcp_flags(hdr.flags()),
                hdr.flags_string()
            );
            let _ = writeln!(out, "    Seq:          {}", hdr.sequence_number());
            let _ = writeln!(out, "    Ack:          {}", hdr.ack_number());
            let _ = writeln!(out, "    Window:       {}", hdr.window_size());
            let _ = writeln!(out, "    Data Offset:  {}", hdr.data_offset());
            let _ = writeln!(out, "    Checksum:     0x{:04x}", hdr.checksum());
        }
        Some(TransportSegment::Udp(hdr)) => {
            let _ = writeln!(out, "  UDP Datagram:");
            let _ = writeln!(
                out,
                "    Source Port:  {}, Dest Port: {}",
                hdr.src_port(),
                hdr.dst_port()
            );
            let _ = writeln!(out, "    Length:       {}", hdr.length());
            let _ = writeln!(out, "    Checksum:     0x{:04x}", hdr.checksum());
        }
        None => {}
    }

    if hex_dump {
        let _ = writeln!(out, "  Hex Dump ({} bytes):", raw_data.len());
        out.push_str(&format_hex_dump(raw_data));
    }
    out
}

/// Format raw bytes as a hex dump with offsets and an ASCII column.
pub fn format_hex_dump(data: &[u8]) -> String {
    let display_len = data.len().min(HEX_DUMP_LIMIT);
    let mut out = String::new();

    for offset in (0..display_len).step_by(16) {
        let end = (offset + 16).min(display_len);
        let chunk = &data[offset..end];

        let _ = write!(out, "    {:04x}  ", offset);
        for (i, byte) in chunk.iter().enumerate() {
            let _ = write!(out, "{:02x} ", byte);
            if i == 7 {
                out.push(' ');
            }
        }
        // Padding for incomplete lines
        for i in chunk.len()..16 {
            out.push_str("   ");
            if i == 7 {
                out.push(' ');
            }
        }

        out.push_str(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() || *byte == b' ' {
                out.push(*byte as char);
            } else {
                out.push('.');
            }
        }
        out.push_str("|\n");
    }

    if display_len < data.len() {
        let _ = writeln!(out, "    ... ({} bytes remaining)", data.len() - display_len);
    }
    out
}

/// Build the JSON record for one frame. Absent layers are `null`.
pub fn json_record(index: u64, frame: &CapturedFrame<'_>, result: &DecodeResult) -> Value {
    let ethernet = result.ethernet.as_ref().map(|eth| {
        json!({
            "dst": format_mac(&eth.dst_mac()),
            "src": format_mac(&eth.src_mac()),
            "ether_type": eth.ether_type_raw(),
        })
    });
    let ipv4 = result.ipv4.as_ref().map(|ip| {
        json!({
            "version": ip.version(),
            "header_len": ip.header_len(),
            "ttl": ip.ttl(),
            "protocol": ip.protocol_raw(),
            "src": ip.src_addr().to_string(),
            "dst": ip.dst_addr().to_string(),
            "transport_offset": ip.transport_offset(),
        })
    });
    let transport = result.transport.as_ref().map(|segment| match segment {
        TransportSegment::Tcp(hdr) => json!({
            "kind": "tcp",
            "src_port": hdr.src_port(),
            "dst_port": hdr.dst_port(),
            "flags": format_tcp_flags(hdr.flags()),
        }),
        TransportSegment::Udp(hdr) => json!({
            "kind": "udp",
            "src_port": hdr.src_port(),
            "dst_port": hdr.dst_port(),
            "length": hdr.length(),
            "checksum": hdr.checksum(),
        }),
    });

    json!({
        "index": index,
        "ts": frame.ts,
        "len": frame.data.len(),
        "wire_len": frame.wire_len,
        "ethernet": ethernet,
        "ipv4": ipv4,
        "transport": transport,
        "outcome": result.outcome.to_string(),
    })
}

/// Format a pcap timestamp (seconds since epoch) as HH:MM:SS.micros (UTC).
fn format_timestamp(ts: f64) -> String {
    let secs = ts as u64;
    let micros = ((ts - secs as f64) * 1_000_000.0) as u32;

    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    format!("{:02}:{:02}:{:02}.{:06}", hours, minutes, seconds, micros)
}

/// End-of-capture statistics block.
pub fn capture_summary(stats: &CaptureStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(50));
    if stats.stop == StopReason::SourceError {
        let _ = writeln!(out, "Capture stopped by a source error.");
    } else {
        let _ = writeln!(out, "Capture complete.");
    }
    let _ = writeln!(out, "  Frames decoded:    {}", stats.frames);
    let _ = writeln!(out, "  Bytes:             {}", stats.bytes);
    let _ = writeln!(out, "  TCP/UDP complete:  {}", stats.complete);
    let _ = writeln!(out, "  Not IPv4:          {}", stats.not_ip);
    let _ = writeln!(out, "  Unsupported:       {}", stats.unsupported);
    let _ = writeln!(out, "  Decode failures:   {}", stats.failed);
    let _ = writeln!(out, "  Success rate:      {:.1}%", stats.success_rate());
    let _ = write!(out, "{}", "=".repeat(50));
    out
}

/// How the printer renders each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Summary,
    Detail { hex_dump: bool },
    Json,
    Quiet,
}

/// [`FrameSink`] that writes each frame to stdout.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    style: Style,
}

impl Printer {
    pub fn new(style: Style) -> Self {
        Printer { style }
    }
}

impl FrameSink for Printer {
    fn on_frame(&mut self, index: u64, frame: &CapturedFrame<'_>, result: &DecodeResult) {
        match self.style {
            Style::Quiet => {}
            Style::Summary => {
                println!("{}", summary_line(index, frame.ts, frame.data.len(), result))
            }
            Style::Detail { hex_dump } => {
                println!("{}", detail_block(index, frame.ts, frame.data, result, hex_dump))
            }
            Style::Json => println!("{}", json_record(index, frame, result)),
        }
    }
}
