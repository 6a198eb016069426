//! UDP header decoder.
//!
//! UDP header layout (8 bytes, fixed):
//!   0                   1                   2                   3
//!   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |          Source Port          |       Destination Port        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |            Length             |           Checksum            |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

use super::{be_u16, region, ParseError};
use std::fmt;

/// UDP header is always exactly 8 bytes.
pub const UDP_HEADER_LEN: usize = 8;

/// Decoded UDP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    src_port: u16,
    dst_port: u16,
    length: u16,
    checksum: u16,
}

impl UdpHeader {
    /// Parse the UDP header at `offset` in `frame`.
    pub fn parse(frame: &[u8], offset: usize) -> Result<Self, ParseError> {
        let data = region(frame, offset, UDP_HEADER_LEN)?;
        Ok(UdpHeader {
            src_port: be_u16(data, 0),
            dst_port: be_u16(data, 2),
            length: be_u16(data, 4),
            checksum: be_u16(data, 6),
        })
    }

    #[inline]
    pub fn src_port(&self) -> u16 {
        self.src_port
    }

    #[inline]
    pub fn dst_port(&self) -> u16 {
        self.dst_port
    }

    /// Declared length of the datagram (header + payload) in bytes.
    #[inline]
    pub fn length(&self) -> u16 {
        self.length
    }

    /// Checksum as carried on the wire. Not verified.
    #[inline]
    pub fn checksum(&self) -> u16 {
        self.checksum
    }
}

impl fmt::Display for UdpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ":{} -> :{} len={}",
            self.src_port, self.dst_port, self.length
        )
    }
}
