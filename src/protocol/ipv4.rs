//! IPv4 header decoder.
//!
//! IPv4 header layout (20-60 bytes):
//!   0                   1                   2                   3
//!   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |Version|  IHL  |Type of Service|          Total Length         |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |         Identification        |Flags|      Fragment Offset    |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |  Time to Live |    Protocol   |         Header Checksum       |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                       Source Address                          |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                    Destination Address                        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                    Options                    |    Padding    |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!
//! The header length comes from the IHL field, so the transport header is
//! found at `offset + IHL * 4`, not at a fixed position.

use super::{be_u16, region, IpProtocol, ParseError};
use std::fmt;
use std::net::Ipv4Addr;

/// Minimum IPv4 header length (no options)
pub const IPV4_MIN_HEADER_LEN: usize = 20;

/// Maximum IPv4 header length (IHL = 15)
pub const IPV4_MAX_HEADER_LEN: usize = 60;

/// Decoded IPv4 header. Holds a copy of the header bytes (options included)
/// and the offset the header started at within its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    data: [u8; IPV4_MAX_HEADER_LEN],
    header_len: usize,
    offset: usize,
}

impl Ipv4Header {
    /// Parse the IPv4 header that starts at `offset` in `frame`.
    ///
    /// The version is checked before anything else, so a non-IPv4 packet is
    /// reported as [`ParseError::UnsupportedVersion`] without reading further.
    pub fn parse(frame: &[u8], offset: usize) -> Result<Self, ParseError> {
        let data = region(frame, offset, 1)?;

        let version = data[0] >> 4;
        if version != 4 {
            return Err(ParseError::UnsupportedVersion { version });
        }

        let ihl = data[0] & 0x0F;
        if ihl < 5 {
            return Err(ParseError::MalformedHeaderLength { ihl });
        }

        let header_len = ihl as usize * 4;
        let data = region(frame, offset, header_len)?;

        let mut copy = [0u8; IPV4_MAX_HEADER_LEN];
        copy[..header_len].copy_from_slice(&data[..header_len]);

        Ok(Ipv4Header {
            data: copy,
            header_len,
            offset,
        })
    }

    /// IP version (always 4).
    #[inline]
    pub fn version(&self) -> u8 {
        self.data[0] >> 4
    }

    /// Internet Header Length in 32-bit words.
    #[inline]
    pub fn ihl(&self) -> u8 {
        self.data[0] & 0x0F
    }

    /// Header length in bytes.
    #[inline]
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Byte position in the frame where the transport header begins.
    #[inline]
    pub fn transport_offset(&self) -> usize {
        self.offset + self.header_len
    }

    /// Type of Service / DSCP + ECN.
    #[inline]
    pub fn tos(&self) -> u8 {
        self.data[1]
    }

    /// Differentiated Services Code Point (upper 6 bits of TOS).
    #[inline]
    pub fn dscp(&self) -> u8 {
        self.data[1] >> 2
    }

    /// Explicit Congestion Notification (lower 2 bits of TOS).
    #[inline]
    pub fn ecn(&self) -> u8 {
        self.data[1] & 0x03
    }

    /// Total length of the IP packet (header + payload) as declared.
    #[inline]
    pub fn total_length(&self) -> u16 {
        be_u16(&self.data, 2)
    }

    #[inline]
    pub fn identification(&self) -> u16 {
        be_u16(&self.data, 4)
    }

    /// Don't Fragment flag.
    #[inline]
    pub fn dont_fragment(&self) -> bool {
        (self.data[6] >> 6) & 1 == 1
    }

    /// More Fragments flag.
    #[inline]
    pub fn more_fragments(&self) -> bool {
        (self.data[6] >> 5) & 1 == 1
    }

    /// Fragment offset in 8-byte units.
    #[inline]
    pub fn fragment_offset(&self) -> u16 {
        u16::from_be_bytes([self.data[6] & 0x1F, self.data[7]])
    }

    /// Time to Live.
    #[inline]
    pub fn ttl(&self) -> u8 {
        self.data[8]
    }

    #[inline]
    pub fn protocol(&self) -> IpProtocol {
        IpProtocol::from(self.data[9])
    }

    /// Protocol number as raw u8.
    #[inline]
    pub fn protocol_raw(&self) -> u8 {
        self.data[9]
    }

    /// Header checksum as carried on the wire. Not verified.
    #[inline]
    pub fn checksum(&self) -> u16 {
        be_u16(&self.data, 10)
    }

    #[inline]
    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.data[12], self.data[13], self.data[14], self.data[15])
    }

    #[inline]
    pub fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.data[16], self.data[17], self.data[18], self.data[19])
    }

    /// Options bytes (empty when IHL is 5).
    #[inline]
    pub fn options(&self) -> &[u8] {
        &self.data[IPV4_MIN_HEADER_LEN..self.header_len]
    }
}

impl fmt::Display for Ipv4Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} proto={} ttl={} hlen={}",
            self.src_addr(),
            self.dst_addr(),
            self.protocol(),
            self.ttl(),
            self.header_len()
        )
    }
}
