//! TCP header decoder (fixed 20-byte part only).
//!
//! TCP header layout:
//!   0                   1                   2                   3
//!   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |          Source Port          |       Destination Port        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                        Sequence Number                       |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                    Acknowledgment Number                     |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |  Data |           |U|A|P|R|S|F|                               |
//!  | Offset| Reserved  |R|C|S|S|Y|I|            Window             |
//!  |       |           |G|K|H|T|N|N|                               |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |           Checksum            |         Urgent Pointer        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

use super::{be_u16, be_u32, region, ParseError};
use std::fmt;

/// Minimum TCP header length (no options)
pub const TCP_MIN_HEADER_LEN: usize = 20;

/// TCP flags bitmask constants
pub mod flags {
    pub const FIN: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const RST: u8 = 0x04;
    pub const PSH: u8 = 0x08;
    pub const ACK: u8 = 0x10;
    pub const URG: u8 = 0x20;
    pub const ECE: u8 = 0x40;
    pub const CWR: u8 = 0x80;
}

/// Decoded TCP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    data: [u8; TCP_MIN_HEADER_LEN],
}

impl TcpHeader {
    /// Parse the TCP header at `offset` in `frame`. Only the fixed 20 bytes
    /// are required; a shorter remainder is a truncated segment and nothing
    /// is decoded from it.
    pub fn parse(frame: &[u8], offset: usize) -> Result<Self, ParseError> {
        let data = region(frame, offset, TCP_MIN_HEADER_LEN)?;
        let mut copy = [0u8; TCP_MIN_HEADER_LEN];
        copy.copy_from_slice(&data[..TCP_MIN_HEADER_LEN]);
        Ok(TcpHeader { data: copy })
    }

    #[inline]
    pub fn src_port(&self) -> u16 {
        be_u16(&self.data, 0)
    }

    #[inline]
    pub fn dst_port(&self) -> u16 {
        be_u16(&self.data, 2)
    }

    #[inline]
    pub fn sequence_number(&self) -> u32 {
        be_u32(&self.data, 4)
    }

    #[inline]
    pub fn ack_number(&self) -> u32 {
        be_u32(&self.data, 8)
    }

    /// Data offset in 32-bit words, as declared. Not validated.
    #[inline]
    pub fn data_offset(&self) -> u8 {
        self.data[12] >> 4
    }

    /// Raw flags byte (CWR ECE URG ACK PSH RST SYN FIN).
    #[inline]
    pub fn flags(&self) -> u8 {
        self.data[13]
    }

    #[inline]
    pub fn has_flag(&self, flag: u8) -> bool {
        self.data[13] & flag != 0
    }

    #[inline]
    pub fn fin(&self) -> bool {
        self.has_flag(flags::FIN)
    }

    #[inline]
    pub fn syn(&self) -> bool {
        self.has_flag(flags::SYN)
    }

    #[inline]
    pub fn rst(&self) -> bool {
        self.has_flag(flags::RST)
    }

    #[inline]
    pub fn psh(&self) -> bool {
        self.has_flag(flags::PSH)
    }

    #[inline]
    pub fn ack(&self) -> bool {
        self.has_flag(flags::ACK)
    }

    #[inline]
    pub fn urg(&self) -> bool {
        self.has_flag(flags::URG)
    }

    /// Format flags as a string like "[SYN, ACK]".
    pub fn flags_string(&self) -> String {
        let names = [
            (flags::SYN, "SYN"),
            (flags::ACK, "ACK"),
            (flags::FIN, "FIN"),
            (flags::RST, "RST"),
            (flags::PSH, "PSH"),
            (flags::URG, "URG"),
            (flags::ECE, "ECE"),
            (flags::CWR, "CWR"),
        ];
        let parts: Vec<&str> = names
            .iter()
            .filter(|(bit, _)| self.has_flag(*bit))
            .map(|(_, name)| *name)
            .collect();
        format!("[{}]", parts.join(", "))
    }

    #[inline]
    pub fn window_size(&self) -> u16 {
        be_u16(&self.data, 14)
    }

    /// Checksum as carried on the wire. Not verified.
    #[inline]
    pub fn checksum(&self) -> u16 {
        be_u16(&self.data, 16)
    }

    #[inline]
    pub fn urgent_pointer(&self) -> u16 {
        be_u16(&self.data, 18)
    }
}

impl fmt::Display for TcpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ":{} -> :{} {} seq={} ack={} win={}",
            self.src_port(),
            self.dst_port(),
            self.flags_string(),
            self.sequence_number(),
            self.ack_number(),
            self.window_size()
        )
    }
}
