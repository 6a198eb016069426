//! Ethernet II header decoder.
//!
//! An Ethernet frame has the following layout:
//!   - Destination MAC: 6 bytes
//!   - Source MAC:      6 bytes
//!   - EtherType:       2 bytes
//!   - Payload:         variable
//!
//! Total header size: 14 bytes. VLAN tags are not stripped; a tagged frame
//! reports EtherType 0x8100 and stops here.

use super::{be_u16, region, EtherType, ParseError};
use std::fmt;

/// Ethernet header length (no VLAN tags)
pub const ETH_HEADER_LEN: usize = 14;

/// Length of a MAC address in bytes.
pub const MAC_LEN: usize = 6;

/// Decoded Ethernet header, copied out of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    dst: [u8; MAC_LEN],
    src: [u8; MAC_LEN],
    ether_type: u16,
}

impl EthernetHeader {
    /// Parse an Ethernet header from the start of a raw frame.
    /// Returns an error if there aren't enough bytes.
    pub fn parse(frame: &[u8]) -> Result<Self, ParseError> {
        let data = region(frame, 0, ETH_HEADER_LEN)?;

        let mut dst = [0u8; MAC_LEN];
        let mut src = [0u8; MAC_LEN];
        dst.copy_from_slice(&data[0..6]);
        src.copy_from_slice(&data[6..12]);

        Ok(EthernetHeader {
            dst,
            src,
            ether_type: be_u16(data, 12),
        })
    }

    /// Destination MAC address.
    #[inline]
    pub fn dst_mac(&self) -> [u8; MAC_LEN] {
        self.dst
    }

    /// Source MAC address.
    #[inline]
    pub fn src_mac(&self) -> [u8; MAC_LEN] {
        self.src
    }

    /// EtherType field.
    #[inline]
    pub fn ether_type(&self) -> EtherType {
        EtherType::from(self.ether_type)
    }

    /// Raw EtherType as u16.
    #[inline]
    pub fn ether_type_raw(&self) -> u16 {
        self.ether_type
    }
}

/// Format a MAC address as xx:xx:xx:xx:xx:xx
pub fn format_mac(mac: &[u8; MAC_LEN]) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}

impl fmt::Display for EthernetHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} [{}]",
            format_mac(&self.src),
            format_mac(&self.dst),
            self.ether_type()
        )
    }
}
