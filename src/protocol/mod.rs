//! Layered frame decoder: Ethernet → IPv4 → TCP/UDP.
//!
//! [`decode`] is a pure function from an untrusted byte slice to an owned
//! [`DecodeResult`]. It never panics on short or corrupt input; instead it
//! stops at the deepest layer it could parse and records why in
//! [`Outcome`].

pub mod ethernet;
pub mod ipv4;
pub mod tcp;
pub mod udp;

use std::fmt;

/// EtherType constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    Ipv4,
    Ipv6,
    Arp,
    VlanTagged,
    Mpls,
    MplsMulticast,
    Unknown(u16),
}

impl From<u16> for EtherType {
    fn from(value: u16) -> Self {
        match value {
            0x0800 => EtherType::Ipv4,
            0x86DD => EtherType::Ipv6,
            0x0806 => EtherType::Arp,
            0x8100 => EtherType::VlanTagged,
            0x8847 => EtherType::Mpls,
            0x8848 => EtherType::MplsMulticast,
            other => EtherType::Unknown(other),
        }
    }
}

impl EtherType {
    pub fn as_u16(&self) -> u16 {
        match self {
            EtherType::Ipv4 => 0x0800,
            EtherType::Ipv6 => 0x86DD,
            EtherType::Arp => 0x0806,
            EtherType::VlanTagged => 0x8100,
            EtherType::Mpls => 0x8847,
            EtherType::MplsMulticast => 0x8848,
            EtherType::Unknown(v) => *v,
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::Ipv4 => write!(f, "IPv4"),
            EtherType::Ipv6 => write!(f, "IPv6"),
            EtherType::Arp => write!(f, "ARP"),
            EtherType::VlanTagged => write!(f, "802.1Q VLAN"),
            EtherType::Mpls => write!(f, "MPLS"),
            EtherType::MplsMulticast => write!(f, "MPLS Multicast"),
            EtherType::Unknown(v) => write!(f, "Unknown(0x{:04x})", v),
        }
    }
}

/// IP protocol numbers. Only TCP and UDP are decoded; the rest are named
/// for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    Icmp,
    Tcp,
    Udp,
    Unknown(u8),
}

impl From<u8> for IpProtocol {
    fn from(value: u8) -> Self {
        match value {
            1 => IpProtocol::Icmp,
            6 => IpProtocol::Tcp,
            17 => IpProtocol::Udp,
            other => IpProtocol::Unknown(other),
        }
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpProtocol::Icmp => write!(f, "ICMP"),
            IpProtocol::Tcp => write!(f, "TCP"),
            IpProtocol::Udp => write!(f, "UDP"),
            IpProtocol::Unknown(v) => write!(f, "Proto({})", v),
        }
    }
}

/// Errors from a single layer parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not enough bytes to parse the header
    TooShort { expected: usize, actual: usize },
    /// IPv4 IHL below the legal minimum of 5 words
    MalformedHeaderLength { ihl: u8 },
    /// IP version nibble other than 4
    UnsupportedVersion { version: u8 },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::TooShort { expected, actual } => {
                write!(f, "too short: need {} bytes, got {}", expected, actual)
            }
            ParseError::MalformedHeaderLength { ihl } => {
                write!(f, "malformed header length: IHL {} (min 5)", ihl)
            }
            ParseError::UnsupportedVersion { version } => {
                write!(f, "unsupported IP version {}", version)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// The protocol layer a decode failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Ethernet,
    Ipv4,
    Tcp,
    Udp,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Ethernet => write!(f, "Ethernet frame"),
            Layer::Ipv4 => write!(f, "IPv4 header"),
            Layer::Tcp => write!(f, "TCP segment"),
            Layer::Udp => write!(f, "UDP datagram"),
        }
    }
}

/// A value the decoder recognised but does not descend into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    IpVersion(u8),
    TransportProtocol(u8),
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsupported::IpVersion(v) => write!(f, "unsupported IP version {}", v),
            Unsupported::TransportProtocol(n) => {
                write!(f, "unsupported transport protocol {} ({})", n, IpProtocol::from(*n))
            }
        }
    }
}

/// Why decoding stopped where it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every layer down to the transport header was decoded.
    Complete,
    /// EtherType is not IPv4; the network layer does not apply.
    NotIp(EtherType),
    /// Informational: a protocol field named something we don't decode.
    Unsupported(Unsupported),
    /// A structural or malformed-field failure at `layer`.
    Failed { layer: Layer, error: ParseError },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Complete => write!(f, "complete"),
            Outcome::NotIp(ether_type) => write!(f, "not IP ({})", ether_type),
            Outcome::Unsupported(u) => write!(f, "{}", u),
            Outcome::Failed {
                layer,
                error: ParseError::TooShort { expected, actual },
            } => write!(
                f,
                "truncated {}: need {} bytes, got {}",
                layer, expected, actual
            ),
            Outcome::Failed { layer, error } => write!(f, "bad {}: {}", layer, error),
        }
    }
}

/// Transport layer header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSegment {
    Tcp(tcp::TcpHeader),
    Udp(udp::UdpHeader),
}

impl TransportSegment {
    pub fn src_port(&self) -> u16 {
        match self {
            TransportSegment::Tcp(h) => h.src_port(),
            TransportSegment::Udp(h) => h.src_port(),
        }
    }

    pub fn dst_port(&self) -> u16 {
        match self {
            TransportSegment::Tcp(h) => h.dst_port(),
            TransportSegment::Udp(h) => h.dst_port(),
        }
    }
}

/// Everything decoded from one frame. Layers are filled top-down; a `None`
/// layer means decoding stopped above it, and `outcome` says why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult {
    pub ethernet: Option<ethernet::EthernetHeader>,
    pub ipv4: Option<ipv4::Ipv4Header>,
    pub transport: Option<TransportSegment>,
    pub outcome: Outcome,
}

impl DecodeResult {
    fn stopped(outcome: Outcome) -> Self {
        DecodeResult {
            ethernet: None,
            ipv4: None,
            transport: None,
            outcome,
        }
    }

    /// Byte offset of the transport header, if the IPv4 layer decoded.
    pub fn transport_offset(&self) -> Option<usize> {
        self.ipv4.as_ref().map(|h| h.transport_offset())
    }
}

/// Decode a complete frame from raw bytes.
/// This is the main entry point for the protocol stack.
pub fn decode(frame: &[u8]) -> DecodeResult {
    // Layer 2: Ethernet
    let eth = match ethernet::EthernetHeader::parse(frame) {
        Ok(hdr) => hdr,
        Err(error) => {
            return DecodeResult::stopped(Outcome::Failed {
                layer: Layer::Ethernet,
                error,
            })
        }
    };

    let ether_type = eth.ether_type();
    let mut result = DecodeResult::stopped(Outcome::NotIp(ether_type));
    result.ethernet = Some(eth);
    if ether_type != EtherType::Ipv4 {
        return result;
    }

    // Layer 3: IPv4
    let ip = match ipv4::Ipv4Header::parse(frame, ethernet::ETH_HEADER_LEN) {
        Ok(hdr) => hdr,
        Err(ParseError::UnsupportedVersion { version }) => {
            result.outcome = Outcome::Unsupported(Unsupported::IpVersion(version));
            return result;
        }
        Err(error) => {
            result.outcome = Outcome::Failed {
                layer: Layer::Ipv4,
                error,
            };
            return result;
        }
    };

    // Layer 4: Transport, at the offset the IHL declares
    let (transport, outcome) =
        match decode_transport(frame, ip.transport_offset(), ip.protocol_raw()) {
            Ok(segment) => (Some(segment), Outcome::Complete),
            Err(outcome) => (None, outcome),
        };
    result.ipv4 = Some(ip);
    result.transport = transport;
    result.outcome = outcome;
    result
}

/// Decode the transport header found at `offset` in `frame`, dispatching on
/// the IPv4 protocol number. On failure the returned [`Outcome`] describes
/// why nothing was decoded.
pub fn decode_transport(
    frame: &[u8],
    offset: usize,
    protocol: u8,
) -> Result<TransportSegment, Outcome> {
    match IpProtocol::from(protocol) {
        IpProtocol::Tcp => tcp::TcpHeader::parse(frame, offset)
            .map(TransportSegment::Tcp)
            .map_err(|error| Outcome::Failed {
                layer: Layer::Tcp,
                error,
            }),
        IpProtocol::Udp => udp::UdpHeader::parse(frame, offset)
            .map(TransportSegment::Udp)
            .map_err(|error| Outcome::Failed {
                layer: Layer::Udp,
                error,
            }),
        _ => Err(Outcome::Unsupported(Unsupported::TransportProtocol(protocol))),
    }
}

/// Bytes of `frame` from `offset` on, if at least `need` of them exist.
///
/// All layer parsers go through here so that no header field is ever read
/// past the end of the captured buffer.
pub(crate) fn region(frame: &[u8], offset: usize, need: usize) -> Result<&[u8], ParseError> {
    let available = frame.len().saturating_sub(offset);
    if offset > frame.len() || available < need {
        return Err(ParseError::TooShort {
            expected: need,
            actual: available,
        });
    }
    Ok(&frame[offset..])
}

#[inline]
pub(crate) fn be_u16(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

#[inline]
pub(crate) fn be_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}
