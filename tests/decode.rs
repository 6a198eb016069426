//! End-to-end decoding of synthetic frames built byte by byte.

use framescope::capture::ReplaySource;
use framescope::protocol::{
    decode, EtherType, Layer, Outcome, ParseError, TransportSegment, Unsupported,
};
use framescope::sniffer::{self, Collect, StopReason};
use std::net::Ipv4Addr;
use std::sync::atomic::AtomicBool;

const ETH_LEN: usize = 14;

/// Ethernet header with the given EtherType.
fn ethernet(ether_type: u16) -> Vec<u8> {
    let mut frame = Vec::with_capacity(64);
    frame.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]); // dst
    frame.extend_from_slice(&[0x02, 0x42, 0xac, 0x11, 0x00, 0x02]); // src
    frame.extend_from_slice(&ether_type.to_be_bytes());
    frame
}

/// IPv4 header with `ihl` words; option bytes are filled with 0x01 (NOP).
fn ipv4(ihl: u8, protocol: u8, ttl: u8) -> Vec<u8> {
    let header_len = ihl as usize * 4;
    let mut ip = vec![0u8; header_len.max(20)];
    ip[0] = 0x40 | (ihl & 0x0F);
    ip[2..4].copy_from_slice(&(header_len as u16).to_be_bytes());
    ip[8] = ttl;
    ip[9] = protocol;
    ip[12..16].copy_from_slice(&[192, 168, 0, 10]);
    ip[16..20].copy_from_slice(&[93, 184, 216, 34]);
    for byte in ip.iter_mut().skip(20) {
        *byte = 0x01;
    }
    ip
}

fn tcp(src_port: u16, dst_port: u16, flags: u8) -> Vec<u8> {
    let mut seg = vec![0u8; 20];
    seg[0..2].copy_from_slice(&src_port.to_be_bytes());
    seg[2..4].copy_from_slice(&dst_port.to_be_bytes());
    seg[12] = 0x50;
    seg[13] = flags;
    seg
}

fn udp(src_port: u16, dst_port: u16, length: u16) -> Vec<u8> {
    let mut seg = vec![0u8; 8];
    seg[0..2].copy_from_slice(&src_port.to_be_bytes());
    seg[2..4].copy_from_slice(&dst_port.to_be_bytes());
    seg[4..6].copy_from_slice(&length.to_be_bytes());
    seg[6..8].copy_from_slice(&0x1234u16.to_be_bytes());
    seg
}

fn frame(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

#[test]
fn runts_never_yield_an_ethernet_layer() {
    let full = frame(&[&ethernet(0x0800), &ipv4(5, 6, 64), &tcp(1, 2, 0)]);
    for len in 0..ETH_LEN {
        let result = decode(&full[..len]);
        assert!(result.ethernet.is_none(), "len {}", len);
        assert!(result.ipv4.is_none());
        assert!(result.transport.is_none());
        assert_eq!(
            result.outcome,
            Outcome::Failed {
                layer: Layer::Ethernet,
                error: ParseError::TooShort {
                    expected: ETH_LEN,
                    actual: len
                },
            }
        );
    }
}

#[test]
fn every_prefix_decodes_without_panicking() {
    let full = frame(&[&ethernet(0x0800), &ipv4(15, 17, 1), &udp(1, 2, 8)]);
    for len in 0..=full.len() {
        let result = decode(&full[..len]);
        if len >= ETH_LEN {
            assert!(result.ethernet.is_some());
        }
        if len < full.len() {
            assert!(result.transport.is_none(), "len {}", len);
        }
    }
    assert_eq!(decode(&full).outcome, Outcome::Complete);
}

#[test]
fn non_ipv4_ethertypes_stop_after_ethernet() {
    for (raw, expected) in [
        (0x86DDu16, EtherType::Ipv6),
        (0x0806, EtherType::Arp),
        (0x8100, EtherType::VlanTagged),
        (0x88CC, EtherType::Unknown(0x88CC)),
    ] {
        let mut bytes = ethernet(raw);
        bytes.extend_from_slice(&ipv4(5, 6, 64));
        let result = decode(&bytes);
        let eth = result.ethernet.expect("ethernet layer");
        assert_eq!(eth.ether_type_raw(), raw);
        assert!(result.ipv4.is_none());
        assert!(result.transport.is_none());
        assert_eq!(result.outcome, Outcome::NotIp(expected));
        assert!(!result.outcome.is_failure());
    }
}

#[test]
fn transport_offset_follows_ihl() {
    for ihl in 5..=15u8 {
        let bytes = frame(&[&ethernet(0x0800), &ipv4(ihl, 17, 64), &udp(4000, 4001, 8)]);
        let result = decode(&bytes);
        let expected = ETH_LEN + ihl as usize * 4;
        assert_eq!(result.transport_offset(), Some(expected), "ihl {}", ihl);
        match result.transport {
            Some(TransportSegment::Udp(hdr)) => {
                assert_eq!(hdr.src_port(), 4000, "ihl {}", ihl);
                assert_eq!(hdr.dst_port(), 4001, "ihl {}", ihl);
            }
            other => panic!("ihl {}: expected UDP, got {:?}", ihl, other),
        }
    }
}

#[test]
fn truncated_tcp_is_reported_not_misread() {
    let full = frame(&[&ethernet(0x0800), &ipv4(6, 6, 64), &tcp(443, 51000, 0x12)]);
    let offset = ETH_LEN + 24;
    for len in offset..offset + 20 {
        let result = decode(&full[..len]);
        assert!(result.ipv4.is_some());
        assert!(result.transport.is_none());
        assert_eq!(
            result.outcome,
            Outcome::Failed {
                layer: Layer::Tcp,
                error: ParseError::TooShort {
                    expected: 20,
                    actual: len - offset
                },
            }
        );
    }
}

#[test]
fn truncated_udp_is_reported() {
    let full = frame(&[&ethernet(0x0800), &ipv4(5, 17, 64), &udp(5000, 53, 8)]);
    let result = decode(&full[..full.len() - 1]);
    assert!(result.ipv4.is_some());
    assert_eq!(
        result.outcome,
        Outcome::Failed {
            layer: Layer::Udp,
            error: ParseError::TooShort {
                expected: 8,
                actual: 7
            },
        }
    );
}

#[test]
fn ports_are_read_big_endian() {
    let bytes = frame(&[&ethernet(0x0800), &ipv4(5, 6, 64), &tcp(443, 51000, 0)]);
    let result = decode(&bytes);
    let seg = result.transport.expect("tcp segment");
    assert_eq!(seg.src_port(), 443);
    assert_eq!(seg.dst_port(), 51000);
}

#[test]
fn tcp_syn_end_to_end() {
    let bytes = frame(&[&ethernet(0x0800), &ipv4(5, 6, 64), &tcp(12345, 80, 0x02)]);
    assert_eq!(bytes.len(), 54);

    let result = decode(&bytes);
    assert_eq!(result.outcome, Outcome::Complete);

    let eth = result.ethernet.expect("ethernet");
    assert_eq!(eth.dst_mac(), [0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
    assert_eq!(eth.src_mac(), [0x02, 0x42, 0xac, 0x11, 0x00, 0x02]);

    let ip = result.ipv4.expect("ipv4");
    assert_eq!(ip.protocol_raw(), 6);
    assert_eq!(ip.ttl(), 64);
    assert_eq!(ip.src_addr(), Ipv4Addr::new(192, 168, 0, 10));
    assert_eq!(ip.dst_addr(), Ipv4Addr::new(93, 184, 216, 34));

    match result.transport {
        Some(TransportSegment::Tcp(hdr)) => {
            assert_eq!((hdr.src_port(), hdr.dst_port()), (12345, 80));
            assert_eq!(hdr.flags(), 0b0000_0010);
            assert!(hdr.syn());
            assert_eq!(format!("{:08b}", hdr.flags()), "00000010");
        }
        other => panic!("expected TCP, got {:?}", other),
    }
}

#[test]
fn udp_behind_ip_options_end_to_end() {
    let bytes = frame(&[&ethernet(0x0800), &ipv4(8, 17, 64), &udp(5000, 53, 8)]);
    assert_eq!(bytes.len(), 46 + 8);

    let result = decode(&bytes);
    assert_eq!(result.outcome, Outcome::Complete);
    assert_eq!(result.transport_offset(), Some(46));

    let ip = result.ipv4.as_ref().expect("ipv4");
    assert_eq!(ip.ihl(), 8);
    assert_eq!(ip.options(), &[0x01; 12]);

    match result.transport {
        Some(TransportSegment::Udp(hdr)) => {
            assert_eq!(hdr.src_port(), 5000);
            assert_eq!(hdr.dst_port(), 53);
            assert_eq!(hdr.length(), 8);
            assert_eq!(hdr.checksum(), 0x1234);
        }
        other => panic!("expected UDP, got {:?}", other),
    }
}

#[test]
fn ip_version_other_than_four_is_unsupported() {
    let mut ip = ipv4(5, 6, 64);
    ip[0] = 0x65;
    let bytes = frame(&[&ethernet(0x0800), &ip, &tcp(1, 2, 0)]);
    let result = decode(&bytes);
    assert!(result.ethernet.is_some());
    assert!(result.ipv4.is_none());
    assert_eq!(result.outcome, Outcome::Unsupported(Unsupported::IpVersion(6)));
    assert!(!result.outcome.is_failure());
}

#[test]
fn small_ihl_is_malformed() {
    for ihl in 0..5u8 {
        let mut ip = ipv4(5, 6, 64);
        ip[0] = 0x40 | ihl;
        let bytes = frame(&[&ethernet(0x0800), &ip, &tcp(1, 2, 0)]);
        let result = decode(&bytes);
        assert!(result.ethernet.is_some());
        assert!(result.ipv4.is_none());
        assert_eq!(
            result.outcome,
            Outcome::Failed {
                layer: Layer::Ipv4,
                error: ParseError::MalformedHeaderLength { ihl },
            }
        );
    }
}

#[test]
fn ihl_beyond_frame_is_too_short() {
    let mut ip = ipv4(5, 6, 64);
    ip[0] = 0x4F; // claims 60 bytes
    let bytes = frame(&[&ethernet(0x0800), &ip]);
    let result = decode(&bytes);
    assert!(result.ipv4.is_none());
    assert_eq!(
        result.outcome,
        Outcome::Failed {
            layer: Layer::Ipv4,
            error: ParseError::TooShort {
                expected: 60,
                actual: 20
            },
        }
    );
}

#[test]
fn other_transport_protocols_keep_ip_layer() {
    let bytes = frame(&[&ethernet(0x0800), &ipv4(5, 1, 128), &[8u8, 0, 0, 0, 0, 0, 0, 0]]);
    let result = decode(&bytes);
    assert!(result.ethernet.is_some());
    assert_eq!(result.ipv4.as_ref().map(|ip| ip.ttl()), Some(128));
    assert!(result.transport.is_none());
    assert_eq!(
        result.outcome,
        Outcome::Unsupported(Unsupported::TransportProtocol(1))
    );
}

#[test]
fn results_are_owned_and_outlive_the_buffer() {
    let result = {
        let bytes = frame(&[&ethernet(0x0800), &ipv4(5, 6, 64), &tcp(22, 60000, 0x18)]);
        decode(&bytes)
    };
    assert_eq!(result.transport.map(|t| t.src_port()), Some(22));
}

#[test]
fn decoding_in_parallel_matches_sequential() {
    let frames: Vec<Vec<u8>> = (0..64u16)
        .map(|i| frame(&[&ethernet(0x0800), &ipv4(5 + (i % 11) as u8, 17, 64), &udp(i, 53, 8)]))
        .collect();
    let sequential: Vec<_> = frames.iter().map(|f| decode(f)).collect();

    let parallel: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = frames
            .chunks(16)
            .map(|chunk| scope.spawn(move || chunk.iter().map(|f| decode(f)).collect::<Vec<_>>()))
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().expect("decoder thread"))
            .collect()
    });

    assert_eq!(sequential, parallel);
}

#[test]
fn capture_loop_over_mixed_traffic() {
    let mut source = ReplaySource::new();
    source
        .push_frame(frame(&[&ethernet(0x0800), &ipv4(5, 6, 64), &tcp(12345, 80, 0x02)]))
        .push_timeout()
        .push_frame(ethernet(0x0806))
        .push_frame(vec![0u8; 6])
        .push_timeout()
        .push_frame(frame(&[&ethernet(0x0800), &ipv4(8, 17, 64), &udp(5000, 53, 8)]))
        .push_frame(frame(&[&ethernet(0x0800), &ipv4(5, 1, 64)]));

    let running = AtomicBool::new(true);
    let mut sink = Collect::default();
    let stats = sniffer::run(&mut source, &running, 0, &mut sink).unwrap();

    assert_eq!(stats.frames, 5);
    assert_eq!(stats.timeouts, 2);
    assert_eq!(stats.complete, 2);
    assert_eq!(stats.not_ip, 1);
    assert_eq!(stats.unsupported, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.stop, StopReason::EndOfCapture);

    let indices: Vec<u64> = sink.results.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    assert!(matches!(
        sink.results[3].1.transport,
        Some(TransportSegment::Udp(_))
    ));
}
