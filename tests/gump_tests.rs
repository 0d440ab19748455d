//! GUMP codec integration tests.
//!
//! Exercises parsing and generation through the public API, using capture buffers
//! encoded by hand in `common`.

mod common;

use ancstar::constants::GUMP_WRAPPER_SIZE;
use ancstar::serialization::gump;
use ancstar::{
    AncError, AncillaryPacket, Channel, Coding, DataStream, DidSdid, ErrorKind, FailReason, Field,
    Link, PacketLocation, Space,
};
use common::{create_test_packet, digital_gump, gump_bytes, patterned_payload};

#[test]
fn parse_reference_packet_without_location() {
    let buf = [0xFF, 0, 0, 0x61, 0x02, 0x05, 1, 2, 3, 4, 5, 0xAA];
    let (result, consumed) = AncillaryPacket::from_gump(&buf, buf.len(), &PacketLocation::default());
    let packet = result.unwrap();
    assert_eq!(consumed, 12);
    assert_eq!(packet.did_sdid(), DidSdid::new(0x61, 0x02));
    assert_eq!(packet.payload(), &[1, 2, 3, 4, 5]);
    assert_eq!(packet.checksum(), 0xAA);
    assert!(!packet.checksum_ok());
}

#[test]
fn parse_error_cases_report_consumed_bytes() {
    let loc = PacketLocation::default();

    let (result, consumed) = gump::parse(&[], 0, &loc);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Null);
    assert_eq!(consumed, 0);

    let (result, consumed) = gump::parse(&[0x01, 0, 0, 0, 0, 0, 0], 7, &loc);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::BadParam);
    assert_eq!(consumed, 0);

    let (result, consumed) = gump::parse(&[0xFF, 0, 0, 0, 0, 0], 6, &loc);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Range);
    assert_eq!(consumed, 6);
}

#[test]
fn caller_max_bytes_limits_parse() {
    let buf = digital_gump(9, 0x41, 0x05, &[1, 2, 3]);
    let (result, consumed) = gump::parse(&buf, buf.len() - 1, &PacketLocation::default());
    assert_eq!(
        result.unwrap_err(),
        AncError::Range {
            field: Field::GumpPacket,
            got: buf.len(),
            limit: buf.len() - 1
        }
    );
    assert_eq!(consumed, buf.len() - 1);
}

#[test]
fn parse_chroma_hanc_packet_on_high_line() {
    let buf = gump_bytes(false, false, true, 1125, 0x41, 0x01, &[0xAB; 8], 0x00);
    let default_location =
        PacketLocation::new(Link::B, DataStream::Ds2, Channel::Y, Space::Vanc, 1).unwrap();
    let packet = gump::parse_vec(&buf, &default_location).unwrap();

    assert_eq!(packet.coding(), Coding::Digital);
    assert_eq!(packet.location().line(), 1125);
    assert_eq!(packet.location().channel(), Channel::C);
    assert_eq!(packet.location().space(), Space::Hanc);
    assert_eq!(packet.location().link(), Link::B);
    assert_eq!(packet.location().stream(), DataStream::Ds2);
}

#[test]
fn generated_packet_matches_hand_encoding() {
    let payload = patterned_payload(40, 3);
    let packet = create_test_packet(Coding::Digital, DidSdid::new(0x41, 0x05), 13, &payload);
    let generated = gump::generate_vec(&packet).unwrap();
    assert_eq!(generated, digital_gump(13, 0x41, 0x05, &payload));
}

#[test]
fn digital_payload_over_255_is_truncated() {
    let payload = patterned_payload(300, 9);
    let packet = create_test_packet(Coding::Digital, DidSdid::new(0x45, 0x01), 9, &payload);
    assert_eq!(packet.gump_size().unwrap(), 262);

    let mut out = vec![0u8; 300];
    let written = packet.generate_gump(&mut out).unwrap();
    assert_eq!(written, 262);

    let reparsed = gump::parse_vec(&out[..written], &PacketLocation::default()).unwrap();
    assert_eq!(reparsed.dc(), 255);
    assert_eq!(reparsed.payload(), &payload[..255]);
    assert!(reparsed.checksum_ok());
    // The source packet is untouched.
    assert_eq!(packet.dc(), 300);
}

#[test]
fn raw_payload_splits_into_three_packets() {
    let payload = patterned_payload(600, 1);
    let mut packet = create_test_packet(Coding::Raw, DidSdid::new(0x00, 0x00), 21, &payload);
    packet.set_checksum(0x3C);
    let out = gump::generate_vec(&packet).unwrap();

    let loc = PacketLocation::default();
    let mut offset = 0;
    let mut dcs = Vec::new();
    while offset < out.len() {
        let (result, consumed) = gump::parse(&out[offset..], out.len() - offset, &loc);
        let chunk = result.unwrap();
        assert_eq!(chunk.coding(), Coding::Raw);
        assert_eq!(chunk.did_sdid(), packet.did_sdid());
        assert_eq!(chunk.checksum(), 0x3C);
        assert_eq!(chunk.location().line(), 21);
        dcs.push(chunk.dc());
        offset += consumed;
    }
    assert_eq!(dcs, vec![255, 255, 90]);
    assert_eq!(offset, 3 * GUMP_WRAPPER_SIZE + 600);
}

#[test]
fn empty_raw_packet_generates_nothing() {
    let packet = create_test_packet(Coding::Raw, DidSdid::new(0x00, 0x00), 21, &[]);
    assert_eq!(packet.gump_size().unwrap(), 0);
    let mut out = [0u8; 32];
    assert_eq!(
        packet.generate_gump(&mut out).unwrap_err(),
        AncError::Fail {
            reason: FailReason::EmptyRawPayload
        }
    );
}

#[test]
fn unknown_coding_cannot_generate() {
    let packet = create_test_packet(Coding::Unknown, DidSdid::new(0x61, 0x02), 9, &[1]);
    assert_eq!(packet.gump_size().unwrap_err().kind(), ErrorKind::Fail);
    assert_eq!(gump::generate_vec(&packet).unwrap_err().kind(), ErrorKind::Fail);
}
