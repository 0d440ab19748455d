//! GUMP packet parsing and generation.
//!
//! GUMP is the byte format capture hardware writes into (and playout hardware reads
//! from) the ancillary data buffer. Each packet is a 7-byte wrapper around the
//! payload:
//!
//! ```text
//! 0:          0xFF      marker
//! 1:          header 1  bit7 location valid, bit6 raw, bit5 luma, bit4 HANC, bits3..0 line[10:7]
//! 2:          header 2  bits6..0 line[6:0]
//! 3:          DID
//! 4:          SDID
//! 5:          DC        payload length
//! 6..6+DC-1:  payload
//! 6+DC:       8-bit checksum
//! ```

use bytes::{Buf, BufMut, Bytes};
use tracing::{debug, warn};

use crate::checksum::checksum8;
use crate::constants::{
    GUMP_DC_OFFSET, GUMP_DID_OFFSET, GUMP_HANC_SPACE_BIT, GUMP_HEADER_BYTE1_OFFSET,
    GUMP_HEADER_BYTE2_OFFSET, GUMP_LINE_LSB_MASK, GUMP_LINE_MSB_MASK, GUMP_LINE_MSB_SHIFT,
    GUMP_LOCATION_VALID_BIT, GUMP_LUMA_CHANNEL_BIT, GUMP_MARKER, GUMP_PAYLOAD_OFFSET,
    GUMP_RAW_CODING_BIT, GUMP_SDID_OFFSET, GUMP_WRAPPER_SIZE, MAX_DATA_COUNT,
};
use crate::error::{AncError, FailReason, Field};
use crate::location::{Channel, PacketLocation, Space};
use crate::packet::AncillaryPacket;
use crate::types::Coding;

/// Parses one GUMP packet from the start of `buf`.
///
/// `max_bytes` is the number of valid bytes remaining in the caller's capture
/// buffer; it is clamped to `buf.len()`. The second tuple element is the number of
/// bytes consumed, which tells a scanning caller where the next packet starts:
/// `0` on a bad marker (resynchronize one byte at a time), all available bytes on a
/// truncated packet.
///
/// # Parameters
/// - `buf`: Captured bytes starting at the packet marker.
/// - `max_bytes`: Valid bytes remaining in the capture buffer.
/// - `default_location`: Location applied when the header does not carry one.
///
/// # Returns
/// The parsed packet (or error) and the consumed byte count.
pub fn parse(
    buf: &[u8],
    max_bytes: usize,
    default_location: &PacketLocation,
) -> (Result<AncillaryPacket, AncError>, usize) {
    if buf.is_empty() {
        return (
            Err(AncError::Null {
                field: Field::GumpBuffer,
            }),
            0,
        );
    }

    let max_bytes = max_bytes.min(buf.len());
    if max_bytes < GUMP_WRAPPER_SIZE {
        return (
            Err(AncError::range(
                Field::GumpWrapper,
                max_bytes,
                GUMP_WRAPPER_SIZE,
            )),
            max_bytes,
        );
    }

    if buf[0] != GUMP_MARKER {
        return (
            Err(AncError::BadParam {
                expected: GUMP_MARKER,
                got: buf[0],
            }),
            0,
        );
    }

    let dc = buf[GUMP_DC_OFFSET] as usize;
    let total_size = dc + GUMP_WRAPPER_SIZE;
    if total_size > max_bytes {
        return (
            Err(AncError::range(Field::GumpPacket, total_size, max_bytes)),
            max_bytes,
        );
    }

    (
        decode_packet(&buf[..total_size], default_location),
        total_size,
    )
}

/// Parses a complete byte sequence holding a single GUMP packet.
///
/// # Errors
/// - [`AncError::Null`] - `data` is empty
/// - Any error of [`parse`]
pub fn parse_vec(
    data: &[u8],
    default_location: &PacketLocation,
) -> Result<AncillaryPacket, AncError> {
    parse(data, data.len(), default_location).0
}

/// Parses the next GUMP packet from `data` and advances it past the consumed bytes.
///
/// On a bad marker nothing is consumed; the caller decides whether to skip a byte.
pub fn parse_bytes(
    data: &mut Bytes,
    default_location: &PacketLocation,
) -> Result<AncillaryPacket, AncError> {
    let (result, consumed) = parse(data.as_ref(), data.len(), default_location);
    data.advance(consumed);
    result
}

/// Decodes a packet whose length has already been validated against the buffer.
fn decode_packet(
    packet_bytes: &[u8],
    default_location: &PacketLocation,
) -> Result<AncillaryPacket, AncError> {
    let dc = packet_bytes.len() - GUMP_WRAPPER_SIZE;
    let mut packet = AncillaryPacket::new();
    packet.set_did(packet_bytes[GUMP_DID_OFFSET]);
    packet.set_sdid(packet_bytes[GUMP_SDID_OFFSET]);
    packet.set_checksum(packet_bytes[packet_bytes.len() - 1]);

    let mut location = *default_location;
    let header1 = packet_bytes[GUMP_HEADER_BYTE1_OFFSET];
    if header1 & GUMP_LOCATION_VALID_BIT != 0 {
        let coding = if header1 & GUMP_RAW_CODING_BIT != 0 {
            Coding::Raw
        } else {
            Coding::Digital
        };
        packet.set_coding(coding);

        let channel = if header1 & GUMP_LUMA_CHANNEL_BIT != 0 {
            Channel::Y
        } else {
            Channel::C
        };
        let space = if header1 & GUMP_HANC_SPACE_BIT != 0 {
            Space::Hanc
        } else {
            Space::Vanc
        };
        let line = (((header1 & GUMP_LINE_MSB_MASK) as u16) << GUMP_LINE_MSB_SHIFT)
            | (packet_bytes[GUMP_HEADER_BYTE2_OFFSET] & GUMP_LINE_LSB_MASK) as u16;
        location.set_channel(channel).set_space(space);
        location.set_line(line)?;
    }
    packet.set_location(location);

    if dc > 0 {
        packet.set_payload(&packet_bytes[GUMP_PAYLOAD_OFFSET..GUMP_PAYLOAD_OFFSET + dc])?;
    }
    packet.set_valid(true);
    Ok(packet)
}

/// Header byte 1: location-valid flag, coding, channel, space and line bits 10..7.
pub fn header_byte1(packet: &AncillaryPacket) -> u8 {
    let location = packet.location();
    let mut byte = GUMP_LOCATION_VALID_BIT;
    if packet.coding() == Coding::Raw {
        byte |= GUMP_RAW_CODING_BIT;
    }
    if location.is_luma() {
        byte |= GUMP_LUMA_CHANNEL_BIT;
    }
    if location.is_hanc() {
        byte |= GUMP_HANC_SPACE_BIT;
    }
    byte | ((location.line() >> GUMP_LINE_MSB_SHIFT) as u8 & GUMP_LINE_MSB_MASK)
}

/// Header byte 2: line bits 6..0.
pub fn header_byte2(packet: &AncillaryPacket) -> u8 {
    packet.location().line() as u8 & GUMP_LINE_LSB_MASK
}

/// Calculates the number of bytes [`generate`] will emit for `packet`.
///
/// Digital packets occupy one wire packet with at most 255 payload bytes. Raw
/// packets occupy one wire packet per 255-byte chunk; an empty raw packet needs
/// no bytes at all.
///
/// # Errors
/// - [`AncError::Fail`] - the packet's coding is [`Coding::Unknown`]
pub fn required_size(packet: &AncillaryPacket) -> Result<usize, AncError> {
    let dc = packet.dc();
    match packet.coding() {
        Coding::Digital => Ok(dc.min(MAX_DATA_COUNT) + GUMP_WRAPPER_SIZE),
        Coding::Raw if dc == 0 => Ok(0),
        Coding::Raw => {
            let chunks = dc.div_ceil(MAX_DATA_COUNT);
            let last_chunk = dc - (chunks - 1) * MAX_DATA_COUNT;
            Ok((chunks - 1) * (MAX_DATA_COUNT + GUMP_WRAPPER_SIZE) + last_chunk + GUMP_WRAPPER_SIZE)
        }
        Coding::Unknown => Err(AncError::fail(FailReason::UnknownCoding)),
    }
}

/// Serializes `packet` into `out` as one or more GUMP packets.
///
/// Digital packets carry a freshly computed checksum; a payload longer than 255
/// bytes is truncated. Raw packets are split into 255-byte chunks, each carrying
/// the packet's stored checksum.
///
/// # Parameters
/// - `packet`: The packet to serialize.
/// - `out`: Output buffer; its length is the maximum number of bytes to write.
///
/// # Returns
/// The number of bytes written to the output buffer.
///
/// # Errors
/// - [`AncError::Fail`] - unknown coding, empty raw payload, or `out` too small;
///   nothing is written
pub fn generate(packet: &AncillaryPacket, out: &mut [u8]) -> Result<usize, AncError> {
    let packet_size = required_size(packet)?;
    if packet_size == 0 {
        return Err(AncError::fail(FailReason::EmptyRawPayload));
    }
    if packet_size > out.len() {
        return Err(AncError::fail(FailReason::OutputTooSmall {
            needed: packet_size,
            available: out.len(),
        }));
    }

    let header1 = header_byte1(packet);
    let header2 = header_byte2(packet);
    let did = packet.did().value();
    let sdid = packet.sdid().value();
    let payload = packet.payload();
    let mut writer = &mut out[..packet_size];

    match packet.coding() {
        Coding::Digital => {
            let dc = payload.len().min(MAX_DATA_COUNT);
            if payload.len() > MAX_DATA_COUNT {
                warn!(
                    did,
                    sdid,
                    dc = payload.len(),
                    "Digital payload exceeds 255 bytes, truncating"
                );
            }
            let wire_payload = &payload[..dc];
            put_wire_packet(
                &mut writer,
                [header1, header2, did, sdid],
                wire_payload,
                checksum8(did, sdid, wire_payload),
            );
        }
        Coding::Raw => {
            let checksum = packet.checksum();
            let mut chunk_count = 0usize;
            for chunk in payload.chunks(MAX_DATA_COUNT) {
                put_wire_packet(&mut writer, [header1, header2, did, sdid], chunk, checksum);
                chunk_count += 1;
            }
            debug!(did, sdid, chunk_count, "Split raw payload into GUMP packets");
        }
        Coding::Unknown => return Err(AncError::fail(FailReason::UnknownCoding)),
    }

    debug_assert!(writer.is_empty(), "GUMP size mismatch");
    Ok(packet_size)
}

/// Serializes `packet` into a newly allocated buffer of exactly the required size.
///
/// # Errors
/// - [`AncError::Memory`] - the output buffer could not be allocated
/// - Any error of [`generate`]
pub fn generate_vec(packet: &AncillaryPacket) -> Result<Vec<u8>, AncError> {
    let packet_size = required_size(packet)?;
    let mut out = Vec::new();
    out.try_reserve_exact(packet_size)
        .map_err(|_| AncError::Memory {
            field: Field::OutputBuffer,
            requested: packet_size,
        })?;
    out.resize(packet_size, 0);
    let written = generate(packet, &mut out)?;
    out.truncate(written);
    Ok(out)
}

fn put_wire_packet(writer: &mut impl BufMut, fields: [u8; 4], payload: &[u8], checksum: u8) {
    let [header1, header2, did, sdid] = fields;
    writer.put_u8(GUMP_MARKER);
    writer.put_u8(header1);
    writer.put_u8(header2);
    writer.put_u8(did);
    writer.put_u8(sdid);
    writer.put_u8(payload.len() as u8);
    writer.put_slice(payload);
    writer.put_u8(checksum);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::location::{DataStream, Link};

    fn digital_packet(did: u8, sdid: u8, payload: &[u8]) -> AncillaryPacket {
        let mut packet = AncillaryPacket::new();
        packet.set_did(did);
        packet.set_sdid(sdid);
        packet.set_coding(Coding::Digital);
        if !payload.is_empty() {
            packet.set_payload(payload).unwrap();
        }
        packet
    }

    #[test]
    fn parse_empty_buffer_is_null() {
        let (result, consumed) = parse(&[], 0, &PacketLocation::default());
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Null);
        assert_eq!(consumed, 0);
    }

    #[test]
    fn parse_bad_marker_consumes_nothing() {
        let buf = [0x01, 0, 0, 0, 0, 0, 0];
        let (result, consumed) = parse(&buf, buf.len(), &PacketLocation::default());
        assert_eq!(
            result.unwrap_err(),
            AncError::BadParam {
                expected: 0xFF,
                got: 0x01
            }
        );
        assert_eq!(consumed, 0);
    }

    #[test]
    fn parse_short_wrapper_consumes_all() {
        let buf = [0xFF, 0, 0, 0, 0, 0];
        let (result, consumed) = parse(&buf, 6, &PacketLocation::default());
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(consumed, 6);
    }

    #[test]
    fn parse_truncated_payload_consumes_all() {
        // DC says 5 payload bytes but only 2 are present.
        let buf = [0xFF, 0, 0, 0x61, 0x02, 0x05, 1, 2, 0xAA];
        let (result, consumed) = parse(&buf, buf.len(), &PacketLocation::default());
        assert_eq!(
            result.unwrap_err(),
            AncError::Range {
                field: Field::GumpPacket,
                got: 12,
                limit: 9
            }
        );
        assert_eq!(consumed, 9);
    }

    #[test]
    fn parse_max_bytes_is_clamped_to_buffer() {
        let buf = [0xFF, 0, 0, 0x61, 0x02, 0x01, 7];
        let (result, consumed) = parse(&buf, 1000, &PacketLocation::default());
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(consumed, 7);
    }

    #[test]
    fn parse_without_location_uses_default() {
        let buf = [0xFF, 0x00, 0x00, 0x61, 0x02, 0x05, 1, 2, 3, 4, 5, 0xAA];
        let default_location =
            PacketLocation::new(Link::B, DataStream::Ds2, Channel::C, Space::Hanc, 42).unwrap();
        let (result, consumed) = parse(&buf, buf.len(), &default_location);
        let packet = result.unwrap();

        assert_eq!(consumed, 12);
        assert_eq!(packet.did(), 0x61);
        assert_eq!(packet.sdid(), 0x02);
        assert_eq!(packet.dc(), 5);
        assert_eq!(packet.payload(), &[1, 2, 3, 4, 5]);
        assert_eq!(packet.checksum(), 0xAA);
        assert_eq!(*packet.location(), default_location);
        assert!(packet.is_valid());
    }

    #[test]
    fn parse_header_overrides_default_location() {
        // Valid, raw, luma, HANC, line 0x123 = (0x2 << 7) | 0x23
        let buf = [0xFF, 0x80 | 0x40 | 0x20 | 0x10 | 0x02, 0x23, 0x45, 0x01, 0x00, 0x46];
        let default_location =
            PacketLocation::new(Link::B, DataStream::Ds3, Channel::C, Space::Vanc, 9).unwrap();
        let packet = parse_vec(&buf, &default_location).unwrap();

        assert_eq!(packet.coding(), Coding::Raw);
        assert_eq!(packet.location().channel(), Channel::Y);
        assert_eq!(packet.location().space(), Space::Hanc);
        assert_eq!(packet.location().line(), 0x123);
        // Link and stream are not carried by the header.
        assert_eq!(packet.location().link(), Link::B);
        assert_eq!(packet.location().stream(), DataStream::Ds3);
        assert_eq!(packet.dc(), 0);
    }

    #[test]
    fn parse_bytes_advances_past_packet() {
        let mut data = Bytes::from_static(&[
            0xFF, 0x80, 0x09, 0x41, 0x01, 0x01, 0x10, 0x00, 0xFF, 0x80, 0x0A, 0x41, 0x02, 0x00,
            0x00,
        ]);
        let loc = PacketLocation::default();
        let first = parse_bytes(&mut data, &loc).unwrap();
        assert_eq!(first.location().line(), 9);
        assert_eq!(data.len(), 7);
        let second = parse_bytes(&mut data, &loc).unwrap();
        assert_eq!(second.sdid(), 0x02);
        assert!(data.is_empty());
    }

    #[test]
    fn header_bytes_encode_location() {
        let mut packet = digital_packet(0x61, 0x02, &[1]);
        packet.set_channel(Channel::Y);
        packet.set_space(Space::Vanc);
        packet.set_line(0x7FF).unwrap();
        assert_eq!(header_byte1(&packet), 0x80 | 0x20 | 0x0F);
        assert_eq!(header_byte2(&packet), 0x7F);

        packet.set_coding(Coding::Raw);
        packet.set_channel(Channel::C);
        packet.set_space(Space::Hanc);
        packet.set_line(21).unwrap();
        assert_eq!(header_byte1(&packet), 0x80 | 0x40 | 0x10);
        assert_eq!(header_byte2(&packet), 21);
    }

    #[test]
    fn generate_digital_recomputes_checksum() {
        let mut packet = digital_packet(0x61, 0x02, &[1, 2, 3, 4, 5]);
        packet.set_line(9).unwrap();
        packet.set_checksum(0x00);
        let mut out = [0u8; 64];
        let written = generate(&packet, &mut out).unwrap();

        assert_eq!(written, 12);
        assert_eq!(
            &out[..written],
            &[0xFF, 0xA0, 0x09, 0x61, 0x02, 0x05, 1, 2, 3, 4, 5, 0x77]
        );
    }

    #[test]
    fn generate_digital_truncates_to_255() {
        let payload: Vec<u8> = (0..300).map(|i| i as u8).collect();
        let packet = digital_packet(0x45, 0x01, &payload);
        assert_eq!(required_size(&packet).unwrap(), 262);

        let out = generate_vec(&packet).unwrap();
        assert_eq!(out.len(), 262);
        assert_eq!(out[GUMP_DC_OFFSET], 255);
        assert_eq!(&out[GUMP_PAYLOAD_OFFSET..GUMP_PAYLOAD_OFFSET + 255], &payload[..255]);
        assert_eq!(out[261], checksum8(0x45, 0x01, &payload[..255]));
    }

    #[test]
    fn generate_raw_splits_into_chunks() {
        let payload: Vec<u8> = (0..600).map(|i| (i % 251) as u8).collect();
        let mut packet = digital_packet(0x50, 0x60, &payload);
        packet.set_coding(Coding::Raw);
        packet.set_checksum(0x5A);

        let size = required_size(&packet).unwrap();
        assert_eq!(size, 262 + 262 + 97);
        let out = generate_vec(&packet).unwrap();

        let mut offset = 0;
        let mut reassembled = Vec::new();
        for expected_dc in [255usize, 255, 90] {
            assert_eq!(out[offset], 0xFF);
            assert_eq!(out[offset + GUMP_HEADER_BYTE1_OFFSET] & 0x40, 0x40);
            assert_eq!(out[offset + GUMP_DID_OFFSET], 0x50);
            assert_eq!(out[offset + GUMP_SDID_OFFSET], 0x60);
            assert_eq!(out[offset + GUMP_DC_OFFSET] as usize, expected_dc);
            let start = offset + GUMP_PAYLOAD_OFFSET;
            reassembled.extend_from_slice(&out[start..start + expected_dc]);
            assert_eq!(out[start + expected_dc], 0x5A);
            offset += expected_dc + GUMP_WRAPPER_SIZE;
        }
        assert_eq!(offset, size);
        assert_eq!(reassembled, payload);
    }

    #[test]
    fn raw_size_with_exact_multiple_of_chunk() {
        let mut packet = digital_packet(0x50, 0x60, &[0u8; 510]);
        packet.set_coding(Coding::Raw);
        assert_eq!(required_size(&packet).unwrap(), 2 * 262);
    }

    #[test]
    fn generate_empty_raw_fails() {
        let mut packet = AncillaryPacket::new();
        packet.set_coding(Coding::Raw);
        assert_eq!(required_size(&packet).unwrap(), 0);
        let mut out = [0u8; 16];
        assert_eq!(
            generate(&packet, &mut out).unwrap_err(),
            AncError::fail(FailReason::EmptyRawPayload)
        );
        assert_eq!(out, [0u8; 16]);
    }

    #[test]
    fn generate_unknown_coding_fails() {
        let mut packet = digital_packet(0x61, 0x02, &[1]);
        packet.set_coding(Coding::Unknown);
        assert_eq!(
            required_size(&packet).unwrap_err(),
            AncError::fail(FailReason::UnknownCoding)
        );
        let mut out = [0u8; 16];
        assert_eq!(generate(&packet, &mut out).unwrap_err().kind(), ErrorKind::Fail);
    }

    #[test]
    fn generate_into_small_buffer_writes_nothing() {
        let packet = digital_packet(0x61, 0x02, &[1, 2, 3]);
        let mut out = [0u8; 9];
        assert_eq!(
            generate(&packet, &mut out).unwrap_err(),
            AncError::fail(FailReason::OutputTooSmall {
                needed: 10,
                available: 9
            })
        );
        assert_eq!(out, [0u8; 9]);
    }

    #[test]
    fn generate_then_parse_preserves_fields() {
        let mut packet = digital_packet(0x41, 0x07, &[0xDE, 0xAD, 0xBE, 0xEF]);
        packet.set_space(Space::Hanc);
        packet.set_channel(Channel::C);
        packet.set_line(563).unwrap();
        let bytes = generate_vec(&packet).unwrap();

        let parsed = parse_vec(&bytes, &PacketLocation::default()).unwrap();
        assert_eq!(parsed.did(), 0x41);
        assert_eq!(parsed.sdid(), 0x07);
        assert_eq!(parsed.payload(), packet.payload());
        assert_eq!(parsed.location().line(), 563);
        assert_eq!(parsed.location().space(), Space::Hanc);
        assert_eq!(parsed.location().channel(), Channel::C);
        assert!(parsed.checksum_ok());
    }
}
