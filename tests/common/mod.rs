//! Common test utilities for ancstar integration tests.
//!
//! Builders for GUMP capture buffers and packets shared by the integration tests.

#![allow(dead_code)] // Not every test binary uses every helper

use ancstar::{AncillaryPacket, Channel, Coding, DidSdid, Space};

/// Marker byte that starts every GUMP packet.
pub const MARKER: u8 = 0xFF;

/// Header byte 1 flag: the header carries a location.
pub const LOCATION_VALID: u8 = 0x80;

/// Installs a `tracing` subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Encodes one GUMP packet by hand, independently of the library's generator.
///
/// # Parameters
/// - `raw`: Set the raw coding bit.
/// - `luma`: Set the luma channel bit.
/// - `hanc`: Set the HANC space bit.
/// - `line`: 11-bit line number.
/// - `did`, `sdid`: Packet identifiers.
/// - `payload`: At most 255 bytes.
/// - `checksum`: Byte written after the payload.
///
/// # Returns
/// The encoded packet bytes.
#[allow(clippy::too_many_arguments)]
pub fn gump_bytes(
    raw: bool,
    luma: bool,
    hanc: bool,
    line: u16,
    did: u8,
    sdid: u8,
    payload: &[u8],
    checksum: u8,
) -> Vec<u8> {
    assert!(payload.len() <= 255, "test helper only encodes single packets");
    let mut header1 = LOCATION_VALID | ((line >> 7) as u8 & 0x0F);
    if raw {
        header1 |= 0x40;
    }
    if luma {
        header1 |= 0x20;
    }
    if hanc {
        header1 |= 0x10;
    }
    let mut bytes = vec![MARKER, header1, (line & 0x7F) as u8, did, sdid, payload.len() as u8];
    bytes.extend_from_slice(payload);
    bytes.push(checksum);
    bytes
}

/// Encodes a digital luma VANC packet with a correct 8-bit checksum.
pub fn digital_gump(line: u16, did: u8, sdid: u8, payload: &[u8]) -> Vec<u8> {
    let checksum = ancstar::checksum::checksum8(did, sdid, payload);
    gump_bytes(false, true, false, line, did, sdid, payload, checksum)
}

/// Creates a packet with the given coding, identifiers, line and payload.
pub fn create_test_packet(
    coding: Coding,
    ids: DidSdid,
    line: u16,
    payload: &[u8],
) -> AncillaryPacket {
    let mut packet = AncillaryPacket::with_did_sdid(ids);
    packet.set_coding(coding);
    packet.set_channel(Channel::Y);
    packet.set_space(Space::Vanc);
    packet.set_line(line).expect("test line in range");
    if !payload.is_empty() {
        packet.set_payload(payload).expect("test payload allocation");
    }
    packet
}

/// Deterministic pseudo-random payload of `len` bytes.
pub fn patterned_payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}
