//! Fuzz testing harnesses for ancstar components.
//!
//! Each harness feeds arbitrary bytes into a decoder and asserts the invariants
//! that must hold for any input: no panic, consumed counts within bounds, and
//! successful parses that regenerate to equivalent packets.

use crate::list::AncillaryList;
use crate::location::PacketLocation;
use crate::packet::AncillaryPacket;
use crate::registry::DecoderRegistry;
use crate::serialization::gump;

/// Fuzz tests the GUMP parser.
///
/// # Parameters
/// - `data`: Fuzzer-generated input treated as a capture buffer
pub fn gump_parse_harness(data: &[u8]) {
    let location = PacketLocation::default();
    let (result, consumed) = gump::parse(data, data.len(), &location);
    assert!(consumed <= data.len(), "consumed past end of input");

    if let Ok(packet) = result {
        assert_eq!(consumed, packet.dc() + 7);
        let regenerated = match gump::generate_vec(&packet) {
            Ok(bytes) => bytes,
            // Raw packets with an empty payload have no wire form.
            Err(_) => return,
        };
        let (reparsed, _) = gump::parse(&regenerated, regenerated.len(), &location);
        if let Ok(reparsed) = reparsed {
            assert_eq!(reparsed.payload(), packet.payload());
            assert_eq!(reparsed.did_sdid(), packet.did_sdid());
        }
    }
}

/// Fuzz tests whole-buffer scanning and payload interpretation.
///
/// # Parameters
/// - `data`: Fuzzer-generated input treated as a capture buffer
pub fn list_scan_harness(data: &[u8]) {
    let mut list = AncillaryList::new();
    let registry = DecoderRegistry::with_default_decoders();
    if let Ok(added) = list.add_received_gump(data, &PacketLocation::default()) {
        assert_eq!(added, list.len());
        let _ = list.interpret_all(&registry);
        let _ = list.transmit_size(false, 264);
    }
}

/// Fuzz tests the SMPTE-334 word adapter with input bytes paired into 10-bit words.
///
/// # Parameters
/// - `data`: Fuzzer-generated input, two bytes per word
pub fn words_harness(data: &[u8]) {
    let words: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]) & 0x3FF)
        .collect();
    if let Ok(packet) = AncillaryPacket::from_words(&words, &PacketLocation::default()) {
        let mut out = Vec::new();
        if packet.to_words(&mut out).is_ok() {
            assert_eq!(out.len(), packet.dc() + 7);
        }
    }
}
