//! SMPTE-334 word stream conversion.
//!
//! Each word carries one byte in bits 7..0 with even parity in bit 8 and its
//! inverse in bit 9. A packet is laid out as
//! `{0x000, 0x3FF, 0x3FF, DID, SDID, DC, payload[0..DC], checksum}`.

use tracing::debug;

use crate::checksum::{add_even_parity, checksum8};
use crate::constants::{
    MAX_DATA_COUNT, SMPTE334_ADF, SMPTE334_DC_INDEX, SMPTE334_DID_INDEX, SMPTE334_PAYLOAD_INDEX,
    SMPTE334_SDID_INDEX, SMPTE334_WRAPPER_WORDS, WORD_DATA_MASK,
};
use crate::error::{AncError, Field};
use crate::location::PacketLocation;
use crate::packet::AncillaryPacket;
use crate::types::Coding;

#[inline]
fn low_byte(word: u16) -> u8 {
    (word & WORD_DATA_MASK) as u8
}

/// Builds a digital packet from a SMPTE-334 word sequence.
///
/// Parity bits are stripped; the checksum word is copied, not verified.
///
/// # Parameters
/// - `words`: The packet words, starting at the ancillary data flag.
/// - `location`: Location assigned to the packet.
///
/// # Errors
/// - [`AncError::Null`] - `words` is empty
/// - [`AncError::Range`] - fewer than 7 words, more words than DC announces, or too
///   few words to hold the announced payload and checksum
/// - [`AncError::Memory`] - payload allocation failed
pub fn from_words(words: &[u16], location: &PacketLocation) -> Result<AncillaryPacket, AncError> {
    if words.is_empty() {
        return Err(AncError::Null {
            field: Field::WordBuffer,
        });
    }
    if words.len() < SMPTE334_WRAPPER_WORDS {
        return Err(AncError::range(
            Field::WordBuffer,
            words.len(),
            SMPTE334_WRAPPER_WORDS,
        ));
    }

    let dc = low_byte(words[SMPTE334_DC_INDEX]) as usize;
    let extra_words = words.len() - SMPTE334_WRAPPER_WORDS;
    if extra_words > dc {
        return Err(AncError::range(Field::WordBuffer, extra_words, dc));
    }
    let packet_words = dc + SMPTE334_WRAPPER_WORDS;
    if words.len() < packet_words {
        return Err(AncError::range(
            Field::WordPayload,
            packet_words,
            words.len(),
        ));
    }

    let mut packet = AncillaryPacket::new();
    if dc > 0 {
        let mut payload = Vec::new();
        payload
            .try_reserve_exact(dc)
            .map_err(|_| AncError::Memory {
                field: Field::PayloadData,
                requested: dc,
            })?;
        payload.extend(
            words[SMPTE334_PAYLOAD_INDEX..SMPTE334_PAYLOAD_INDEX + dc]
                .iter()
                .map(|&word| low_byte(word)),
        );
        packet.set_payload(&payload)?;
    }
    packet.set_coding(Coding::Digital);
    packet.set_location(*location);
    packet.set_checksum(low_byte(words[SMPTE334_PAYLOAD_INDEX + dc]));
    packet.set_did(low_byte(words[SMPTE334_DID_INDEX]));
    packet.set_sdid(low_byte(words[SMPTE334_SDID_INDEX]));
    packet.set_valid(true);
    Ok(packet)
}

/// Appends the SMPTE-334 words for a digital packet to `out`.
///
/// A payload longer than 255 bytes is truncated, and the checksum word is computed
/// over the emitted bytes. Packets that are not digitally coded append nothing.
///
/// # Errors
/// - [`AncError::Memory`] - growing `out` failed; `out` keeps its original length
pub fn to_words(packet: &AncillaryPacket, out: &mut Vec<u16>) -> Result<(), AncError> {
    if packet.coding() != Coding::Digital {
        debug!(coding = %packet.coding(), "Skipping non-digital packet for SMPTE-334 output");
        return Ok(());
    }

    let payload = packet.payload();
    let dc = payload.len().min(MAX_DATA_COUNT);
    let wire_payload = &payload[..dc];
    let did = packet.did().value();
    let sdid = packet.sdid().value();

    reserve_words(out, dc + SMPTE334_WRAPPER_WORDS)?;
    out.extend_from_slice(&SMPTE334_ADF);
    out.push(add_even_parity(did));
    out.push(add_even_parity(sdid));
    out.push(add_even_parity(dc as u8));
    out.extend(wire_payload.iter().map(|&byte| add_even_parity(byte)));
    out.push(add_even_parity(checksum8(did, sdid, wire_payload)));
    Ok(())
}

/// Appends the packet's payload bytes to `out` as 16-bit words, optionally with parity.
///
/// # Errors
/// - [`AncError::Memory`] - growing `out` failed; `out` keeps its original length
pub fn payload_words(
    packet: &AncillaryPacket,
    out: &mut Vec<u16>,
    add_parity: bool,
) -> Result<(), AncError> {
    let payload = packet.payload();
    reserve_words(out, payload.len())?;
    if add_parity {
        out.extend(payload.iter().map(|&byte| add_even_parity(byte)));
    } else {
        out.extend(payload.iter().map(|&byte| byte as u16));
    }
    Ok(())
}

// Reserves up front so a failed append never leaves a partial packet in `out`.
fn reserve_words(out: &mut Vec<u16>, additional: usize) -> Result<(), AncError> {
    out.try_reserve_exact(additional)
        .map_err(|_| AncError::Memory {
            field: Field::WordBuffer,
            requested: additional,
        })
}
