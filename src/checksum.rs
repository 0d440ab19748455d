//! SMPTE-291 checksum and parity utilities.
//!
//! Two checksums are provided. [`checksum8`] is the 8-bit sum the GUMP wrapper
//! carries; it is an approximation used for round-trip bookkeeping and is never
//! used to reject a payload. [`checksum9`] is the true SMPTE-291 checksum word
//! that hardware computes over the parity-encoded DID, SDID, DC and user data words.

use crate::constants::{WORD_BIT8, WORD_BIT9, WORD_CHECKSUM_MASK};

/// Calculates the 8-bit (mod-256) sum of `did + sdid + payload.len() + sum(payload)`.
///
/// The length term is the payload length truncated to 8 bits, matching a DC byte.
///
/// # Parameters
/// - `did`: Data ID.
/// - `sdid`: Secondary Data ID.
/// - `payload`: User data bytes.
///
/// # Returns
/// The 8-bit sum.
pub fn checksum8(did: u8, sdid: u8, payload: &[u8]) -> u8 {
    let header = did
        .wrapping_add(sdid)
        .wrapping_add(payload.len() as u8);
    payload
        .iter()
        .fold(header, |sum, &byte| sum.wrapping_add(byte))
}

/// Encodes a data byte as a 10-bit word with even parity in bit 8 and its inverse in bit 9.
#[inline]
pub fn add_even_parity(byte: u8) -> u16 {
    let mut word = byte as u16;
    if byte.count_ones() % 2 == 1 {
        word |= WORD_BIT8;
    }
    if word & WORD_BIT8 == 0 {
        word |= WORD_BIT9;
    }
    word
}

/// Calculates the SMPTE-291 checksum word.
///
/// The 9 least significant bits are the sum of the 9 LSBs of the parity-encoded
/// DID, SDID, DC and user data words; bit 9 is the inverse of bit 8.
///
/// # Parameters
/// - `did`: Data ID.
/// - `sdid`: Secondary Data ID.
/// - `payload`: User data bytes (DC is `payload.len()` truncated to 8 bits).
///
/// # Returns
/// The 10-bit checksum word.
pub fn checksum9(did: u8, sdid: u8, payload: &[u8]) -> u16 {
    let words = [did, sdid, payload.len() as u8]
        .into_iter()
        .chain(payload.iter().copied())
        .map(add_even_parity);
    let mut sum = words.fold(0u16, |sum, word| {
        sum.wrapping_add(word & WORD_CHECKSUM_MASK) & WORD_CHECKSUM_MASK
    });
    if sum & WORD_BIT8 == 0 {
        sum |= WORD_BIT9;
    }
    sum
}
