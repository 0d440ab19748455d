//! CEA-608 closed captions in VANC (DID 0x61, SDID 0x02).
//!
//! The 3-byte payload is `[field << 7 | line_offset, char1, char2]`, where the
//! 5-bit line offset counts from line 9 (0) to line 40 (31).

use serde::{Deserialize, Serialize};

use crate::decoders::SpecificPacket;
use crate::error::{AncError, FailReason, Field};
use crate::packet::AncillaryPacket;
use crate::traits::PayloadDecoder;
use crate::types::{Coding, DidSdid};

/// DID/SDID of CEA-608 VANC packets.
pub const CEA608_VANC_DID_SDID: DidSdid = DidSdid::new(0x61, 0x02);

/// Payload length of CEA-608 VANC packets.
pub const CEA608_VANC_PAYLOAD_SIZE: usize = 3;

const FIELD_BIT: u8 = 0x80;
const LINE_OFFSET_MASK: u8 = 0x1F;
const FIRST_LINE: u16 = 9;
// Line 21, the usual caption line in 525i.
const DEFAULT_LINE_OFFSET: u8 = 12;

/// Which interlaced field the caption bytes belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CaptionField {
    #[default]
    F1,
    F2,
}

/// One decoded CEA-608 caption byte pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cea608Vanc {
    field: CaptionField,
    line_offset: u8,
    char1: u8,
    char2: u8,
}

impl Default for Cea608Vanc {
    fn default() -> Self {
        Self {
            field: CaptionField::F1,
            line_offset: DEFAULT_LINE_OFFSET,
            char1: 0,
            char2: 0,
        }
    }
}

impl Cea608Vanc {
    /// Creates a caption pair.
    ///
    /// # Errors
    /// - [`AncError::Range`] - `line_offset` exceeds 31
    pub fn new(
        field: CaptionField,
        line_offset: u8,
        char1: u8,
        char2: u8,
    ) -> Result<Self, AncError> {
        if line_offset > LINE_OFFSET_MASK {
            return Err(AncError::range(
                Field::LineNumber,
                line_offset as usize,
                LINE_OFFSET_MASK as usize,
            ));
        }
        Ok(Self {
            field,
            line_offset,
            char1,
            char2,
        })
    }

    /// Decodes a caption pair from a payload of at least 3 bytes.
    ///
    /// # Errors
    /// - [`AncError::Range`] - `payload` is shorter than 3 bytes
    pub fn from_payload(payload: &[u8]) -> Result<Self, AncError> {
        let Some(&[header, char1, char2]) = payload.get(..CEA608_VANC_PAYLOAD_SIZE) else {
            return Err(AncError::range(
                Field::PayloadData,
                payload.len(),
                CEA608_VANC_PAYLOAD_SIZE,
            ));
        };
        let field = if header & FIELD_BIT != 0 {
            CaptionField::F2
        } else {
            CaptionField::F1
        };
        Ok(Self {
            field,
            line_offset: header & LINE_OFFSET_MASK,
            char1,
            char2,
        })
    }

    /// Field the caption pair belongs to.
    pub fn field(&self) -> CaptionField {
        self.field
    }

    /// Line offset from line 9, 0..=31.
    pub fn line_offset(&self) -> u8 {
        self.line_offset
    }

    /// SMPTE line number the captions were encoded on.
    pub fn line(&self) -> u16 {
        FIRST_LINE + self.line_offset as u16
    }

    /// The two caption characters, parity bits included.
    pub fn chars(&self) -> (u8, u8) {
        (self.char1, self.char2)
    }

    /// The 3 payload bytes of this caption pair.
    pub fn payload(&self) -> [u8; CEA608_VANC_PAYLOAD_SIZE] {
        let field_bit = match self.field {
            CaptionField::F1 => 0,
            CaptionField::F2 => FIELD_BIT,
        };
        [field_bit | self.line_offset, self.char1, self.char2]
    }

    /// Builds a digital packet carrying this caption pair, with a computed checksum.
    ///
    /// The packet takes the default location; callers set the VANC line.
    ///
    /// # Errors
    /// - [`AncError::Memory`] - payload allocation failed
    pub fn to_packet(&self) -> Result<AncillaryPacket, AncError> {
        let mut packet = AncillaryPacket::with_did_sdid(CEA608_VANC_DID_SDID);
        packet.set_coding(Coding::Digital);
        packet.set_payload(&self.payload())?;
        packet.update_checksum();
        Ok(packet)
    }
}

/// Decoder for [`Cea608Vanc`] packets.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cea608VancDecoder;

impl PayloadDecoder for Cea608VancDecoder {
    fn did_sdid(&self) -> DidSdid {
        CEA608_VANC_DID_SDID
    }

    fn name(&self) -> &'static str {
        "CEA-608 (VANC)"
    }

    fn recognize(&self, packet: &AncillaryPacket) -> bool {
        packet.coding() == Coding::Digital
            && packet.did_sdid() == CEA608_VANC_DID_SDID
            && packet.dc() == CEA608_VANC_PAYLOAD_SIZE
    }

    fn interpret(&self, packet: &AncillaryPacket) -> Result<SpecificPacket, AncError> {
        if !self.recognize(packet) {
            return Err(AncError::fail(FailReason::Unrecognized));
        }
        Cea608Vanc::from_payload(packet.payload()).map(SpecificPacket::Cea608Vanc)
    }
}
