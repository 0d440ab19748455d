//! The ancillary packet facade.
//!
//! [`AncillaryPacket`] owns the identifiers, coding, location and payload of one
//! SMPTE-291 packet and delegates wire transforms to [`crate::serialization`].

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::checksum;
use crate::error::AncError;
use crate::location::{Channel, DataStream, HorizOffset, Link, PacketLocation, Space};
use crate::payload::PayloadBuffer;
use crate::serialization::{gump, smpte334};
use crate::types::{Coding, DataId, DidSdid, SecondaryId};

/// One SMPTE-291 ancillary data packet.
///
/// The stored checksum is whatever was last received or set; it is reported, never
/// used to reject a payload. Equality compares identifiers, checksum, coding,
/// location and payload; the receive-validity flag is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AncillaryPacket {
    did: DataId,
    sdid: SecondaryId,
    checksum: u8,
    coding: Coding,
    location: PacketLocation,
    payload: PayloadBuffer,
    valid: bool,
}

impl AncillaryPacket {
    /// Creates an empty digital packet with DID/SDID 0 and the default location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty digital packet of the given type.
    pub fn with_did_sdid(ids: DidSdid) -> Self {
        Self {
            did: ids.did,
            sdid: ids.sdid,
            ..Self::default()
        }
    }

    /// Parses one GUMP packet. See [`gump::parse`].
    pub fn from_gump(
        buf: &[u8],
        max_bytes: usize,
        default_location: &PacketLocation,
    ) -> (Result<Self, AncError>, usize) {
        gump::parse(buf, max_bytes, default_location)
    }

    /// Builds a packet from SMPTE-334 words. See [`smpte334::from_words`].
    pub fn from_words(words: &[u16], location: &PacketLocation) -> Result<Self, AncError> {
        smpte334::from_words(words, location)
    }

    /// Resets every field to its default and frees the payload.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Data ID.
    pub fn did(&self) -> DataId {
        self.did
    }

    /// Sets the Data ID.
    pub fn set_did(&mut self, did: u8) {
        self.did = DataId::new(did);
    }

    /// Secondary Data ID.
    pub fn sdid(&self) -> SecondaryId {
        self.sdid
    }

    /// Sets the Secondary Data ID.
    pub fn set_sdid(&mut self, sdid: u8) {
        self.sdid = SecondaryId::new(sdid);
    }

    /// The DID/SDID pair identifying the packet type.
    pub fn did_sdid(&self) -> DidSdid {
        DidSdid {
            did: self.did,
            sdid: self.sdid,
        }
    }

    /// Sets both identifiers.
    pub fn set_did_sdid(&mut self, ids: DidSdid) {
        self.did = ids.did;
        self.sdid = ids.sdid;
    }

    /// Data count: the current payload length, which may exceed 255 for raw packets.
    pub fn dc(&self) -> usize {
        self.payload.len()
    }

    /// The stored 8-bit checksum.
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Stores `checksum` as-is; see [`AncillaryPacket::update_checksum`].
    pub fn set_checksum(&mut self, checksum: u8) {
        self.checksum = checksum;
    }

    /// Computes the 8-bit checksum of the current DID, SDID and payload.
    pub fn checksum8(&self) -> u8 {
        checksum::checksum8(self.did.value(), self.sdid.value(), self.payload.as_slice())
    }

    /// Computes the SMPTE-291 9-bit checksum word of the current DID, SDID and payload.
    pub fn checksum9(&self) -> u16 {
        checksum::checksum9(self.did.value(), self.sdid.value(), self.payload.as_slice())
    }

    /// Recomputes and stores the 8-bit checksum, returning the new value.
    pub fn update_checksum(&mut self) -> u8 {
        self.checksum = self.checksum8();
        self.checksum
    }

    /// True if the stored checksum matches a freshly computed one.
    pub fn checksum_ok(&self) -> bool {
        self.checksum == self.checksum8()
    }

    /// Digital, raw or unknown coding.
    pub fn coding(&self) -> Coding {
        self.coding
    }

    /// Sets the coding.
    pub fn set_coding(&mut self, coding: Coding) {
        self.coding = coding;
    }

    /// Raster location of the packet.
    pub fn location(&self) -> &PacketLocation {
        &self.location
    }

    /// Replaces the whole location.
    pub fn set_location(&mut self, location: PacketLocation) {
        self.location = location;
    }

    /// Sets the location's SDI link.
    pub fn set_link(&mut self, link: Link) {
        self.location.set_link(link);
    }

    /// Sets the location's data stream.
    pub fn set_stream(&mut self, stream: DataStream) {
        self.location.set_stream(stream);
    }

    /// Sets the location's luma/chroma channel.
    pub fn set_channel(&mut self, channel: Channel) {
        self.location.set_channel(channel);
    }

    /// Sets the location's VANC/HANC space.
    pub fn set_space(&mut self, space: Space) {
        self.location.set_space(space);
    }

    /// Sets the location's line number.
    ///
    /// # Errors
    /// - [`AncError::Range`] - `line` exceeds 0x7FF
    pub fn set_line(&mut self, line: u16) -> Result<(), AncError> {
        self.location.set_line(line).map(|_| ())
    }

    /// Sets the location's horizontal offset.
    ///
    /// # Errors
    /// - [`AncError::Range`] - an explicit offset collides with the reserved sentinels
    pub fn set_horiz_offset(&mut self, offset: HorizOffset) -> Result<(), AncError> {
        self.location.set_horiz_offset(offset).map(|_| ())
    }

    /// True once a parse has populated this packet.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// Payload bytes; the length is [`AncillaryPacket::dc`].
    pub fn payload(&self) -> &[u8] {
        self.payload.as_slice()
    }

    /// The underlying payload storage.
    pub fn payload_buffer(&self) -> &PayloadBuffer {
        &self.payload
    }

    /// Replaces the payload with a copy of `data`.
    ///
    /// # Errors
    /// - [`AncError::Null`] - `data` is empty
    /// - [`AncError::Memory`] - allocation failed; the payload is left empty
    pub fn set_payload(&mut self, data: &[u8]) -> Result<(), AncError> {
        self.payload.set(data)
    }

    /// Appends a copy of `data` to the payload.
    ///
    /// # Errors
    /// - [`AncError::Null`] - `data` is empty
    /// - [`AncError::Memory`] - allocation failed; the payload is unchanged
    pub fn append_payload(&mut self, data: &[u8]) -> Result<(), AncError> {
        self.payload.append(data)
    }

    /// Appends another packet's payload to this one. An empty source is a no-op.
    ///
    /// # Errors
    /// - [`AncError::Memory`] - allocation failed; the payload is unchanged
    pub fn append_payload_from(&mut self, other: &AncillaryPacket) -> Result<(), AncError> {
        if other.payload.is_empty() {
            return Ok(());
        }
        self.payload.append(other.payload.as_slice())
    }

    /// Resizes the payload to `len` zero bytes.
    ///
    /// # Errors
    /// - [`AncError::Memory`] - allocation failed; the payload is left empty
    pub fn allocate_payload(&mut self, len: usize) -> Result<(), AncError> {
        self.payload.allocate(len)
    }

    /// Empties the payload.
    pub fn clear_payload(&mut self) {
        self.payload.clear();
    }

    /// Payload byte at `index`, or `0` when out of bounds.
    pub fn payload_byte_at(&self, index: usize) -> u8 {
        self.payload.byte_at(index)
    }

    /// Overwrites one payload byte.
    ///
    /// # Errors
    /// - [`AncError::Range`] - `index >= dc()`
    pub fn set_payload_byte_at(&mut self, value: u8, index: usize) -> Result<(), AncError> {
        self.payload.set_byte_at(value, index)
    }

    /// Copies the first `out.len()` payload bytes into `out`.
    ///
    /// # Errors
    /// - [`AncError::Range`] - `out` is longer than the payload
    pub fn copy_payload_to(&self, out: &mut [u8]) -> Result<(), AncError> {
        self.payload.copy_to(out)
    }

    /// Appends the payload as 16-bit words. See [`smpte334::payload_words`].
    pub fn payload_words(&self, out: &mut Vec<u16>, add_parity: bool) -> Result<(), AncError> {
        smpte334::payload_words(self, out, add_parity)
    }

    /// Bytes needed by [`AncillaryPacket::generate_gump`]. See [`gump::required_size`].
    pub fn gump_size(&self) -> Result<usize, AncError> {
        gump::required_size(self)
    }

    /// Serializes into `out` as GUMP. See [`gump::generate`].
    pub fn generate_gump(&self, out: &mut [u8]) -> Result<usize, AncError> {
        gump::generate(self, out)
    }

    /// Appends SMPTE-334 words to `out`. See [`smpte334::to_words`].
    pub fn to_words(&self, out: &mut Vec<u16>) -> Result<(), AncError> {
        smpte334::to_words(self, out)
    }

    /// Compares two packets, optionally ignoring location and checksum.
    pub fn compare(&self, other: &Self, ignore_location: bool, ignore_checksum: bool) -> bool {
        self.compare_with_info(other, ignore_location, ignore_checksum)
            .is_none()
    }

    /// Like [`AncillaryPacket::compare`], but describes every difference found.
    ///
    /// # Returns
    /// `None` if the packets match, otherwise a `"; "`-separated list of differences.
    pub fn compare_with_info(
        &self,
        other: &Self,
        ignore_location: bool,
        ignore_checksum: bool,
    ) -> Option<String> {
        let mut diffs = Vec::new();
        if self.did != other.did {
            diffs.push(format!("DID mismatch: {} vs {}", self.did, other.did));
        }
        if self.sdid != other.sdid {
            diffs.push(format!("SDID mismatch: {} vs {}", self.sdid, other.sdid));
        }
        if self.coding != other.coding {
            diffs.push(format!("coding mismatch: {} vs {}", self.coding, other.coding));
        }
        if !ignore_checksum && self.checksum != other.checksum {
            diffs.push(format!(
                "checksum mismatch: 0x{:02X} vs 0x{:02X}",
                self.checksum, other.checksum
            ));
        }
        if !ignore_location && self.location != other.location {
            diffs.push(format!(
                "location mismatch: {} vs {}",
                self.location, other.location
            ));
        }
        if self.dc() != other.dc() {
            diffs.push(format!("DC mismatch: {} vs {}", self.dc(), other.dc()));
        } else if let Some(index) = self
            .payload()
            .iter()
            .zip(other.payload())
            .position(|(a, b)| a != b)
        {
            diffs.push(format!("payload mismatch at byte {index}"));
        }

        if diffs.is_empty() {
            None
        } else {
            Some(diffs.join("; "))
        }
    }
}

impl PartialEq for AncillaryPacket {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other, false, false)
    }
}

impl Eq for AncillaryPacket {}

/// One-line summary, e.g. `[Digital|A|DS1|Y|VANC|L9|DID/SDID 0x61/0x02]`.
///
/// The alternate form (`{:#}`) appends the payload length and a hex dump.
impl fmt::Display for AncillaryPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}|{}|{}]",
            self.coding,
            self.location,
            self.did_sdid()
        )?;
        if f.alternate() && !self.payload.is_empty() {
            let mut hex = String::with_capacity(self.dc() * 2);
            for byte in self.payload() {
                let _ = write!(hex, "{byte:02X}");
            }
            write!(f, " {} bytes: {}", self.dc(), hex)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn caption_packet() -> AncillaryPacket {
        let mut packet = AncillaryPacket::with_did_sdid(DidSdid::new(0x61, 0x02));
        packet.set_payload(&[0x89, 0x94, 0x2C]).unwrap();
        packet.set_line(9).unwrap();
        packet.update_checksum();
        packet
    }

    #[test]
    fn new_packet_is_empty_digital() {
        let packet = AncillaryPacket::new();
        assert_eq!(packet.did(), 0);
        assert_eq!(packet.sdid(), 0);
        assert_eq!(packet.dc(), 0);
        assert_eq!(packet.coding(), Coding::Digital);
        assert!(!packet.is_valid());
        assert_eq!(packet.checksum(), 0);
    }

    #[test]
    fn set_payload_byte_at_dc_is_range() {
        let mut packet = caption_packet();
        let dc = packet.dc();
        assert_eq!(
            packet.set_payload_byte_at(0xFF, dc).unwrap_err().kind(),
            ErrorKind::Range
        );
        packet.set_payload_byte_at(0x80, dc - 1).unwrap();
        assert_eq!(packet.payload_byte_at(dc - 1), 0x80);
        assert_eq!(packet.payload_byte_at(dc), 0);
    }

    #[test]
    fn checksum_ok_tracks_payload_edits() {
        let mut packet = caption_packet();
        assert!(packet.checksum_ok());
        packet.set_payload_byte_at(0x00, 0).unwrap();
        assert!(!packet.checksum_ok());
        packet.update_checksum();
        assert!(packet.checksum_ok());
    }

    #[test]
    fn append_payload_from_concatenates() {
        let mut first = caption_packet();
        let mut second = AncillaryPacket::new();
        second.set_payload(&[0xAA, 0xBB]).unwrap();
        first.append_payload_from(&second).unwrap();
        assert_eq!(first.payload(), &[0x89, 0x94, 0x2C, 0xAA, 0xBB]);

        first.append_payload_from(&AncillaryPacket::new()).unwrap();
        assert_eq!(first.dc(), 5);
    }

    #[test]
    fn compare_respects_ignore_flags() {
        let a = caption_packet();
        let mut b = a.clone();
        b.set_checksum(a.checksum().wrapping_add(1));
        b.set_line(10).unwrap();

        assert!(!a.compare(&b, false, false));
        assert!(!a.compare(&b, true, false));
        assert!(!a.compare(&b, false, true));
        assert!(a.compare(&b, true, true));

        let info = a.compare_with_info(&b, false, false).unwrap();
        assert!(info.contains("checksum mismatch"));
        assert!(info.contains("location mismatch"));
    }

    #[test]
    fn compare_reports_first_payload_difference() {
        let a = caption_packet();
        let mut b = a.clone();
        b.set_payload_byte_at(0x00, 2).unwrap();
        let info = a.compare_with_info(&b, true, true).unwrap();
        assert_eq!(info, "payload mismatch at byte 2");
    }

    #[test]
    fn equality_ignores_valid_flag() {
        let a = caption_packet();
        let mut b = a.clone();
        b.set_valid(true);
        assert_eq!(a, b);
    }

    #[test]
    fn clear_resets_everything() {
        let mut packet = caption_packet();
        packet.set_coding(Coding::Raw);
        packet.clear();
        assert_eq!(packet, AncillaryPacket::new());
        assert!(packet.payload().is_empty());
    }

    #[test]
    fn display_summary() {
        let packet = caption_packet();
        assert_eq!(
            format!("{}", packet),
            "[Digital|A|DS1|Y|VANC|L9|DID/SDID 0x61/0x02]"
        );
        assert_eq!(
            format!("{:#}", packet),
            "[Digital|A|DS1|Y|VANC|L9|DID/SDID 0x61/0x02] 3 bytes: 89942C"
        );
    }

    #[test]
    fn copy_payload_to_caller_buffer() {
        let packet = caption_packet();
        let mut out = [0u8; 3];
        packet.copy_payload_to(&mut out).unwrap();
        assert_eq!(out, [0x89, 0x94, 0x2C]);
    }

    #[test]
    fn packet_serde_roundtrip() {
        let packet = caption_packet();
        let json = serde_json::to_string(&packet).unwrap();
        let back: AncillaryPacket = serde_json::from_str(&json).unwrap();
        assert_eq!(packet, back);
        assert_eq!(back.payload(), packet.payload());
    }

    #[test]
    fn deserialize_rejects_out_of_range_line() {
        let packet = caption_packet();
        let mut value = serde_json::to_value(&packet).unwrap();
        value["location"]["line"] = serde_json::json!(2069);
        assert!(serde_json::from_value::<AncillaryPacket>(value.clone()).is_err());

        value["location"]["line"] = serde_json::json!(21);
        let back: AncillaryPacket = serde_json::from_value(value).unwrap();
        assert_eq!(back.location().line(), 21);
    }

    #[test]
    fn gump_and_word_helpers_delegate() {
        let packet = caption_packet();
        assert_eq!(packet.gump_size().unwrap(), 10);
        let mut out = [0u8; 10];
        assert_eq!(packet.generate_gump(&mut out).unwrap(), 10);

        let mut words = Vec::new();
        packet.to_words(&mut words).unwrap();
        let back = AncillaryPacket::from_words(&words, packet.location()).unwrap();
        assert_eq!(back, packet);
    }
}
