//! Ordered collections of ancillary packets.
//!
//! An [`AncillaryList`] is what one video frame's worth of ancillary data looks
//! like: it is filled by scanning a whole GUMP capture buffer (or from SMPTE-334
//! word packets) and can regenerate the per-field GUMP buffers playout hardware
//! expects.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::constants::{SMPTE334_ADF, SMPTE334_WRAPPER_WORDS};
use crate::decoders::SpecificPacket;
use crate::error::{AncError, ErrorKind, FailReason, Field};
use crate::location::{Channel, DataStream, Link, PacketLocation, Space};
use crate::packet::AncillaryPacket;
use crate::registry::DecoderRegistry;
use crate::serialization::gump;
use crate::types::{Coding, DidSdid};

/// An ordered list of ancillary packets.
///
/// Raw packets have no meaningful DID/SDID, so the list also keeps an analog type
/// map from line number to the packet type that line is expected to carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncillaryList {
    packets: Vec<AncillaryPacket>,
    analog_types: BTreeMap<u16, DidSdid>,
}

/// True if `next` continues the raw packet `prev`: both raw and from the same place.
fn is_raw_continuation(prev: &AncillaryPacket, next: &AncillaryPacket) -> bool {
    let (a, b) = (prev.location(), next.location());
    prev.coding() == Coding::Raw
        && next.coding() == Coding::Raw
        && a.line() == b.line()
        && a.space() == b.space()
        && a.link() == b.link()
        && a.stream() == b.stream()
        && a.channel() == b.channel()
}

impl AncillaryList {
    /// Creates an empty list with no analog line classification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of packets in the list.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// True if the list holds no packets.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Removes every packet. The analog type map is kept.
    pub fn clear(&mut self) {
        self.packets.clear();
    }

    /// Packet at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&AncillaryPacket> {
        self.packets.get(index)
    }

    /// Iterates the packets in list order.
    pub fn iter(&self) -> std::slice::Iter<'_, AncillaryPacket> {
        self.packets.iter()
    }

    /// Appends a packet to the end of the list.
    pub fn push(&mut self, packet: AncillaryPacket) {
        self.packets.push(packet);
    }

    /// Removes and returns the packet at `index`.
    pub fn remove(&mut self, index: usize) -> Option<AncillaryPacket> {
        (index < self.packets.len()).then(|| self.packets.remove(index))
    }

    /// Counts packets matching `did` and `sdid`; `None` matches any value.
    pub fn count_with_ids(&self, did: Option<u8>, sdid: Option<u8>) -> usize {
        self.with_ids(did, sdid).count()
    }

    /// Returns the `index`-th packet matching `did` and `sdid`; `None` matches any value.
    pub fn packet_with_ids(
        &self,
        did: Option<u8>,
        sdid: Option<u8>,
        index: usize,
    ) -> Option<&AncillaryPacket> {
        self.with_ids(did, sdid).nth(index)
    }

    fn with_ids(
        &self,
        did: Option<u8>,
        sdid: Option<u8>,
    ) -> impl Iterator<Item = &AncillaryPacket> {
        self.packets.iter().filter(move |packet| {
            did.is_none_or(|did| packet.did() == did)
                && sdid.is_none_or(|sdid| packet.sdid() == sdid)
        })
    }

    /// Stable sort by Data ID.
    pub fn sort_by_did(&mut self) {
        self.packets.sort_by_key(|packet| packet.did());
    }

    /// Stable sort by Secondary Data ID.
    pub fn sort_by_sdid(&mut self) {
        self.packets.sort_by_key(|packet| packet.sdid());
    }

    /// Stable sort by [`PacketLocation::ordinal`].
    pub fn sort_by_location(&mut self) {
        self.packets
            .sort_by_key(|packet| packet.location().ordinal());
    }

    /// Scans a GUMP capture buffer and adds every packet found.
    ///
    /// Bytes that do not start a packet are skipped one at a time until the next
    /// marker. A truncated packet at the end of the buffer ends the scan. Raw
    /// packets that continue the previous raw packet (same line, space, link,
    /// stream and channel) are merged into it rather than added.
    ///
    /// # Parameters
    /// - `buf`: The captured GUMP bytes.
    /// - `default_location`: Location for packets whose header carries none.
    ///
    /// # Returns
    /// The number of packets added to the list.
    ///
    /// # Errors
    /// - [`AncError::Null`] - `buf` is empty
    /// - [`AncError::Memory`] - a payload allocation failed
    pub fn add_received_gump(
        &mut self,
        buf: &[u8],
        default_location: &PacketLocation,
    ) -> Result<usize, AncError> {
        if buf.is_empty() {
            return Err(AncError::Null {
                field: Field::GumpBuffer,
            });
        }

        let mut offset = 0;
        let mut added = 0;
        let mut skipped_bytes = 0;
        while offset < buf.len() {
            let remaining = &buf[offset..];
            let (result, consumed) = gump::parse(remaining, remaining.len(), default_location);
            match result {
                Ok(packet) => {
                    if self.merge_raw_continuation(&packet)? {
                        debug!(line = packet.location().line(), dc = packet.dc(), "Merged raw continuation");
                    } else {
                        self.packets.push(packet);
                        added += 1;
                    }
                    offset += consumed;
                }
                Err(e) if e.kind() == ErrorKind::BadParam => {
                    skipped_bytes += 1;
                    offset += 1;
                }
                Err(e) if e.kind() == ErrorKind::Range => {
                    debug!(offset, remaining = remaining.len(), "Truncated GUMP packet at end of buffer");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        if skipped_bytes > 0 {
            debug!(skipped_bytes, "Resynchronized GUMP scan past non-marker bytes");
        }
        Ok(added)
    }

    fn merge_raw_continuation(&mut self, packet: &AncillaryPacket) -> Result<bool, AncError> {
        match self.packets.last_mut() {
            Some(prev) if is_raw_continuation(prev, packet) => {
                prev.append_payload_from(packet)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Adds a packet from one SMPTE-334 VANC word packet.
    ///
    /// The packet is placed on link A, DS1, VANC at `line` in `channel`.
    ///
    /// # Errors
    /// - [`AncError::Range`] - fewer than 7 words, or malformed lengths
    /// - [`AncError::Fail`] - the words do not start with `000, 3FF, 3FF`
    /// - [`AncError::Memory`] - a payload allocation failed
    pub fn add_vanc_words(
        &mut self,
        words: &[u16],
        line: u16,
        channel: Channel,
    ) -> Result<(), AncError> {
        if words.len() < SMPTE334_WRAPPER_WORDS {
            return Err(AncError::range(
                Field::WordBuffer,
                words.len(),
                SMPTE334_WRAPPER_WORDS,
            ));
        }
        if words[..SMPTE334_ADF.len()] != SMPTE334_ADF {
            return Err(AncError::fail(FailReason::MissingDataFlag));
        }
        let location = PacketLocation::new(Link::A, DataStream::Ds1, channel, Space::Vanc, line)?;
        let packet = AncillaryPacket::from_words(words, &location)?;
        self.packets.push(packet);
        Ok(())
    }

    /// Total GUMP bytes needed per field, as `(field1, field2)`.
    ///
    /// A packet belongs to field 1 if the video is progressive or its line is before
    /// `f2_start_line`.
    ///
    /// # Errors
    /// - [`AncError::Fail`] - a packet has unknown coding
    pub fn transmit_size(
        &self,
        progressive: bool,
        f2_start_line: u16,
    ) -> Result<(usize, usize), AncError> {
        let mut sizes = (0, 0);
        for packet in &self.packets {
            let size = gump::required_size(packet)?;
            if in_field1(packet, progressive, f2_start_line) {
                sizes.0 += size;
            } else {
                sizes.1 += size;
            }
        }
        Ok(sizes)
    }

    /// Generates the GUMP buffers for both fields.
    ///
    /// Packets routed to an empty output buffer are skipped, as are raw packets with
    /// no payload.
    ///
    /// # Returns
    /// The number of bytes written to each buffer, as `(field1, field2)`.
    ///
    /// # Errors
    /// - [`AncError::Fail`] - a packet has unknown coding or does not fit
    pub fn generate_transmit(
        &self,
        progressive: bool,
        f2_start_line: u16,
        f1_out: &mut [u8],
        f2_out: &mut [u8],
    ) -> Result<(usize, usize), AncError> {
        let (mut f1_len, mut f2_len) = (0, 0);
        for packet in &self.packets {
            if gump::required_size(packet)? == 0 {
                continue;
            }
            let (out, written) = if in_field1(packet, progressive, f2_start_line) {
                (&mut *f1_out, &mut f1_len)
            } else {
                (&mut *f2_out, &mut f2_len)
            };
            if out.is_empty() {
                continue;
            }
            *written += gump::generate(packet, &mut out[*written..])?;
        }
        Ok((f1_len, f2_len))
    }

    /// Classifies raw packets on `line` as `ids`, replacing any earlier entry.
    pub fn set_analog_type_for_line(&mut self, line: u16, ids: DidSdid) {
        self.analog_types.insert(line, ids);
    }

    /// Removes the classification of `line`, returning it.
    pub fn remove_analog_type_for_line(&mut self, line: u16) -> Option<DidSdid> {
        self.analog_types.remove(&line)
    }

    /// The packet type raw packets on `line` are classified as, if any.
    pub fn analog_type_for_line(&self, line: u16) -> Option<DidSdid> {
        self.analog_types.get(&line).copied()
    }

    /// The analog classification of `packet`, looked up by its line.
    pub fn analog_type(&self, packet: &AncillaryPacket) -> Option<DidSdid> {
        self.analog_type_for_line(packet.location().line())
    }

    /// The whole line-to-type map.
    pub fn analog_type_map(&self) -> &BTreeMap<u16, DidSdid> {
        &self.analog_types
    }

    /// Replaces the whole line-to-type map.
    pub fn set_analog_type_map(&mut self, map: BTreeMap<u16, DidSdid>) {
        self.analog_types = map;
    }

    /// Removes every line classification.
    pub fn clear_analog_type_map(&mut self) {
        self.analog_types.clear();
    }

    /// Decodes every packet with `registry`.
    ///
    /// Raw packets on a line in the analog type map are decoded as the mapped
    /// type; see [`DecoderRegistry::interpret_analog`].
    ///
    /// # Errors
    /// - Any error of [`DecoderRegistry::interpret`]
    pub fn interpret_all(&self, registry: &DecoderRegistry) -> Result<Vec<SpecificPacket>, AncError> {
        self.packets
            .iter()
            .map(|packet| match self.analog_type(packet) {
                Some(ids) if packet.coding() == Coding::Raw => {
                    registry.interpret_analog(ids, packet)
                }
                _ => registry.interpret(packet),
            })
            .collect()
    }
}

fn in_field1(packet: &AncillaryPacket, progressive: bool, f2_start_line: u16) -> bool {
    progressive || packet.location().line() < f2_start_line
}

impl<'a> IntoIterator for &'a AncillaryList {
    type Item = &'a AncillaryPacket;
    type IntoIter = std::slice::Iter<'a, AncillaryPacket>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.iter()
    }
}

impl FromIterator<AncillaryPacket> for AncillaryList {
    fn from_iter<I: IntoIterator<Item = AncillaryPacket>>(iter: I) -> Self {
        Self {
            packets: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// Packet count; the alternate form lists one packet summary per line.
impl fmt::Display for AncillaryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.packets.len();
        write!(f, "{} packet{}", count, if count == 1 { "" } else { "s" })?;
        if f.alternate() {
            for (num, packet) in self.packets.iter().enumerate() {
                write!(f, "\n## Packet {}: {}", num + 1, packet)?;
            }
        }
        Ok(())
    }
}
