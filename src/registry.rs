//! DID/SDID to payload decoder registry.
//!
//! The registry maps each packet type to the [`PayloadDecoder`] that knows how to
//! interpret it. It is built once and then shared read-only; lookups never mutate.

use std::collections::HashMap;

use tracing::debug;

use crate::decoders::{Cea608VancDecoder, SpecificPacket};
use crate::error::{AncError, FailReason};
use crate::packet::AncillaryPacket;
use crate::traits::PayloadDecoder;
use crate::types::DidSdid;

/// Registered payload decoders, keyed by DID/SDID.
#[derive(Debug, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<DidSdid, Box<dyn PayloadDecoder>>,
}

impl DecoderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in decoder registered.
    pub fn with_default_decoders() -> Self {
        let mut registry = Self::new();
        let cea608: Box<dyn PayloadDecoder> = Box::new(Cea608VancDecoder);
        registry.decoders.insert(cea608.did_sdid(), cea608);
        registry
    }

    /// Registers a decoder for its DID/SDID pair.
    ///
    /// # Errors
    /// - [`AncError::Fail`] - a decoder for the same DID/SDID is already registered
    pub fn register(&mut self, decoder: Box<dyn PayloadDecoder>) -> Result<(), AncError> {
        let ids = decoder.did_sdid();
        if self.decoders.contains_key(&ids) {
            return Err(AncError::fail(FailReason::DuplicateDecoder));
        }
        debug!(%ids, name = decoder.name(), "Registered payload decoder");
        self.decoders.insert(ids, decoder);
        Ok(())
    }

    /// Returns the decoder registered for `ids`, if any.
    pub fn lookup(&self, ids: DidSdid) -> Option<&dyn PayloadDecoder> {
        self.decoders.get(&ids).map(|decoder| decoder.as_ref())
    }

    /// Returns the decoder that recognizes `packet`, if any.
    pub fn identify(&self, packet: &AncillaryPacket) -> Option<&dyn PayloadDecoder> {
        self.lookup(packet.did_sdid())
            .filter(|decoder| decoder.recognize(packet))
    }

    /// Decodes `packet` with its registered decoder.
    ///
    /// Packets no decoder recognizes yield [`SpecificPacket::Unknown`].
    ///
    /// # Errors
    /// - Any error of the decoder's [`PayloadDecoder::interpret`]
    pub fn interpret(&self, packet: &AncillaryPacket) -> Result<SpecificPacket, AncError> {
        match self.identify(packet) {
            Some(decoder) => decoder.interpret(packet),
            None => Ok(SpecificPacket::Unknown(packet.did_sdid())),
        }
    }

    /// Decodes a raw packet that a line classification maps to `ids`.
    ///
    /// Raw packets carry no meaningful DID/SDID, so the decoder is chosen by `ids`
    /// and used only if it recognizes the raw packet. Otherwise the packet is
    /// reported as [`SpecificPacket::Analog`].
    ///
    /// # Errors
    /// - Any error of the decoder's [`PayloadDecoder::interpret`]
    pub fn interpret_analog(
        &self,
        ids: DidSdid,
        packet: &AncillaryPacket,
    ) -> Result<SpecificPacket, AncError> {
        match self.lookup(ids).filter(|decoder| decoder.recognize(packet)) {
            Some(decoder) => decoder.interpret(packet),
            None => Ok(SpecificPacket::Analog {
                ids,
                line: packet.location().line(),
            }),
        }
    }

    /// Number of registered decoders.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// True if no decoder is registered.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}
