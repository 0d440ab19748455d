//! Payload interpretation traits.
//!
//! A [`PayloadDecoder`] turns the raw payload of one kind of ancillary packet
//! (identified by its DID/SDID pair) into a typed value. Decoders are registered
//! with a [`crate::registry::DecoderRegistry`] and shared read-only.

use std::fmt::Debug;

use crate::decoders::SpecificPacket;
use crate::error::AncError;
use crate::packet::AncillaryPacket;
use crate::types::DidSdid;

/// Defines the interface for a DID/SDID-specific payload decoder.
pub trait PayloadDecoder: Send + Sync + Debug {
    /// Returns the DID/SDID pair this decoder handles.
    fn did_sdid(&self) -> DidSdid;

    /// Short human-readable name of the packet type.
    fn name(&self) -> &'static str;

    /// Checks whether `packet` is a well-formed instance of this decoder's packet type.
    ///
    /// Implementations check coding and data count as well as DID/SDID.
    fn recognize(&self, packet: &AncillaryPacket) -> bool;

    /// Decodes the payload of `packet`.
    ///
    /// # Parameters
    /// - `packet`: A packet for which [`PayloadDecoder::recognize`] returns true.
    ///
    /// # Returns
    /// - `Ok(SpecificPacket)` containing the decoded value on success.
    /// - `Err(AncError)` if the packet is not recognized or its payload is malformed.
    fn interpret(&self, packet: &AncillaryPacket) -> Result<SpecificPacket, AncError>;
}
