//! Built-in payload decoders.

pub mod cea608_vanc;

use serde::{Deserialize, Serialize};

use crate::types::DidSdid;

pub use cea608_vanc::{CaptionField, Cea608Vanc, Cea608VancDecoder};

/// A packet payload decoded into its type-specific representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecificPacket {
    /// CEA-608 closed captions carried in VANC (SMPTE-334).
    Cea608Vanc(Cea608Vanc),
    /// A raw packet classified by its line, with no decoder for its waveform.
    Analog {
        /// Packet type the line is mapped to.
        ids: DidSdid,
        /// Line the packet was captured on.
        line: u16,
    },
    /// No registered decoder recognized the packet.
    Unknown(DidSdid),
}
