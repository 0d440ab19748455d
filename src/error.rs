//! Ancillary data error types.
//!
//! Every fallible operation in the crate returns an [`AncError`]. Its variants map
//! one-to-one onto the five failure kinds callers act on: a missing input, an
//! out-of-range value, a bad wire marker (resynchronize), an allocation failure,
//! and a generate that cannot proceed. The `thiserror` crate is used for ergonomic
//! error definitions.

use std::fmt;

use thiserror::Error;

/// The field or structure an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// GUMP input buffer.
    GumpBuffer,
    /// GUMP wrapper (the 7 bytes around the payload).
    GumpWrapper,
    /// A complete GUMP packet (wrapper plus DC payload bytes).
    GumpPacket,
    /// SMPTE-334 word buffer.
    WordBuffer,
    /// SMPTE-334 payload words announced by DC.
    WordPayload,
    /// Payload byte index.
    PayloadIndex,
    /// Payload input bytes.
    PayloadData,
    /// Caller-supplied output buffer.
    OutputBuffer,
    /// Link A/B.
    Link,
    /// Data stream DS1..DS4.
    DataStream,
    /// Luma/chroma channel.
    Channel,
    /// VANC/HANC space.
    Space,
    /// Raster line number.
    LineNumber,
    /// Horizontal offset.
    HorizOffset,
    /// Data coding.
    Coding,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::GumpBuffer => "GUMP buffer",
            Field::GumpWrapper => "GUMP wrapper",
            Field::GumpPacket => "GUMP packet",
            Field::WordBuffer => "SMPTE-334 word buffer",
            Field::WordPayload => "SMPTE-334 payload",
            Field::PayloadIndex => "payload index",
            Field::PayloadData => "payload data",
            Field::OutputBuffer => "output buffer",
            Field::Link => "link",
            Field::DataStream => "data stream",
            Field::Channel => "channel",
            Field::Space => "data space",
            Field::LineNumber => "line number",
            Field::HorizOffset => "horizontal offset",
            Field::Coding => "coding",
        };
        f.write_str(s)
    }
}

/// Why an operation could not proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailReason {
    /// The packet's coding is unknown.
    UnknownCoding,
    /// A raw packet has no payload to emit.
    EmptyRawPayload,
    /// The output buffer cannot hold the packet.
    OutputTooSmall {
        /// Bytes the packet needs.
        needed: usize,
        /// Bytes the caller offered.
        available: usize,
    },
    /// A decoder was asked to interpret a packet it does not recognize.
    Unrecognized,
    /// A decoder for this DID/SDID is already registered.
    DuplicateDecoder,
    /// A SMPTE-334 word packet does not start with `000, 3FF, 3FF`.
    MissingDataFlag,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::UnknownCoding => f.write_str("coding not set"),
            FailReason::EmptyRawPayload => f.write_str("raw packet has empty payload"),
            FailReason::OutputTooSmall { needed, available } => {
                write!(f, "output too small: needed {needed} bytes, have {available}")
            }
            FailReason::Unrecognized => f.write_str("packet not recognized by decoder"),
            FailReason::DuplicateDecoder => f.write_str("decoder already registered"),
            FailReason::MissingDataFlag => f.write_str("ancillary data flag missing"),
        }
    }
}

/// The bare kind of an [`AncError`], for callers that only branch on category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required argument was absent or empty.
    Null,
    /// A value, index or length was outside its valid bound.
    Range,
    /// Input did not start with the expected wire marker.
    BadParam,
    /// A buffer-growth operation failed.
    Memory,
    /// An operation could not proceed.
    Fail,
}

/// Errors returned by ancillary packet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AncError {
    /// A required slice or buffer argument was absent or empty.
    #[error("Missing required input: {field}")]
    Null { field: Field },

    /// A numeric argument, index, decoded length or enum value was out of bounds.
    #[error("Value out of range for {field}: got {got}, limit {limit}")]
    Range {
        field: Field,
        got: usize,
        limit: usize,
    },

    /// Input did not carry the expected marker; scan forward to resynchronize.
    #[error("Bad packet marker: expected 0x{expected:02X}, got 0x{got:02X}")]
    BadParam { expected: u8, got: u8 },

    /// Growing a buffer failed.
    #[error("Allocation of {requested} bytes failed for {field}")]
    Memory { field: Field, requested: usize },

    /// A generate, decode or registration could not proceed.
    #[error("Operation failed: {reason}")]
    Fail { reason: FailReason },
}

impl AncError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AncError::Null { .. } => ErrorKind::Null,
            AncError::Range { .. } => ErrorKind::Range,
            AncError::BadParam { .. } => ErrorKind::BadParam,
            AncError::Memory { .. } => ErrorKind::Memory,
            AncError::Fail { .. } => ErrorKind::Fail,
        }
    }

    pub(crate) fn range(field: Field, got: usize, limit: usize) -> Self {
        AncError::Range { field, got, limit }
    }

    pub(crate) fn fail(reason: FailReason) -> Self {
        AncError::Fail { reason }
    }
}
