//! Wire formats for ancillary packets.
//!
//! Two transports are supported: the 7-byte-wrapper GUMP byte stream produced and
//! consumed by capture/playout hardware, and the SMPTE-334 16-bit word stream with
//! parity used on VANC/HDMI-domain transports.

pub mod gump;
pub mod smpte334;

pub use gump::{generate, generate_vec, parse, parse_bytes, parse_vec, required_size};
pub use smpte334::{from_words, payload_words, to_words};
