//! `ancstar`: A memory-safe SMPTE-291 ancillary data packet codec in Rust.
//!
//! This library decodes and encodes the ancillary data packets (captions, timecode,
//! AFD and friends) that professional video carries in the blanking regions of an
//! SDI signal. It speaks the two representations capture and playout hardware use:
//! the GUMP byte stream with its 7-byte wrapper, and the SMPTE-334 16-bit word
//! stream with parity.
//!
//! ## Core Concepts
//!
//! - **[`AncillaryPacket`]**: One packet: DID/SDID, payload, coding, checksum and
//!   raster [`PacketLocation`].
//! - **[`serialization`]**: The GUMP and SMPTE-334 wire formats.
//! - **[`AncillaryList`]**: A frame's worth of packets, scanned from a capture buffer
//!   and regenerated per field for playout.
//! - **[`DecoderRegistry`]**: Maps DID/SDID pairs to [`PayloadDecoder`]s that turn
//!   payloads into typed values such as [`Cea608Vanc`] captions.
//!
//! ## Quick Start
//!
//! ```rust
//! use ancstar::{AncillaryList, AncillaryPacket, DecoderRegistry, PacketLocation, SpecificPacket};
//! use ancstar::decoders::{CaptionField, Cea608Vanc};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build a caption packet for line 21
//!     let caption = Cea608Vanc::new(CaptionField::F1, 12, 0x14, 0x2C)?;
//!     let mut packet = caption.to_packet()?;
//!     packet.set_line(21)?;
//!
//!     // Serialize to the GUMP wire format
//!     let mut gump_buf = [0u8; 64];
//!     let len = packet.generate_gump(&mut gump_buf)?;
//!
//!     // Scan it back, as from a capture buffer
//!     let mut list = AncillaryList::new();
//!     list.add_received_gump(&gump_buf[..len], &PacketLocation::default())?;
//!     assert_eq!(list.len(), 1);
//!
//!     // Interpret the payload
//!     let registry = DecoderRegistry::with_default_decoders();
//!     let received: &AncillaryPacket = list.get(0).ok_or("no packet")?;
//!     match registry.interpret(received)? {
//!         SpecificPacket::Cea608Vanc(decoded) => assert_eq!(decoded.chars(), (0x14, 0x2C)),
//!         other => panic!("unexpected packet {other:?}"),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Edge paths (payload truncation, resynchronization, decoder registration) emit
//! [`tracing`](https://docs.rs/tracing) events. No subscriber is installed.

pub mod checksum;
pub mod constants;
pub mod decoders;
pub mod error;
pub mod fuzz_harnesses;
pub mod list;
pub mod location;
pub mod packet;
pub mod payload;
pub mod registry;
pub mod serialization;
pub mod traits;
pub mod types;

pub use decoders::{Cea608Vanc, SpecificPacket};
pub use error::{AncError, ErrorKind, FailReason, Field};
pub use list::AncillaryList;
pub use location::{Channel, DataStream, HorizOffset, Link, PacketLocation, Space};
pub use packet::AncillaryPacket;
pub use payload::PayloadBuffer;
pub use registry::DecoderRegistry;
pub use traits::PayloadDecoder;
pub use types::{Coding, DataId, DidSdid, SecondaryId};
