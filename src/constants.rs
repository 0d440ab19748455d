//! Ancillary data wire-format constants and bitmasks.
//!
//! Defines the layout constants of the GUMP hardware wrapper, the SMPTE-291
//! limits shared by every coding, and the SMPTE-334 word preamble. Decoder-specific
//! constants live with their decoders.

// --- GUMP Wrapper Layout ---

/// First byte of every GUMP packet.
pub const GUMP_MARKER: u8 = 0xFF;
/// Bytes in a GUMP packet that are not payload: marker, 2 location bytes, DID, SDID, DC, checksum.
pub const GUMP_WRAPPER_SIZE: usize = 7;
/// Offset of the first location header byte.
pub const GUMP_HEADER_BYTE1_OFFSET: usize = 1;
/// Offset of the second location header byte.
pub const GUMP_HEADER_BYTE2_OFFSET: usize = 2;
/// Offset of the Data ID.
pub const GUMP_DID_OFFSET: usize = 3;
/// Offset of the Secondary Data ID.
pub const GUMP_SDID_OFFSET: usize = 4;
/// Offset of the Data Count.
pub const GUMP_DC_OFFSET: usize = 5;
/// Offset of the first payload byte.
pub const GUMP_PAYLOAD_OFFSET: usize = 6;

/// Header byte 1: location bits are valid (always set on generate).
pub const GUMP_LOCATION_VALID_BIT: u8 = 0x80;
/// Header byte 1: raw/analog (1) or digital (0) coding.
pub const GUMP_RAW_CODING_BIT: u8 = 0x40;
/// Header byte 1: luma (1) or chroma (0) channel.
pub const GUMP_LUMA_CHANNEL_BIT: u8 = 0x20;
/// Header byte 1: HANC (1) or VANC (0) space.
pub const GUMP_HANC_SPACE_BIT: u8 = 0x10;
/// Header byte 1: line number bits [10:7].
pub const GUMP_LINE_MSB_MASK: u8 = 0x0F;
/// Header byte 2: line number bits [6:0].
pub const GUMP_LINE_LSB_MASK: u8 = 0x7F;
/// Shift between the two line number fragments.
pub const GUMP_LINE_MSB_SHIFT: u16 = 7;

// --- SMPTE-291 Limits ---

/// Maximum Data Count a single packet can carry.
pub const MAX_DATA_COUNT: usize = 255;
/// Largest line number representable in the 11-bit GUMP location field.
pub const MAX_LINE_NUMBER: u16 = 0x07FF;

// --- SMPTE-334 Word Layout ---

/// Ancillary Data Flag preamble, in word order.
pub const SMPTE334_ADF: [u16; 3] = [0x000, 0x3FF, 0x3FF];
/// Words in a SMPTE-334 packet that are not payload: ADF (3), DID, SDID, DC, checksum.
pub const SMPTE334_WRAPPER_WORDS: usize = 7;
/// Index of the DID word.
pub const SMPTE334_DID_INDEX: usize = 3;
/// Index of the SDID word.
pub const SMPTE334_SDID_INDEX: usize = 4;
/// Index of the DC word.
pub const SMPTE334_DC_INDEX: usize = 5;
/// Index of the first user data word.
pub const SMPTE334_PAYLOAD_INDEX: usize = 6;
/// Mask selecting the 8 data bits of a parity-encoded word.
pub const WORD_DATA_MASK: u16 = 0x00FF;
/// Mask selecting the 9 bits covered by the SMPTE-291 checksum.
pub const WORD_CHECKSUM_MASK: u16 = 0x01FF;
/// Bit 8 of a 10-bit word (even parity or checksum MSB).
pub const WORD_BIT8: u16 = 0x0100;
/// Bit 9 of a 10-bit word (inverse of bit 8).
pub const WORD_BIT9: u16 = 0x0200;

// --- Horizontal Offset Sentinels (12-bit) ---

/// Mask applied to every horizontal offset value.
pub const HORIZ_OFFSET_MASK: u16 = 0x0FFF;
/// Packet may be placed anywhere in the line.
pub const HORIZ_OFFSET_ANYWHERE: u16 = 0x0FFF;
/// Packet may be placed anywhere after EAV.
pub const HORIZ_OFFSET_ANY_HANC: u16 = 0x0FFE;
/// First value reserved for sentinels; explicit offsets must be below it.
pub const HORIZ_OFFSET_RESERVED_MIN: u16 = 0x0FFC;
