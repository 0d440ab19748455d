//! Raster location of an ancillary packet.
//!
//! A [`PacketLocation`] records where a packet was found on capture, or where it
//! should be inserted on playout: the SDI link, data stream, luma/chroma channel,
//! VANC/HANC space, SMPTE line number and horizontal offset. Enum-valued fields
//! can only hold defined variants; the numeric fields are range checked by their
//! setters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    HORIZ_OFFSET_ANY_HANC, HORIZ_OFFSET_ANYWHERE, HORIZ_OFFSET_MASK, HORIZ_OFFSET_RESERVED_MIN,
    MAX_LINE_NUMBER,
};
use crate::error::{AncError, Field};

/// Which link of a (dual-link) video signal carries the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Link {
    #[default]
    A,
    B,
}

/// Which data stream of the link carries the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataStream {
    #[default]
    Ds1,
    Ds2,
    Ds3,
    Ds4,
}

/// Which component of the video stream carries the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Channel {
    /// Chroma (also "both" for SD).
    C,
    /// Luma.
    #[default]
    Y,
}

/// Which raster region carries the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Space {
    /// Between SAV and EAV of a vertical-blanking line.
    #[default]
    Vanc,
    /// Between EAV and SAV.
    Hanc,
}

/// Horizontal position of the packet within its raster line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawHorizOffset")]
pub enum HorizOffset {
    /// Unspecified; the first legal position after SAV.
    #[default]
    Default,
    /// Any legal position after EAV.
    AnyHanc,
    /// Any legal position in the line.
    Anywhere,
    /// A 12-bit sample offset, below the reserved sentinel range.
    Explicit(u16),
}

impl HorizOffset {
    /// The 12-bit wire value of this offset.
    pub fn as_u16(self) -> u16 {
        match self {
            HorizOffset::Default => 0,
            HorizOffset::AnyHanc => HORIZ_OFFSET_ANY_HANC,
            HorizOffset::Anywhere => HORIZ_OFFSET_ANYWHERE,
            HorizOffset::Explicit(offset) => offset & HORIZ_OFFSET_MASK,
        }
    }

    fn validate(self) -> Result<Self, AncError> {
        match self {
            HorizOffset::Explicit(offset) if offset >= HORIZ_OFFSET_RESERVED_MIN => Err(
                AncError::range(
                    Field::HorizOffset,
                    offset as usize,
                    HORIZ_OFFSET_RESERVED_MIN as usize - 1,
                ),
            ),
            other => Ok(other),
        }
    }
}

// Unvalidated serde shape of `HorizOffset`.
#[derive(Deserialize)]
enum RawHorizOffset {
    Default,
    AnyHanc,
    Anywhere,
    Explicit(u16),
}

impl TryFrom<RawHorizOffset> for HorizOffset {
    type Error = AncError;

    fn try_from(raw: RawHorizOffset) -> Result<Self, Self::Error> {
        match raw {
            RawHorizOffset::Default => Ok(HorizOffset::Default),
            RawHorizOffset::AnyHanc => Ok(HorizOffset::AnyHanc),
            RawHorizOffset::Anywhere => Ok(HorizOffset::Anywhere),
            RawHorizOffset::Explicit(offset) => HorizOffset::Explicit(offset).validate(),
        }
    }
}

impl TryFrom<u16> for HorizOffset {
    type Error = AncError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(HorizOffset::Default),
            HORIZ_OFFSET_ANYWHERE => Ok(HorizOffset::Anywhere),
            HORIZ_OFFSET_ANY_HANC => Ok(HorizOffset::AnyHanc),
            v => HorizOffset::Explicit(v).validate(),
        }
    }
}

macro_rules! raw_enum {
    ($name:ident, $field:expr, [$($raw:literal => $variant:ident),+ $(,)?]) => {
        impl $name {
            /// Raw value of this variant.
            pub const fn as_u8(self) -> u8 {
                match self {
                    $($name::$variant => $raw,)+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = AncError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($raw => Ok($name::$variant),)+
                    _ => {
                        let limit = [$($raw),+].len() - 1;
                        Err(AncError::range($field, value as usize, limit))
                    }
                }
            }
        }
    };
}

raw_enum!(Link, Field::Link, [0 => A, 1 => B]);
raw_enum!(DataStream, Field::DataStream, [0 => Ds1, 1 => Ds2, 2 => Ds3, 3 => Ds4]);
raw_enum!(Channel, Field::Channel, [0 => C, 1 => Y]);
raw_enum!(Space, Field::Space, [0 => Vanc, 1 => Hanc]);

/// Where in the raster an ancillary packet originates or belongs.
///
/// Deserialization applies the same range checks as the setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct PacketLocation {
    link: Link,
    stream: DataStream,
    channel: Channel,
    space: Space,
    line: u16,
    horiz_offset: HorizOffset,
}

#[derive(Deserialize)]
struct RawLocation {
    link: Link,
    stream: DataStream,
    channel: Channel,
    space: Space,
    line: u16,
    horiz_offset: HorizOffset,
}

impl TryFrom<RawLocation> for PacketLocation {
    type Error = AncError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        let mut location =
            PacketLocation::new(raw.link, raw.stream, raw.channel, raw.space, raw.line)?;
        location.set_horiz_offset(raw.horiz_offset)?;
        Ok(location)
    }
}

impl PacketLocation {
    /// Creates a location with the default horizontal offset.
    ///
    /// # Errors
    /// - [`AncError::Range`] - `line` does not fit the 11-bit line field
    pub fn new(
        link: Link,
        stream: DataStream,
        channel: Channel,
        space: Space,
        line: u16,
    ) -> Result<Self, AncError> {
        let mut location = PacketLocation {
            link,
            stream,
            channel,
            space,
            ..Default::default()
        };
        location.set_line(line)?;
        Ok(location)
    }

    /// SDI link carrying the packet.
    pub fn link(&self) -> Link {
        self.link
    }

    /// Data stream within the link.
    pub fn stream(&self) -> DataStream {
        self.stream
    }

    /// Luma or chroma channel.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// VANC or HANC space.
    pub fn space(&self) -> Space {
        self.space
    }

    /// SMPTE line number.
    pub fn line(&self) -> u16 {
        self.line
    }

    /// Horizontal position within the line.
    pub fn horiz_offset(&self) -> HorizOffset {
        self.horiz_offset
    }

    /// True for the luma (Y) channel.
    pub fn is_luma(&self) -> bool {
        self.channel == Channel::Y
    }

    /// True for the HANC space.
    pub fn is_hanc(&self) -> bool {
        self.space == Space::Hanc
    }

    /// Sets the SDI link.
    pub fn set_link(&mut self, link: Link) -> &mut Self {
        self.link = link;
        self
    }

    /// Sets the data stream.
    pub fn set_stream(&mut self, stream: DataStream) -> &mut Self {
        self.stream = stream;
        self
    }

    /// Sets the luma/chroma channel.
    pub fn set_channel(&mut self, channel: Channel) -> &mut Self {
        self.channel = channel;
        self
    }

    /// Sets the VANC/HANC space.
    pub fn set_space(&mut self, space: Space) -> &mut Self {
        self.space = space;
        self
    }

    /// Sets the SMPTE line number.
    ///
    /// # Errors
    /// - [`AncError::Range`] - `line` exceeds the 11 bits the GUMP header can carry
    pub fn set_line(&mut self, line: u16) -> Result<&mut Self, AncError> {
        if line > MAX_LINE_NUMBER {
            return Err(AncError::range(
                Field::LineNumber,
                line as usize,
                MAX_LINE_NUMBER as usize,
            ));
        }
        self.line = line;
        Ok(self)
    }

    /// Sets the horizontal offset. [`HorizOffset::AnyHanc`] also moves the packet to HANC.
    ///
    /// # Errors
    /// - [`AncError::Range`] - an explicit offset collides with the reserved sentinels
    pub fn set_horiz_offset(&mut self, offset: HorizOffset) -> Result<&mut Self, AncError> {
        self.horiz_offset = offset.validate()?;
        if offset == HorizOffset::AnyHanc {
            self.space = Space::Hanc;
        }
        Ok(self)
    }

    /// 64-bit sort key: line, space, horizontal offset, channel, stream, link (most to least significant).
    pub fn ordinal(&self) -> u64 {
        let h_offset = match self.horiz_offset {
            HorizOffset::Default | HorizOffset::Anywhere => 0,
            other => other.as_u16() as u64,
        };
        ((self.line as u64) << 27)
            | ((self.space.as_u8() as u64) << 24)
            | (h_offset << 12)
            | ((self.channel.as_u8() as u64) << 9)
            | ((self.stream.as_u8() as u64) << 2)
            | self.link.as_u8() as u64
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Link::A => "A",
            Link::B => "B",
        })
    }
}

impl fmt::Display for DataStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DS{}", self.as_u8() + 1)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::C => "C",
            Channel::Y => "Y",
        })
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Space::Vanc => "VANC",
            Space::Hanc => "HANC",
        })
    }
}

impl fmt::Display for PacketLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|L{}",
            self.link, self.stream, self.channel, self.space, self.line
        )?;
        match self.horiz_offset {
            HorizOffset::Default => Ok(()),
            HorizOffset::AnyHanc => f.write_str("|+AnyHanc"),
            HorizOffset::Anywhere => f.write_str("|+Anywhere"),
            HorizOffset::Explicit(offset) => write!(f, "|+{offset}"),
        }
    }
}
