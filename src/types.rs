//! Core type definitions for ancillary packets.
//!
//! Provides zero-cost newtypes so a DID can never be passed where an SDID is
//! expected. All newtypes use `#[repr(transparent)]`.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::{AncError, Field};

/// Macro to generate SMPTE-291 identifier newtypes with common implementations
macro_rules! anc_newtype {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty) => $prefix:literal
        $(, custom_methods: { $($custom:tt)* })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[derive(Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Creates a new instance
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Raw value
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }

            $($($custom)*)?
        }

        // Display with custom prefix, hex like every SMPTE-291 table
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}=0x{:02X}", $prefix, self.0)
            }
        }

        impl Deref for $name {
            type Target = $inner;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        // Enable direct comparisons with raw values
        impl PartialEq<$inner> for $name {
            #[inline]
            fn eq(&self, other: &$inner) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for $inner {
            #[inline]
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
    };
}

anc_newtype!(
    /// SMPTE-291 Data Identifier.
    DataId(u8) => "DID",
    custom_methods: {
        /// Type 1 packets (DID bit 7 set) carry a Data Block Number instead of an SDID.
        #[inline]
        pub const fn is_type1(self) -> bool {
            self.0 & 0x80 != 0
        }
    }
);

anc_newtype!(
    /// SMPTE-291 Secondary Data Identifier, or Data Block Number for type 1 packets.
    SecondaryId(u8) => "SDID"
);

/// The two-byte type tag of an ancillary packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
pub struct DidSdid {
    /// Data ID.
    pub did: DataId,
    /// Secondary Data ID.
    pub sdid: SecondaryId,
}

impl DidSdid {
    /// Creates a pair from raw byte values.
    pub const fn new(did: u8, sdid: u8) -> Self {
        Self {
            did: DataId(did),
            sdid: SecondaryId(sdid),
        }
    }
}

impl fmt::Display for DidSdid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DID/SDID 0x{:02X}/0x{:02X}", self.did.0, self.sdid.0)
    }
}

/// How an ancillary packet's payload is coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Coding {
    /// SMPTE-291 digital packet (at most 255 payload bytes on the wire).
    #[default]
    Digital,
    /// Digitized analog waveform, split across as many wire packets as needed.
    Raw,
    /// Coding not set; packets with this coding cannot be generated.
    Unknown,
}

impl Coding {
    /// Raw value used by capture tooling: 0 = digital, 1 = raw, 2 = unknown.
    pub const fn as_u8(self) -> u8 {
        match self {
            Coding::Digital => 0,
            Coding::Raw => 1,
            Coding::Unknown => 2,
        }
    }
}

impl TryFrom<u8> for Coding {
    type Error = AncError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Coding::Digital),
            1 => Ok(Coding::Raw),
            2 => Ok(Coding::Unknown),
            _ => Err(AncError::range(Field::Coding, value as usize, 2)),
        }
    }
}

impl fmt::Display for Coding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Coding::Digital => "Digital",
            Coding::Raw => "Analog/Raw",
            Coding::Unknown => "Unknown",
        })
    }
}
