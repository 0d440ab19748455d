//! Owned payload storage for a single ancillary packet.
//!
//! All growth goes through `Vec::try_reserve_exact`, so an allocation failure
//! surfaces as [`AncError::Memory`] instead of aborting the process. Appends are
//! all-or-nothing: a failed append leaves the existing bytes untouched.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::error::{AncError, Field};

/// A resizable, exclusively owned payload byte array.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PayloadBuffer {
    #[serde_as(as = "serde_with::Bytes")]
    bytes: Vec<u8>,
}

impl PayloadBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resizes the buffer to exactly `len` zero-filled bytes, discarding the old content.
    ///
    /// # Errors
    /// - [`AncError::Memory`] - allocation failed; the buffer is left empty
    pub fn allocate(&mut self, len: usize) -> Result<(), AncError> {
        self.bytes.clear();
        if let Err(e) = self.try_grow(len) {
            self.bytes = Vec::new();
            return Err(e);
        }
        self.bytes.resize(len, 0);
        Ok(())
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Replaces the content with a copy of `data`.
    ///
    /// # Errors
    /// - [`AncError::Null`] - `data` is empty
    /// - [`AncError::Memory`] - allocation failed; the buffer is left empty
    pub fn set(&mut self, data: &[u8]) -> Result<(), AncError> {
        if data.is_empty() {
            return Err(AncError::Null {
                field: Field::PayloadData,
            });
        }
        self.allocate(data.len())?;
        self.bytes.copy_from_slice(data);
        Ok(())
    }

    /// Appends a copy of `data` to the end of the buffer.
    ///
    /// # Errors
    /// - [`AncError::Null`] - `data` is empty
    /// - [`AncError::Memory`] - allocation failed; the buffer is unchanged
    pub fn append(&mut self, data: &[u8]) -> Result<(), AncError> {
        if data.is_empty() {
            return Err(AncError::Null {
                field: Field::PayloadData,
            });
        }
        self.try_grow(data.len())?;
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    /// Returns the byte at `index`, or `0` when `index` is out of bounds.
    #[inline]
    pub fn byte_at(&self, index: usize) -> u8 {
        self.bytes.get(index).copied().unwrap_or(0)
    }

    /// Overwrites the byte at `index`.
    ///
    /// # Errors
    /// - [`AncError::Range`] - `index >= len()`
    pub fn set_byte_at(&mut self, value: u8, index: usize) -> Result<(), AncError> {
        let len = self.bytes.len();
        match self.bytes.get_mut(index) {
            Some(byte) => {
                *byte = value;
                Ok(())
            }
            None => Err(AncError::range(
                Field::PayloadIndex,
                index,
                len.saturating_sub(1),
            )),
        }
    }

    /// Copies the first `out.len()` payload bytes into `out`.
    ///
    /// # Errors
    /// - [`AncError::Range`] - `out` is longer than the payload
    pub fn copy_to(&self, out: &mut [u8]) -> Result<(), AncError> {
        let wanted = out.len();
        let src = self
            .bytes
            .get(..wanted)
            .ok_or_else(|| AncError::range(Field::OutputBuffer, wanted, self.bytes.len()))?;
        out.copy_from_slice(src);
        Ok(())
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn try_grow(&mut self, additional: usize) -> Result<(), AncError> {
        self.bytes
            .try_reserve_exact(additional)
            .map_err(|_| AncError::Memory {
                field: Field::PayloadData,
                requested: additional,
            })
    }
}

impl AsRef<[u8]> for PayloadBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
