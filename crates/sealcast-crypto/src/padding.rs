//! Block padding for the 16-byte cipher block size.
//!
//! Pads a message so its length is a whole number of cipher blocks. The
//! scheme always appends at least one byte: `fill` bytes are added, each
//! holding the value `fill - 1`, with `fill` in `[1, BLOCK_SIZE]`. A
//! message that is already block-aligned gains a full block of `0x0f`.
//!
//! The last byte of a padded message therefore always states how much
//! padding to strip, so unpadding needs no length prefix.

use thiserror::Error;

use crate::symmetric::BLOCK_SIZE;

/// Errors that can occur during padding operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaddingError {
    /// Padded input is empty.
    #[error("Padded data is empty")]
    Empty,

    /// Final byte encodes a fill length larger than a cipher block.
    #[error("Invalid padding: fill value {value} exceeds the block size")]
    FillValueOutOfRange {
        /// The final byte of the padded data.
        value: u8,
    },

    /// Encoded fill length exceeds the available data.
    #[error("Invalid padding: claims {claimed} fill bytes but only {available} available")]
    FillLengthOutOfRange {
        /// Fill length claimed by the final byte.
        claimed: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// Fill bytes do not all carry the same value.
    #[error("Invalid padding: inconsistent fill bytes")]
    InconsistentFill,
}

/// Result type for padding operations.
pub type Result<T> = std::result::Result<T, PaddingError>;

/// Pad a message to a whole number of cipher blocks.
///
/// Always appends between 1 and [`BLOCK_SIZE`] bytes, so
/// `pad(m).len() > m.len()` for every `m` (including the empty message).
///
/// # Example
///
/// ```
/// use sealcast_crypto::{pad, unpad};
///
/// let padded = pad(b"four");
/// assert_eq!(padded.len(), 16);
/// assert_eq!(unpad(&padded).unwrap(), b"four");
/// ```
pub fn pad(data: &[u8]) -> Vec<u8> {
    let fill = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut padded = Vec::with_capacity(data.len() + fill);
    padded.extend_from_slice(data);
    padded.resize(data.len() + fill, (fill - 1) as u8);
    padded
}

/// Remove block padding from a message.
///
/// Reads the fill length from the final byte and strips that many bytes,
/// verifying that every stripped byte carries the same value.
///
/// # Errors
///
/// Returns a [`PaddingError`] if the input is empty, the encoded fill
/// length is impossible, or the fill bytes are inconsistent.
pub fn unpad(padded: &[u8]) -> Result<Vec<u8>> {
    let value = *padded.last().ok_or(PaddingError::Empty)?;
    let fill = value as usize + 1;

    if fill > BLOCK_SIZE {
        return Err(PaddingError::FillValueOutOfRange { value });
    }
    if fill > padded.len() {
        return Err(PaddingError::FillLengthOutOfRange {
            claimed: fill,
            available: padded.len(),
        });
    }

    let data_len = padded.len() - fill;
    if !padded[data_len..].iter().all(|&b| b == value) {
        return Err(PaddingError::InconsistentFill);
    }

    Ok(padded[..data_len].to_vec())
}
