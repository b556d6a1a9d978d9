//! Wire-format constants.
//!
//! All sizes and literal tags of the sealed-stream format are defined here
//! for consistent use by the codec and its consumers.

use sealcast_crypto::{IV_SIZE, KEY_SIZE};

/// Size of the validity marker in bytes.
pub const MARKER_SIZE: usize = 16;

/// Literal tag confirming that a trial decryption used the correct key.
pub const VALIDITY_MARKER: &[u8; MARKER_SIZE] = b"is_valid_aacskey";

/// Literal tag separating the key blocks from the encrypted content.
pub const KEY_SEPARATOR: &[u8; 11] = b"END_OF_KEYS";

/// Size of one key block: IV, then the encrypted marker and content key.
pub const KEY_BLOCK_SIZE: usize = IV_SIZE + MARKER_SIZE + KEY_SIZE;
