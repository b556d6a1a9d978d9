//! Error types for protocol operations.

use thiserror::Error;

use crate::tree::NodeId;

/// Errors that can occur during protocol operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Cryptographic operation failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] sealcast_crypto::CryptoError),

    /// Padding operation failed.
    #[error("Padding error: {0}")]
    Padding(#[from] sealcast_crypto::PaddingError),

    /// Key tree constructed with a non-positive leaf count.
    #[error("Invalid tree size: leaf count must be at least 1, got {actual}")]
    InvalidTreeSize {
        /// The rejected leaf count.
        actual: usize,
    },

    /// Key lookup for a node id outside the tree.
    #[error("Unknown node: id {id} is outside the key tree")]
    UnknownNode {
        /// The unknown node id.
        id: NodeId,
    },

    /// No key block in the stream decrypted under the device's key path.
    #[error("Content key not found: device is revoked or stream is foreign")]
    KeyNotFound,

    /// The key-block separator never appeared in the stream.
    #[error("Key separator not found: stream is malformed or truncated")]
    SeparatorNotFound,
}

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
