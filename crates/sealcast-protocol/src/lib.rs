//! # sealcast-protocol
//!
//! Broadcast encryption with device revocation, in the complete-subtree
//! style: a sender seals content once and every non-revoked device in a
//! fixed population can open it, while revoked devices cannot, even
//! pooling all their keys.
//!
//! This crate provides:
//! - **KeyTree**: a complete binary tree with one random key per node;
//!   each device holds the keys on its leaf's path to the root
//! - **RevocationRegistry**: valid/revoked device bookkeeping and the
//!   minimal subtree cover of the valid set
//! - **BroadcastCodec**: the sealed-stream format, one wrapped content
//!   key per cover node followed by the encrypted content
//!
//! ## Protocol sketch
//!
//! ```text
//! Stream := KeyBlock* || KEY_SEPARATOR || IV || E_k(pad(Message))
//! ```
//!
//! Receivers locate the content boundary by scanning for the separator in
//! key-block strides and recover the content key by trial decryption
//! against their own key path. Revoking a device shrinks the cover so
//! that no later stream carries a block its path can open; tree keys
//! themselves never rotate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod broadcast;
pub mod error;
pub mod limits;
pub mod revocation;
pub mod tree;

#[cfg(test)]
mod proptests;

pub use broadcast::BroadcastCodec;
pub use error::{ProtocolError, Result};
pub use limits::{KEY_BLOCK_SIZE, KEY_SEPARATOR, MARKER_SIZE, VALIDITY_MARKER};
pub use revocation::RevocationRegistry;
pub use tree::{KeyTree, NodeId, ROOT};
