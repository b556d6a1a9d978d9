//! Sealed-stream codec.
//!
//! Packages a message so that every non-revoked device can recover it
//! while revoked devices cannot, even pooling all their keys.
//!
//! Wire format:
//!
//! ```text
//! KeyBlock := IV(16) || E_ku(VALIDITY_MARKER(16) || ContentKey(16))   -- 48 bytes
//! Stream   := KeyBlock* || KEY_SEPARATOR(11) || IV(16) || E_k(pad(Message))
//! ```
//!
//! One key block is emitted per cover node, in ascending node-id order,
//! each carrying the content key under that node's tree key. No key-block
//! count is encoded: the stream is self-delimiting through the separator
//! literal, and the receiver discovers the content boundary by scanning in
//! fixed 48-byte strides. A device recovers the content key by trial
//! decryption of each key block against the keys on its own path to the
//! root, accepting the first plaintext that opens with the validity
//! marker.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use sealcast_crypto::{decrypt, encrypt, pad, unpad, EncryptedData, SymmetricKey, IV_SIZE, KEY_SIZE};

use crate::error::{ProtocolError, Result};
use crate::limits::{KEY_BLOCK_SIZE, KEY_SEPARATOR, MARKER_SIZE, VALIDITY_MARKER};
use crate::revocation::RevocationRegistry;
use crate::tree::{KeyTree, NodeId};

/// Stateless encoder/decoder for sealed streams.
pub struct BroadcastCodec;

impl BroadcastCodec {
    /// Seal a message for every currently-valid device.
    ///
    /// Generates a fresh content key, wraps it once per cover node, and
    /// appends the message encrypted under the content key. The cover is
    /// read as precomputed state; revocations must happen before this
    /// call to take effect.
    ///
    /// # Errors
    ///
    /// Propagates cipher failures. An empty cover (every device revoked)
    /// is not an error: the stream then opens directly with the separator
    /// and nobody can decrypt it.
    pub fn encrypt(registry: &RevocationRegistry, message: &[u8]) -> Result<Vec<u8>> {
        let content_key = SymmetricKey::generate();

        let mut envelope = [0u8; MARKER_SIZE + KEY_SIZE];
        envelope[..MARKER_SIZE].copy_from_slice(VALIDITY_MARKER);
        envelope[MARKER_SIZE..].copy_from_slice(content_key.as_bytes());

        let mut stream = Vec::with_capacity(
            registry.cover().len() * KEY_BLOCK_SIZE + KEY_SEPARATOR.len() + IV_SIZE + message.len(),
        );
        for &node in registry.cover() {
            let node_key = registry.tree().key(node)?;
            stream.extend_from_slice(&encrypt(node_key, &envelope)?.to_bytes());
        }
        envelope.zeroize();

        stream.extend_from_slice(KEY_SEPARATOR);

        let mut padded = pad(message);
        let content = encrypt(&content_key, &padded)?;
        padded.zeroize();
        stream.extend_from_slice(&content.to_bytes());

        Ok(stream)
    }

    /// Open a sealed stream as the device at `device_leaf`.
    ///
    /// Scans the stream in key-block strides, trial-decrypting each block
    /// against the keys on the device's path to the root until a plaintext
    /// opens with the validity marker. Once the content key is recovered,
    /// remaining blocks are only scanned to locate the separator; the
    /// content after it is then decrypted and unpadded.
    ///
    /// # Errors
    ///
    /// - `UnknownNode` if `device_leaf` is outside the tree.
    /// - `SeparatorNotFound` if the stream ends without the separator
    ///   literal at a stride boundary.
    /// - `KeyNotFound` if the separator was found but no key block opened
    ///   under this device's keys: the device is revoked or the stream
    ///   was sealed against a different tree.
    /// - Crypto/padding errors if the content section is truncated or
    ///   corrupt.
    pub fn decrypt(
        registry: &RevocationRegistry,
        device_leaf: NodeId,
        stream: &[u8],
    ) -> Result<Vec<u8>> {
        let tree = registry.tree();
        if !tree.contains(device_leaf) {
            return Err(ProtocolError::UnknownNode { id: device_leaf });
        }

        // Exactly the keys this device is entitled to hold, leaf to root.
        let known_keys: Vec<&SymmetricKey> = KeyTree::path_to_root(device_leaf)
            .into_iter()
            .map(|id| tree.key(id))
            .collect::<Result<_>>()?;

        let mut content_key: Option<SymmetricKey> = None;
        let mut boundary: Option<usize> = None;
        let mut offset = 0;

        while offset < stream.len() {
            let rest = &stream[offset..];
            if rest.starts_with(KEY_SEPARATOR) {
                boundary = Some(offset);
                break;
            }
            if content_key.is_none() && rest.len() >= KEY_BLOCK_SIZE {
                content_key = Self::try_open_key_block(&rest[..KEY_BLOCK_SIZE], &known_keys)?;
            }
            offset += KEY_BLOCK_SIZE;
        }

        let boundary = boundary.ok_or(ProtocolError::SeparatorNotFound)?;
        let content_key = content_key.ok_or(ProtocolError::KeyNotFound)?;

        let content = EncryptedData::from_bytes(&stream[boundary + KEY_SEPARATOR.len()..])?;
        let mut padded = decrypt(&content_key, &content)?;
        let message = unpad(&padded)?;
        padded.zeroize();
        Ok(message)
    }

    /// Trial-decrypt one key block against the given keys, in order.
    ///
    /// Returns the content key from the first plaintext whose prefix
    /// matches the validity marker, or `None` if no key fits.
    fn try_open_key_block(
        block: &[u8],
        known_keys: &[&SymmetricKey],
    ) -> Result<Option<SymmetricKey>> {
        let encrypted = EncryptedData::from_bytes(block)?;

        for key in known_keys {
            // Wrong keys decrypt to garbage rather than failing; the
            // marker is the only validity signal.
            let Ok(mut plaintext) = decrypt(key, &encrypted) else {
                continue;
            };

            let matches = plaintext.len() == MARKER_SIZE + KEY_SIZE
                && bool::from(plaintext[..MARKER_SIZE].ct_eq(&VALIDITY_MARKER[..]));
            let result = if matches {
                Some(SymmetricKey::from_bytes(&plaintext[MARKER_SIZE..])?)
            } else {
                None
            };
            plaintext.zeroize();

            if result.is_some() {
                return Ok(result);
            }
        }
        Ok(None)
    }
}
