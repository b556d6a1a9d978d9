//! AES-128-CBC symmetric encryption.
//!
//! Provides block-cipher encryption with 128-bit keys and random 128-bit IVs.
//!
//! ## Security Notes
//!
//! - Keys are zeroized on drop
//! - IVs are randomly generated using OsRng, one per encryption
//! - Key comparison is constant-time
//! - CBC carries no authentication tag; callers validate recovered
//!   plaintext against their own framing

use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{CryptoError, Result};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Size of symmetric key in bytes (128 bits).
pub const KEY_SIZE: usize = 16;

/// Size of IV in bytes (128 bits).
pub const IV_SIZE: usize = 16;

/// Cipher block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// A 128-bit symmetric key for AES-128-CBC.
///
/// Used both for the per-node tree keys and for content keys; the key
/// material is zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    /// Generate a new random symmetric key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 16 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Get the raw key bytes.
    ///
    /// # Security
    ///
    /// This exposes key material; never log or persist the returned bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}

impl ConstantTimeEq for SymmetricKey {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.bytes.ct_eq(&other.bytes)
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        // Constant-time comparison to prevent timing attacks
        self.ct_eq(other).into()
    }
}

impl Eq for SymmetricKey {}

/// A 128-bit initialization vector for AES-128-CBC.
#[derive(Clone)]
pub struct Iv {
    bytes: [u8; IV_SIZE],
}

impl Iv {
    /// Generate a new random IV.
    pub fn generate() -> Self {
        let mut bytes = [0u8; IV_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create an IV from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 16 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != IV_SIZE {
            return Err(CryptoError::InvalidIvLength {
                expected: IV_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; IV_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Get the IV as a byte slice.
    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for Iv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Iv({:02x}{:02x}..)", self.bytes[0], self.bytes[1])
    }
}

/// Encrypted data with IV prepended.
///
/// Wire format: `[iv (16 bytes)][ciphertext]`
#[derive(Clone)]
pub struct EncryptedData {
    /// The IV used for encryption.
    pub iv: Iv,
    /// The ciphertext (a whole number of cipher blocks).
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Get the total size of the encrypted data.
    pub fn len(&self) -> usize {
        IV_SIZE + self.ciphertext.len()
    }

    /// Check if the encrypted data is empty.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Serialize to bytes (iv || ciphertext).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.len());
        result.extend_from_slice(self.iv.as_bytes());
        result.extend_from_slice(&self.ciphertext);
        result
    }

    /// Deserialize from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is too short to contain an IV and at
    /// least one ciphertext block.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < IV_SIZE + BLOCK_SIZE {
            return Err(CryptoError::Decryption);
        }
        let iv = Iv::from_bytes(&bytes[..IV_SIZE])?;
        let ciphertext = bytes[IV_SIZE..].to_vec();
        Ok(Self { iv, ciphertext })
    }
}

impl std::fmt::Debug for EncryptedData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedData")
            .field("iv", &self.iv)
            .field("ciphertext", &format!("[{} bytes]", self.ciphertext.len()))
            .finish()
    }
}

/// Encrypt block-aligned plaintext using AES-128-CBC.
///
/// A random IV is generated internally and returned alongside the
/// ciphertext. Padding is the caller's responsibility ([`crate::pad`]);
/// the plaintext must already be a whole number of cipher blocks.
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the plaintext length is not a
/// multiple of [`BLOCK_SIZE`].
///
/// # Example
///
/// ```
/// use sealcast_crypto::{decrypt, encrypt, pad, unpad, SymmetricKey};
///
/// let key = SymmetricKey::generate();
/// let encrypted = encrypt(&key, &pad(b"Hello, Sealcast!")).unwrap();
/// let decrypted = unpad(&decrypt(&key, &encrypted).unwrap()).unwrap();
///
/// assert_eq!(decrypted, b"Hello, Sealcast!");
/// ```
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<EncryptedData> {
    if plaintext.is_empty() || plaintext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::Encryption(format!(
            "plaintext length {} is not a positive multiple of the {}-byte block size",
            plaintext.len(),
            BLOCK_SIZE
        )));
    }

    let iv = Iv::generate();
    let mut buf = plaintext.to_vec();
    let msg_len = buf.len();
    Aes128CbcEnc::new(key.as_bytes().into(), iv.as_bytes().into())
        .encrypt_padded_mut::<NoPadding>(&mut buf, msg_len)
        .map_err(|_| CryptoError::Encryption("AES-128-CBC encryption failed".into()))?;

    Ok(EncryptedData {
        iv,
        ciphertext: buf,
    })
}

/// Decrypt ciphertext using AES-128-CBC.
///
/// CBC has no built-in integrity check: decryption with the wrong key
/// yields well-formed garbage rather than an error. Callers must validate
/// the recovered plaintext themselves.
///
/// # Errors
///
/// Returns `CryptoError::Decryption` if the ciphertext is empty or not a
/// whole number of cipher blocks.
pub fn decrypt(key: &SymmetricKey, encrypted: &EncryptedData) -> Result<Vec<u8>> {
    if encrypted.ciphertext.is_empty() || encrypted.ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::Decryption);
    }

    let mut buf = encrypted.ciphertext.clone();
    Aes128CbcDec::new(key.as_bytes().into(), encrypted.iv.as_bytes().into())
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|_| CryptoError::Decryption)?;

    Ok(buf)
}
