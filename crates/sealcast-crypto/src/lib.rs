//! # sealcast-crypto
//!
//! Cryptographic primitives for the Sealcast broadcast-encryption scheme.
//!
//! This crate provides:
//! - **AES-128-CBC** symmetric encryption with internally generated random IVs
//! - **Block padding** to the 16-byte cipher block size
//! - **Key generation** from the operating system CSPRNG
//!
//! ## Security
//!
//! All secret data uses `zeroize` for secure memory cleanup.
//! Key comparisons use constant-time operations via `subtle`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod padding;
pub mod symmetric;

pub use error::{CryptoError, Result};
pub use padding::{pad, unpad, PaddingError};
pub use symmetric::{
    decrypt, encrypt, EncryptedData, Iv, SymmetricKey, BLOCK_SIZE, IV_SIZE, KEY_SIZE,
};
