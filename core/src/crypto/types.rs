//! crypto/types.rs
//! Shared identifiers and the crypto error taxonomy.

use std::fmt;

use num_enum::TryFromPrimitive;
use thiserror::Error;

use crate::constants::{cipher_ids, hash_ids};

/// Block cipher in CBC mode with PKCS#7 padding.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum CipherId {
    Aes128Cbc = cipher_ids::AES128_CBC,
    Aes192Cbc = cipher_ids::AES192_CBC,
    Aes256Cbc = cipher_ids::AES256_CBC,
}

impl CipherId {
    /// AES key length in bytes.
    pub const fn key_len(self) -> usize {
        match self {
            CipherId::Aes128Cbc => 16,
            CipherId::Aes192Cbc => 24,
            CipherId::Aes256Cbc => 32,
        }
    }

    pub fn verify(raw: u16) -> Result<Self, CryptoError> {
        Self::try_from_primitive(raw).map_err(|_| CryptoError::UnknownCipherId(raw))
    }
}

impl fmt::Display for CipherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipherId::Aes128Cbc => "aes-128-cbc",
            CipherId::Aes192Cbc => "aes-192-cbc",
            CipherId::Aes256Cbc => "aes-256-cbc",
        };
        f.write_str(name)
    }
}

/// Hash function driving the HMAC.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum HashId {
    Sha256 = hash_ids::SHA256,
    Sha384 = hash_ids::SHA384,
    Sha512 = hash_ids::SHA512,
}

impl HashId {
    /// Untruncated HMAC output length in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            HashId::Sha256 => 32,
            HashId::Sha384 => 48,
            HashId::Sha512 => 64,
        }
    }

    pub fn verify(raw: u16) -> Result<Self, CryptoError> {
        Self::try_from_primitive(raw).map_err(|_| CryptoError::UnknownHashId(raw))
    }
}

impl fmt::Display for HashId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashId::Sha256 => "sha256",
            HashId::Sha384 => "sha384",
            HashId::Sha512 => "sha512",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Combined key does not equal `mac_key_len + enc_key_len`.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// IV must be exactly one AES block.
    #[error("invalid IV length: expected={expected}, actual={actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    /// Operation called out of order, or on a finalized/failed instance.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("No authTag provided. Use decipher#setAuthTag method first.")]
    MissingAuthTag,

    /// Computed tag differs from the expected one.
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// AAD bit length does not fit in 32 bits.
    #[error("AAD too long: len={len}, max={max}")]
    AadTooLong { len: usize, max: usize },

    /// Authenticated ciphertext with a bad length or padding.
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(&'static str),

    #[error("unknown cipher id: 0x{0:04x}")]
    UnknownCipherId(u16),

    #[error("unknown hash id: 0x{0:04x}")]
    UnknownHashId(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_primitive() {
        assert_eq!(CipherId::verify(0x0102), Ok(CipherId::Aes192Cbc));
        assert_eq!(HashId::verify(0x0003), Ok(HashId::Sha512));
        assert_eq!(CipherId::verify(0x0999), Err(CryptoError::UnknownCipherId(0x0999)));
        assert_eq!(HashId::verify(0), Err(CryptoError::UnknownHashId(0)));
    }

    #[test]
    fn display_names() {
        assert_eq!(CipherId::Aes256Cbc.to_string(), "aes-256-cbc");
        assert_eq!(HashId::Sha384.to_string(), "sha384");
        assert_eq!(
            CryptoError::UnknownCipherId(0x10).to_string(),
            "unknown cipher id: 0x0010"
        );
    }
}
