//! registry.rs
//! Named AES-CBC-HMAC-SHA2 constructions and their parameters.
//!
//! The table is static and read-only, so lookups are safe from any thread.
//! `AlgorithmRegistry` is a plain value handed to call sites; the free
//! functions at the bottom use the standard table.

use std::collections::BTreeSet;

use crate::constants::alg_names;
use crate::crypto::aead::{Cipher, Decipher};
use crate::crypto::types::{CipherId, CryptoError, HashId};

/// Parameter tuple of one construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AlgorithmParams {
    pub name: &'static str,
    pub cipher: CipherId,
    pub hash: HashId,
    pub mac_key_len: usize,
    pub enc_key_len: usize,
    pub tag_len: usize,
}

impl AlgorithmParams {
    /// Length of the combined key: `mac_key_len + enc_key_len`.
    pub const fn key_len(&self) -> usize {
        self.mac_key_len + self.enc_key_len
    }

    /// Stable numeric `(cipher_id, hash_id)` pair, for callers that store the
    /// algorithm in a binary header instead of by name.
    pub const fn ids(&self) -> (u16, u16) {
        (self.cipher as u16, self.hash as u16)
    }
}

/// The four standard constructions.
pub const STANDARD_ALGORITHMS: [AlgorithmParams; 4] = [
    AlgorithmParams {
        name: alg_names::AES_128_CBC_HMAC_SHA_256,
        cipher: CipherId::Aes128Cbc,
        hash: HashId::Sha256,
        mac_key_len: 16,
        enc_key_len: 16,
        tag_len: 16,
    },
    AlgorithmParams {
        name: alg_names::AES_192_CBC_HMAC_SHA_384,
        cipher: CipherId::Aes192Cbc,
        hash: HashId::Sha384,
        mac_key_len: 24,
        enc_key_len: 24,
        tag_len: 24,
    },
    AlgorithmParams {
        name: alg_names::AES_256_CBC_HMAC_SHA_512,
        cipher: CipherId::Aes256Cbc,
        hash: HashId::Sha512,
        mac_key_len: 32,
        enc_key_len: 32,
        tag_len: 32,
    },
    AlgorithmParams {
        name: alg_names::AES_256_CBC_HMAC_SHA_384,
        cipher: CipherId::Aes256Cbc,
        hash: HashId::Sha384,
        mac_key_len: 24,
        enc_key_len: 32,
        tag_len: 24,
    },
];

#[derive(Copy, Clone, Debug)]
pub struct AlgorithmRegistry {
    entries: &'static [AlgorithmParams],
}

impl AlgorithmRegistry {
    pub const fn standard() -> Self {
        Self {
            entries: &STANDARD_ALGORITHMS,
        }
    }

    pub fn resolve(&self, name: &str) -> Result<&'static AlgorithmParams, CryptoError> {
        self.entries
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| CryptoError::UnknownAlgorithm(name.to_string()))
    }

    /// Look up a construction by its numeric ids (see `AlgorithmParams::ids`).
    /// Raw values outside the id tables fail with `UnknownCipherId`/`UnknownHashId`.
    pub fn resolve_ids(&self, cipher_id: u16, hash_id: u16) -> Result<&'static AlgorithmParams, CryptoError> {
        let cipher = CipherId::verify(cipher_id)?;
        let hash = HashId::verify(hash_id)?;
        self.entries
            .iter()
            .find(|p| p.cipher == cipher && p.hash == hash)
            .ok_or_else(|| CryptoError::UnknownAlgorithm(format!("{cipher}-hmac-{hash}")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|p| p.name == name)
    }

    pub fn list_names(&self) -> BTreeSet<&'static str> {
        self.entries.iter().map(|p| p.name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static AlgorithmParams> {
        self.entries.iter()
    }

    pub fn create_cipher(&self, name: &str, key: &[u8], iv: &[u8]) -> Result<Cipher, CryptoError> {
        Cipher::new(self.resolve(name)?, key, iv)
    }

    pub fn create_decipher(&self, name: &str, key: &[u8], iv: &[u8]) -> Result<Decipher, CryptoError> {
        Decipher::new(self.resolve(name)?, key, iv)
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Create an encrypting handle for a standard algorithm.
pub fn create_cipher(name: &str, key: &[u8], iv: &[u8]) -> Result<Cipher, CryptoError> {
    AlgorithmRegistry::standard().create_cipher(name, key, iv)
}

/// Create a decrypting handle for a standard algorithm.
pub fn create_decipher(name: &str, key: &[u8], iv: &[u8]) -> Result<Decipher, CryptoError> {
    AlgorithmRegistry::standard().create_decipher(name, key, iv)
}

pub fn list_supported_algorithms() -> BTreeSet<&'static str> {
    AlgorithmRegistry::standard().list_names()
}
