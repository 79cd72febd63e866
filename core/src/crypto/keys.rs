//! crypto/keys.rs
//! Combined-key splitting.
//!
//! Layout of the combined key K:
//!
//! ```text
//! K = MAC_KEY (mac_key_len bytes) || ENC_KEY (enc_key_len bytes)
//! ```
//!
//! The length must match exactly; K is never truncated or padded.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::types::CryptoError;

/// Split `key` into `(MAC_KEY, ENC_KEY)` borrowed slices.
#[inline]
pub fn split_key(
    key: &[u8],
    mac_key_len: usize,
    enc_key_len: usize,
) -> Result<(&[u8], &[u8]), CryptoError> {
    let expected = mac_key_len + enc_key_len;
    if key.len() != expected {
        return Err(CryptoError::InvalidKeyLength {
            expected,
            actual: key.len(),
        });
    }
    Ok(key.split_at(mac_key_len))
}

/// Owned MAC/ENC keys, wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SplitKeys {
    mac_key: Vec<u8>,
    enc_key: Vec<u8>,
}

impl SplitKeys {
    pub fn new(key: &[u8], mac_key_len: usize, enc_key_len: usize) -> Result<Self, CryptoError> {
        let (mac_key, enc_key) = split_key(key, mac_key_len, enc_key_len)?;
        Ok(Self {
            mac_key: mac_key.to_vec(),
            enc_key: enc_key.to_vec(),
        })
    }

    pub(crate) fn mac_key(&self) -> &[u8] {
        &self.mac_key
    }

    pub(crate) fn enc_key(&self) -> &[u8] {
        &self.enc_key
    }
}

impl std::fmt::Debug for SplitKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitKeys")
            .field("mac_key_len", &self.mac_key.len())
            .field("enc_key_len", &self.enc_key.len())
            .finish()
    }
}
