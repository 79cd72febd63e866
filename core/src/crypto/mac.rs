//! crypto/mac.rs
//! HMAC-SHA2 state selected by `HashId`, plus tag truncation and comparison.

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use crate::crypto::types::{CryptoError, HashId};

/// Internal keyed-hash state.
#[derive(Clone)]
pub enum MacState {
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
}

impl MacState {
    /// Key an HMAC for `hash`. HMAC accepts keys of any length.
    pub fn new(hash: HashId, mac_key: &[u8]) -> Result<Self, CryptoError> {
        let invalid = |_| CryptoError::InvalidKeyLength {
            expected: hash.output_len(),
            actual: mac_key.len(),
        };
        let state = match hash {
            HashId::Sha256 => MacState::Sha256(Hmac::<Sha256>::new_from_slice(mac_key).map_err(invalid)?),
            HashId::Sha384 => MacState::Sha384(Hmac::<Sha384>::new_from_slice(mac_key).map_err(invalid)?),
            HashId::Sha512 => MacState::Sha512(Hmac::<Sha512>::new_from_slice(mac_key).map_err(invalid)?),
        };
        Ok(state)
    }

    #[inline]
    pub fn hash(&self) -> HashId {
        match self {
            MacState::Sha256(_) => HashId::Sha256,
            MacState::Sha384(_) => HashId::Sha384,
            MacState::Sha512(_) => HashId::Sha512,
        }
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        match self {
            MacState::Sha256(h) => h.update(data),
            MacState::Sha384(h) => h.update(data),
            MacState::Sha512(h) => h.update(data),
        }
    }

    /// Full, untruncated HMAC output.
    #[inline]
    pub fn finalize(self) -> Vec<u8> {
        match self {
            MacState::Sha256(h) => h.finalize().into_bytes().to_vec(),
            MacState::Sha384(h) => h.finalize().into_bytes().to_vec(),
            MacState::Sha512(h) => h.finalize().into_bytes().to_vec(),
        }
    }
}

impl std::fmt::Debug for MacState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MacState(hmac-{})", self.hash())
    }
}

/// Keep the leading `tag_len` bytes of a MAC output.
#[inline]
pub fn truncate_tag(mut mac: Vec<u8>, tag_len: usize) -> Vec<u8> {
    debug_assert!(mac.len() >= tag_len);
    mac.truncate(tag_len);
    mac
}

/// Constant-time tag comparison. Tags of different length never match.
#[inline]
pub fn verify_tag(computed: &[u8], expected: &[u8]) -> Result<(), CryptoError> {
    if computed.len() != expected.len() {
        return Err(CryptoError::AuthenticationFailed);
    }
    if bool::from(computed.ct_eq(expected)) {
        Ok(())
    } else {
        Err(CryptoError::AuthenticationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4231 test case 2.
    const KEY: &[u8] = b"Jefe";
    const DATA: &[u8] = b"what do ya want for nothing?";

    #[test]
    fn hmac_sha256_rfc4231() {
        let mut mac = MacState::new(HashId::Sha256, KEY).unwrap();
        mac.update(DATA);
        assert_eq!(
            hex::encode(mac.finalize()),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn split_updates_match_single_update() {
        for hash in [HashId::Sha256, HashId::Sha384, HashId::Sha512] {
            let mut a = MacState::new(hash, KEY).unwrap();
            a.update(DATA);

            let mut b = MacState::new(hash, KEY).unwrap();
            for piece in DATA.chunks(5) {
                b.update(piece);
            }

            let out = a.finalize();
            assert_eq!(out.len(), hash.output_len());
            assert_eq!(out, b.finalize());
        }
    }

    #[test]
    fn truncation_keeps_prefix() {
        let full: Vec<u8> = (0u8..64).collect();
        assert_eq!(truncate_tag(full.clone(), 24), &full[..24]);
    }

    #[test]
    fn verify_rejects_length_and_content_mismatch() {
        assert!(verify_tag(&[1, 2, 3], &[1, 2, 3]).is_ok());
        assert_eq!(verify_tag(&[1, 2, 3], &[1, 2]), Err(CryptoError::AuthenticationFailed));
        assert_eq!(verify_tag(&[1, 2, 3], &[1, 2, 4]), Err(CryptoError::AuthenticationFailed));
        assert_eq!(verify_tag(&[], &[0]), Err(CryptoError::AuthenticationFailed));
    }
}
