//! crypto/block.rs
//! Streaming AES-CBC with PKCS#7 padding.
//!
//! Design notes:
//! - `update` may be called with any chunking; partial blocks are buffered
//!   across calls, so output only ever contains whole blocks.
//! - The decryptor withholds the last complete block until `finalize`, since
//!   only then is it known to carry the padding.
//! - Each side can be finalized exactly once.

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::constants::{BLOCK_LEN, IV_LEN};
use crate::crypto::types::{CipherId, CryptoError};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes192CbcEnc = cbc::Encryptor<Aes192>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes192CbcDec = cbc::Decryptor<Aes192>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

fn check_lengths(cipher: CipherId, key: &[u8], iv: &[u8]) -> Result<(), CryptoError> {
    if key.len() != cipher.key_len() {
        return Err(CryptoError::InvalidKeyLength {
            expected: cipher.key_len(),
            actual: key.len(),
        });
    }
    if iv.len() != IV_LEN {
        return Err(CryptoError::InvalidIvLength {
            expected: IV_LEN,
            actual: iv.len(),
        });
    }
    Ok(())
}

fn key_error(cipher: CipherId, key: &[u8]) -> CryptoError {
    CryptoError::InvalidKeyLength {
        expected: cipher.key_len(),
        actual: key.len(),
    }
}

enum EncInner {
    Aes128(Aes128CbcEnc),
    Aes192(Aes192CbcEnc),
    Aes256(Aes256CbcEnc),
}

/// CBC encryptor with internal block buffering.
pub struct CbcEncryptor {
    cipher: CipherId,
    inner: EncInner,
    pending: Vec<u8>,
    finalized: bool,
}

impl CbcEncryptor {
    pub fn new(cipher: CipherId, key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        check_lengths(cipher, key, iv)?;
        let inner = match cipher {
            CipherId::Aes128Cbc => EncInner::Aes128(
                Aes128CbcEnc::new_from_slices(key, iv).map_err(|_| key_error(cipher, key))?,
            ),
            CipherId::Aes192Cbc => EncInner::Aes192(
                Aes192CbcEnc::new_from_slices(key, iv).map_err(|_| key_error(cipher, key))?,
            ),
            CipherId::Aes256Cbc => EncInner::Aes256(
                Aes256CbcEnc::new_from_slices(key, iv).map_err(|_| key_error(cipher, key))?,
            ),
        };
        Ok(Self {
            cipher,
            inner,
            pending: Vec::with_capacity(BLOCK_LEN),
            finalized: false,
        })
    }

    pub fn cipher(&self) -> CipherId {
        self.cipher
    }

    fn encrypt_blocks(&mut self, data: &mut [u8]) {
        debug_assert_eq!(data.len() % BLOCK_LEN, 0);
        for chunk in data.chunks_exact_mut(BLOCK_LEN) {
            let block = GenericArray::from_mut_slice(chunk);
            match &mut self.inner {
                EncInner::Aes128(c) => c.encrypt_block_mut(block),
                EncInner::Aes192(c) => c.encrypt_block_mut(block),
                EncInner::Aes256(c) => c.encrypt_block_mut(block),
            }
        }
    }

    /// Encrypt every complete block available so far.
    pub fn update(&mut self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if self.finalized {
            return Err(CryptoError::InvalidState("block cipher already finalized"));
        }
        self.pending.extend_from_slice(input);

        let ready = self.pending.len() - self.pending.len() % BLOCK_LEN;
        let mut out: Vec<u8> = self.pending.drain(..ready).collect();
        self.encrypt_blocks(&mut out);
        Ok(out)
    }

    /// Pad the buffered tail and emit the final block.
    pub fn finalize(&mut self) -> Result<Vec<u8>, CryptoError> {
        if self.finalized {
            return Err(CryptoError::InvalidState("block cipher already finalized"));
        }
        self.finalized = true;

        let mut out = std::mem::take(&mut self.pending);
        let pad = BLOCK_LEN - out.len();
        out.resize(BLOCK_LEN, pad as u8);
        self.encrypt_blocks(&mut out);
        Ok(out)
    }
}

enum DecInner {
    Aes128(Aes128CbcDec),
    Aes192(Aes192CbcDec),
    Aes256(Aes256CbcDec),
}

/// CBC decryptor; the last block is held back for padding removal.
pub struct CbcDecryptor {
    cipher: CipherId,
    inner: DecInner,
    pending: Vec<u8>,
    finalized: bool,
}

impl CbcDecryptor {
    pub fn new(cipher: CipherId, key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        check_lengths(cipher, key, iv)?;
        let inner = match cipher {
            CipherId::Aes128Cbc => DecInner::Aes128(
                Aes128CbcDec::new_from_slices(key, iv).map_err(|_| key_error(cipher, key))?,
            ),
            CipherId::Aes192Cbc => DecInner::Aes192(
                Aes192CbcDec::new_from_slices(key, iv).map_err(|_| key_error(cipher, key))?,
            ),
            CipherId::Aes256Cbc => DecInner::Aes256(
                Aes256CbcDec::new_from_slices(key, iv).map_err(|_| key_error(cipher, key))?,
            ),
        };
        Ok(Self {
            cipher,
            inner,
            pending: Vec::with_capacity(2 * BLOCK_LEN),
            finalized: false,
        })
    }

    pub fn cipher(&self) -> CipherId {
        self.cipher
    }

    fn decrypt_blocks(&mut self, data: &mut [u8]) {
        debug_assert_eq!(data.len() % BLOCK_LEN, 0);
        for chunk in data.chunks_exact_mut(BLOCK_LEN) {
            let block = GenericArray::from_mut_slice(chunk);
            match &mut self.inner {
                DecInner::Aes128(c) => c.decrypt_block_mut(block),
                DecInner::Aes192(c) => c.decrypt_block_mut(block),
                DecInner::Aes256(c) => c.decrypt_block_mut(block),
            }
        }
    }

    /// Decrypt every complete block except the most recent one.
    pub fn update(&mut self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if self.finalized {
            return Err(CryptoError::InvalidState("block cipher already finalized"));
        }
        self.pending.extend_from_slice(input);

        let len = self.pending.len();
        let keep = match len % BLOCK_LEN {
            0 => len.min(BLOCK_LEN),
            rem => rem,
        };
        let mut out: Vec<u8> = self.pending.drain(..len - keep).collect();
        self.decrypt_blocks(&mut out);
        Ok(out)
    }

    /// Decrypt the withheld block and strip PKCS#7 padding.
    pub fn finalize(&mut self) -> Result<Vec<u8>, CryptoError> {
        if self.finalized {
            return Err(CryptoError::InvalidState("block cipher already finalized"));
        }
        self.finalized = true;

        let mut out = std::mem::take(&mut self.pending);
        if out.len() != BLOCK_LEN {
            return Err(CryptoError::InvalidCiphertext(
                "length is not a positive multiple of the block size",
            ));
        }
        self.decrypt_blocks(&mut out);

        let pad = out[BLOCK_LEN - 1] as usize;
        if pad == 0 || pad > BLOCK_LEN || out[BLOCK_LEN - pad..].iter().any(|&b| b as usize != pad) {
            return Err(CryptoError::InvalidCiphertext("bad padding"));
        }
        out.truncate(BLOCK_LEN - pad);
        Ok(out)
    }
}

impl std::fmt::Debug for CbcEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CbcEncryptor")
            .field("cipher", &self.cipher)
            .field("pending", &self.pending.len())
            .field("finalized", &self.finalized)
            .finish()
    }
}

impl std::fmt::Debug for CbcDecryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CbcDecryptor")
            .field("cipher", &self.cipher)
            .field("pending", &self.pending.len())
            .field("finalized", &self.finalized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_128: [u8; 16] = [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
    ];
    const IV: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    ];

    fn encrypt_all(cipher: CipherId, key: &[u8], data: &[u8], chunk: usize) -> Vec<u8> {
        let mut enc = CbcEncryptor::new(cipher, key, &IV).unwrap();
        let mut out = Vec::new();
        for piece in data.chunks(chunk.max(1)) {
            out.extend(enc.update(piece).unwrap());
        }
        out.extend(enc.finalize().unwrap());
        out
    }

    fn decrypt_all(cipher: CipherId, key: &[u8], data: &[u8], chunk: usize) -> Result<Vec<u8>, CryptoError> {
        let mut dec = CbcDecryptor::new(cipher, key, &IV).unwrap();
        let mut out = Vec::new();
        for piece in data.chunks(chunk.max(1)) {
            out.extend(dec.update(piece)?);
        }
        out.extend(dec.finalize()?);
        Ok(out)
    }

    #[test]
    fn sp800_38a_first_block() {
        // NIST SP 800-38A F.2.1, first block; the second block is padding.
        let pt = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let ct = encrypt_all(CipherId::Aes128Cbc, &KEY_128, &pt, 16);
        assert_eq!(ct.len(), 32);
        assert_eq!(hex::encode(&ct[..16]), "7649abac8119b246cee98e9b12e9197d");
    }

    #[test]
    fn padding_always_added() {
        for len in [0usize, 1, 15, 16, 17, 32] {
            let ct = encrypt_all(CipherId::Aes128Cbc, &KEY_128, &vec![7u8; len], 5);
            assert_eq!(ct.len(), (len / BLOCK_LEN + 1) * BLOCK_LEN);
        }
    }

    #[test]
    fn chunking_does_not_change_output() {
        let data: Vec<u8> = (0..100u8).collect();
        let key = [9u8; 32];
        let whole = encrypt_all(CipherId::Aes256Cbc, &key, &data, data.len());
        for chunk in [1usize, 3, 16, 17, 64] {
            assert_eq!(encrypt_all(CipherId::Aes256Cbc, &key, &data, chunk), whole);
            assert_eq!(decrypt_all(CipherId::Aes256Cbc, &key, &whole, chunk).unwrap(), data);
        }
    }

    #[test]
    fn decryptor_withholds_last_block() {
        let key = [1u8; 24];
        let ct = encrypt_all(CipherId::Aes192Cbc, &key, &[0u8; 32], 32);
        let mut dec = CbcDecryptor::new(CipherId::Aes192Cbc, &key, &IV).unwrap();
        assert_eq!(dec.update(&ct[..16]).unwrap().len(), 0);
        assert_eq!(dec.update(&ct[16..]).unwrap().len(), 32);
        assert_eq!(dec.finalize().unwrap().len(), 0);
    }

    #[test]
    fn truncated_ciphertext_rejected() {
        let ct = encrypt_all(CipherId::Aes128Cbc, &KEY_128, b"hello", 5);
        assert!(matches!(
            decrypt_all(CipherId::Aes128Cbc, &KEY_128, &ct[..15], 4),
            Err(CryptoError::InvalidCiphertext(_))
        ));
        assert!(matches!(
            decrypt_all(CipherId::Aes128Cbc, &KEY_128, &[], 1),
            Err(CryptoError::InvalidCiphertext(_))
        ));
    }

    #[test]
    fn double_finalize_rejected() {
        let mut enc = CbcEncryptor::new(CipherId::Aes128Cbc, &KEY_128, &IV).unwrap();
        enc.finalize().unwrap();
        assert!(matches!(enc.finalize(), Err(CryptoError::InvalidState(_))));
        assert!(matches!(enc.update(b"x"), Err(CryptoError::InvalidState(_))));
    }

    #[test]
    fn length_checks() {
        assert_eq!(
            CbcEncryptor::new(CipherId::Aes256Cbc, &[0u8; 16], &IV).unwrap_err(),
            CryptoError::InvalidKeyLength { expected: 32, actual: 16 }
        );
        assert_eq!(
            CbcDecryptor::new(CipherId::Aes128Cbc, &KEY_128, &IV[..12]).unwrap_err(),
            CryptoError::InvalidIvLength { expected: 16, actual: 12 }
        );
    }
}
