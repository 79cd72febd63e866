//! stream/core.rs
//! Buffer-in/buffer-out API.

use crate::crypto::{AeadStream, CryptoError};
use crate::registry::AlgorithmRegistry;

/// Ciphertext and its tag, as produced by `seal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Feed `chunks` through `stream` in order, then finalize.
///
/// On decrypt, an error from `finalize` means everything returned so far must
/// be discarded; this function returns only the error in that case.
pub fn run_chunks<S, I, C>(stream: &mut S, chunks: I) -> Result<Vec<u8>, CryptoError>
where
    S: AeadStream + ?Sized,
    I: IntoIterator<Item = C>,
    C: AsRef<[u8]>,
{
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend(stream.update(chunk.as_ref())?);
    }
    out.extend(stream.finalize()?);
    Ok(out)
}

pub fn seal_with(
    registry: &AlgorithmRegistry,
    algorithm: &str,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Sealed, CryptoError> {
    let mut cipher = registry.create_cipher(algorithm, key, iv)?;
    cipher.set_aad(aad)?;
    let ciphertext = run_chunks(&mut cipher, [plaintext])?;
    let tag = cipher.auth_tag()?.to_vec();
    Ok(Sealed { ciphertext, tag })
}

pub fn open_with(
    registry: &AlgorithmRegistry,
    algorithm: &str,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut decipher = registry.create_decipher(algorithm, key, iv)?;
    decipher.set_aad(aad)?;
    decipher.set_auth_tag(tag)?;
    run_chunks(&mut decipher, [ciphertext])
}

/// Encrypt `plaintext` in one call with the standard registry.
pub fn seal(algorithm: &str, key: &[u8], iv: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Sealed, CryptoError> {
    seal_with(&AlgorithmRegistry::standard(), algorithm, key, iv, aad, plaintext)
}

/// Decrypt and verify in one call. No plaintext is returned on failure.
pub fn open(
    algorithm: &str,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    open_with(&AlgorithmRegistry::standard(), algorithm, key, iv, aad, ciphertext, tag)
}
