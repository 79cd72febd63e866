//! crypto/aad.rs
//! AL field: the 64-bit big-endian bit length of the associated data.
//!
//! Only the low 32 bits are ever populated. AAD whose bit length does not fit
//! in a `u32` is rejected instead of being silently truncated.

use byteorder::{BigEndian, ByteOrder};

use crate::constants::{AL_LEN, MAX_AAD_LEN};
use crate::crypto::types::CryptoError;

/// AL for an empty (or never bound) AAD.
pub const AL_ZERO: [u8; AL_LEN] = [0u8; AL_LEN];

/// Encode `aad_len` bytes as the 8-byte AL field.
#[inline]
pub fn encode_al(aad_len: usize) -> Result<[u8; AL_LEN], CryptoError> {
    validate_aad_len(aad_len)?;

    // aad_len <= u32::MAX / 8, so the product cannot overflow.
    let bits = (aad_len as u64) * 8;
    let mut out = [0u8; AL_LEN];
    BigEndian::write_u64(&mut out, bits);

    debug_assert_eq!(&out[..4], &[0u8; 4]);
    Ok(out)
}

#[inline]
pub fn validate_aad_len(aad_len: usize) -> Result<(), CryptoError> {
    if aad_len > MAX_AAD_LEN {
        return Err(CryptoError::AadTooLong {
            len: aad_len,
            max: MAX_AAD_LEN,
        });
    }
    Ok(())
}
