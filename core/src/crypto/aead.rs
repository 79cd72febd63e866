//! crypto/aead.rs
//! AES-CBC-HMAC-SHA2 cipher/decipher state machine.
//!
//! Design notes:
//! - One skeleton (`CbcHmacState`) shared by two concrete handles, `Cipher`
//!   and `Decipher`, both implementing `AeadStream`.
//! - The HMAC input is always `AAD || IV || ciphertext || AL`, in that order,
//!   in both directions. Encrypt feeds the cipher *output*, decrypt feeds the
//!   cipher *input*; both are the ciphertext stream.
//! - If no AAD is bound before the first `update`/`finalize`, the empty AAD
//!   is bound implicitly so the IV is still authenticated.
//!
//! Lifecycle:
//!
//! ```text
//! Created --set_aad--> AadBound --update*--> Processing --finalize--> Finalized
//! Created --update/finalize (empty AAD, AL = 0)----------------------> ...
//! any state --failure after input was consumed--> Failed
//! ```
//!
//! Security notes:
//! - `Decipher::update` returns plaintext before the tag is checked. Treat it
//!   as provisional and discard it unless `finalize` succeeds.
//! - On decrypt, the tag is verified before CBC padding is inspected.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::constants::{AL_LEN, IV_LEN};
use crate::crypto::aad::{encode_al, AL_ZERO};
use crate::crypto::block::{CbcDecryptor, CbcEncryptor};
use crate::crypto::keys::SplitKeys;
use crate::crypto::mac::{truncate_tag, verify_tag, MacState};
use crate::crypto::types::CryptoError;
use crate::registry::AlgorithmParams;

const MSG_AAD_LATE: &str = "AAD must be set before processing begins";
const MSG_AAD_TWICE: &str = "AAD already set";
const MSG_FINALIZED: &str = "instance already finalized";
const MSG_FAILED: &str = "instance failed; discard it";
const MSG_TAG_EARLY: &str = "auth tag is only available after finalize";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Encrypt => f.write_str("encrypt"),
            Direction::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Instance lifecycle. No transition is reversible.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Created,
    AadBound,
    Processing,
    Finalized,
    /// Terminal errored state; every further call fails with `InvalidState`.
    Failed,
}

/// Shared update/finalize capability of `Cipher` and `Decipher`.
pub trait AeadStream {
    fn params(&self) -> &AlgorithmParams;

    /// Registered name, e.g. `aes-128-cbc-hmac-sha-256`.
    fn algorithm(&self) -> &'static str {
        self.params().name
    }

    fn direction(&self) -> Direction;

    fn lifecycle(&self) -> Lifecycle;

    /// Bind associated data. Only legal before the first `update`/`finalize`,
    /// and at most once.
    ///
    /// If it is never called, the first `update`/`finalize` binds the empty
    /// AAD, so the MAC input still starts with the IV (`AAD = ""`, `AL = 0`).
    /// Implementations that skip the IV when no AAD is set produce different
    /// tags for that case and will not interoperate.
    fn set_aad(&mut self, aad: &[u8]) -> Result<(), CryptoError>;

    /// Process one chunk; returns zero or more output bytes.
    fn update(&mut self, chunk: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Flush the final block and compute (encrypt) or check (decrypt) the tag.
    fn finalize(&mut self) -> Result<Vec<u8>, CryptoError>;
}

/// Direction-independent part: HMAC state, IV, AL and lifecycle.
struct CbcHmacState {
    params: AlgorithmParams,
    mac: Option<MacState>,
    iv: [u8; IV_LEN],
    al: [u8; AL_LEN],
    lifecycle: Lifecycle,
}

impl CbcHmacState {
    /// Validate lengths and key the HMAC. Returns the split keys so the caller
    /// can key its block cipher; they are wiped when dropped.
    fn new(params: &AlgorithmParams, key: &[u8], iv: &[u8]) -> Result<(Self, SplitKeys), CryptoError> {
        if iv.len() != IV_LEN {
            return Err(CryptoError::InvalidIvLength {
                expected: IV_LEN,
                actual: iv.len(),
            });
        }
        let keys = SplitKeys::new(key, params.mac_key_len, params.enc_key_len)?;
        let mac = MacState::new(params.hash, keys.mac_key())?;

        let mut iv_buf = [0u8; IV_LEN];
        iv_buf.copy_from_slice(iv);

        let state = Self {
            params: *params,
            mac: Some(mac),
            iv: iv_buf,
            al: AL_ZERO,
            lifecycle: Lifecycle::Created,
        };
        Ok((state, keys))
    }

    fn check_open(&self) -> Result<(), CryptoError> {
        match self.lifecycle {
            Lifecycle::Finalized => Err(CryptoError::InvalidState(MSG_FINALIZED)),
            Lifecycle::Failed => Err(CryptoError::InvalidState(MSG_FAILED)),
            _ => Ok(()),
        }
    }

    fn mac_mut(&mut self) -> Result<&mut MacState, CryptoError> {
        self.mac.as_mut().ok_or(CryptoError::InvalidState(MSG_FINALIZED))
    }

    fn bind_aad(&mut self, aad: &[u8]) -> Result<(), CryptoError> {
        match self.lifecycle {
            Lifecycle::Created => {}
            Lifecycle::AadBound => return Err(CryptoError::InvalidState(MSG_AAD_TWICE)),
            Lifecycle::Processing => return Err(CryptoError::InvalidState(MSG_AAD_LATE)),
            Lifecycle::Finalized | Lifecycle::Failed => self.check_open()?,
        }
        let al = encode_al(aad.len())?;

        let iv = self.iv;
        let mac = self.mac_mut()?;
        mac.update(aad);
        mac.update(&iv);

        self.al = al;
        self.lifecycle = Lifecycle::AadBound;
        trace!(aad_len = aad.len(), "AAD bound");
        Ok(())
    }

    /// Enter `Processing`, binding the empty AAD first if none was set.
    fn begin(&mut self) -> Result<(), CryptoError> {
        self.check_open()?;
        if self.lifecycle == Lifecycle::Created {
            let iv = self.iv;
            self.mac_mut()?.update(&iv);
        }
        self.lifecycle = Lifecycle::Processing;
        Ok(())
    }

    fn absorb(&mut self, ciphertext: &[u8]) -> Result<(), CryptoError> {
        self.mac_mut()?.update(ciphertext);
        Ok(())
    }

    /// Append AL, finish the HMAC and truncate to `tag_len`.
    fn compute_tag(&mut self) -> Result<Vec<u8>, CryptoError> {
        let mut mac = self.mac.take().ok_or(CryptoError::InvalidState(MSG_FINALIZED))?;
        mac.update(&self.al);
        Ok(truncate_tag(mac.finalize(), self.params.tag_len))
    }

    /// Poison the instance if `result` is an error.
    fn guard<T>(&mut self, result: Result<T, CryptoError>) -> Result<T, CryptoError> {
        if result.is_err() {
            self.lifecycle = Lifecycle::Failed;
        }
        result
    }
}

/// Encrypting handle. Produces ciphertext and, after `finalize`, the tag.
pub struct Cipher {
    state: CbcHmacState,
    block: CbcEncryptor,
    tag: Option<Vec<u8>>,
}

impl Cipher {
    pub fn new(params: &AlgorithmParams, key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        let (state, keys) = CbcHmacState::new(params, key, iv)?;
        let block = CbcEncryptor::new(params.cipher, keys.enc_key(), iv)?;
        debug!(algorithm = params.name, direction = %Direction::Encrypt, "cipher created");
        Ok(Self { state, block, tag: None })
    }

    /// The authentication tag; only available once finalized.
    pub fn auth_tag(&self) -> Result<&[u8], CryptoError> {
        match (self.state.lifecycle, self.tag.as_deref()) {
            (Lifecycle::Finalized, Some(tag)) => Ok(tag),
            _ => Err(CryptoError::InvalidState(MSG_TAG_EARLY)),
        }
    }
}

impl AeadStream for Cipher {
    fn params(&self) -> &AlgorithmParams {
        &self.state.params
    }

    fn direction(&self) -> Direction {
        Direction::Encrypt
    }

    fn lifecycle(&self) -> Lifecycle {
        self.state.lifecycle
    }

    fn set_aad(&mut self, aad: &[u8]) -> Result<(), CryptoError> {
        self.state.bind_aad(aad)
    }

    fn update(&mut self, chunk: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.state.begin()?;
        let out = self.block.update(chunk);
        let out = self.state.guard(out)?;
        let absorbed = self.state.absorb(&out);
        self.state.guard(absorbed)?;

        trace!(in_len = chunk.len(), out_len = out.len(), "encrypt update");
        Ok(out)
    }

    fn finalize(&mut self) -> Result<Vec<u8>, CryptoError> {
        self.state.begin()?;
        let last = self.block.finalize();
        let last = self.state.guard(last)?;
        let absorbed = self.state.absorb(&last);
        self.state.guard(absorbed)?;
        let tag = self.state.compute_tag();
        let tag = self.state.guard(tag)?;

        self.tag = Some(tag);
        self.state.lifecycle = Lifecycle::Finalized;
        debug!(algorithm = self.state.params.name, "cipher finalized");
        Ok(last)
    }
}

/// Decrypting handle. Needs the expected tag before any data is processed.
pub struct Decipher {
    state: CbcHmacState,
    block: CbcDecryptor,
    expected_tag: Option<Vec<u8>>,
}

impl Decipher {
    pub fn new(params: &AlgorithmParams, key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        let (state, keys) = CbcHmacState::new(params, key, iv)?;
        let block = CbcDecryptor::new(params.cipher, keys.enc_key(), iv)?;
        debug!(algorithm = params.name, direction = %Direction::Decrypt, "decipher created");
        Ok(Self {
            state,
            block,
            expected_tag: None,
        })
    }

    /// Store the tag that `finalize` will compare against. May be replaced
    /// any time before `finalize`; its length is checked only at comparison.
    pub fn set_auth_tag(&mut self, tag: &[u8]) -> Result<(), CryptoError> {
        self.state.check_open()?;
        self.expected_tag = Some(tag.to_vec());
        Ok(())
    }

    fn require_tag(&self) -> Result<(), CryptoError> {
        self.state.check_open()?;
        if self.expected_tag.is_none() {
            return Err(CryptoError::MissingAuthTag);
        }
        Ok(())
    }
}

impl AeadStream for Decipher {
    fn params(&self) -> &AlgorithmParams {
        &self.state.params
    }

    fn direction(&self) -> Direction {
        Direction::Decrypt
    }

    fn lifecycle(&self) -> Lifecycle {
        self.state.lifecycle
    }

    fn set_aad(&mut self, aad: &[u8]) -> Result<(), CryptoError> {
        self.state.bind_aad(aad)
    }

    fn update(&mut self, chunk: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.require_tag()?;
        self.state.begin()?;
        let absorbed = self.state.absorb(chunk);
        self.state.guard(absorbed)?;
        let out = self.block.update(chunk);
        let out = self.state.guard(out)?;

        trace!(in_len = chunk.len(), out_len = out.len(), "decrypt update");
        Ok(out)
    }

    fn finalize(&mut self) -> Result<Vec<u8>, CryptoError> {
        self.require_tag()?;
        self.state.begin()?;
        let computed = self.state.compute_tag();
        let computed = self.state.guard(computed)?;

        let expected = self.expected_tag.as_deref().unwrap_or_default();
        if let Err(e) = verify_tag(&computed, expected) {
            self.state.lifecycle = Lifecycle::Failed;
            warn!(algorithm = self.state.params.name, "authentication tag mismatch");
            return Err(e);
        }

        let last = self.block.finalize();
        let last = self.state.guard(last)?;
        self.state.lifecycle = Lifecycle::Finalized;
        debug!(algorithm = self.state.params.name, "decipher finalized");
        Ok(last)
    }
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("algorithm", &self.state.params.name)
            .field("lifecycle", &self.state.lifecycle)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Decipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decipher")
            .field("algorithm", &self.state.params.name)
            .field("lifecycle", &self.state.lifecycle)
            .field("has_tag", &self.expected_tag.is_some())
            .finish_non_exhaustive()
    }
}
