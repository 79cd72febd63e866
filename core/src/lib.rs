//! cbc-hmac-core
//!
//! Streaming AES-CBC + HMAC-SHA2 authenticated encryption
//! (AEAD_AES_*_CBC_HMAC_SHA_* composition).
//! Pure Rust, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod config;
pub mod constants;
pub mod types;

// Primitives and the AEAD state machine
pub mod crypto;
pub mod registry;
pub mod telemetry;

// Stream layers
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::StreamConfig;
    pub use crate::crypto::{AeadStream, Cipher, CipherId, CryptoError, Decipher, Direction, HashId, Lifecycle};
    pub use crate::registry::{
        create_cipher, create_decipher, list_supported_algorithms, AlgorithmParams, AlgorithmRegistry,
    };
    pub use crate::stream::{
        open, run_decrypt_pipeline, run_encrypt_pipeline, seal, DecryptWriter, EncryptOutcome, EncryptWriter, Sealed,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::StreamError;
}
