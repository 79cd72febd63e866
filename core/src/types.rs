use std::io;

use thiserror::Error;

use crate::crypto::CryptoError;

/// Unified error for the streaming adapters: I/O, crypto, config and pipeline.
/// - `From<T>` impls enable `?` across layers.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Out-of-range stream configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Pipeline wiring failure (closed channel, panicked reader).
    #[error("pipeline error: {0}")]
    Pipeline(&'static str),
}

impl StreamError {
    /// The underlying crypto error, if any.
    pub fn as_crypto(&self) -> Option<&CryptoError> {
        match self {
            StreamError::Crypto(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Io(inner) => inner,
            StreamError::Crypto(CryptoError::AuthenticationFailed) => {
                io::Error::new(io::ErrorKind::InvalidData, e)
            }
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}
