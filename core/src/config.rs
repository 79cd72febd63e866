//! config.rs
//! Tunables for the streaming adapters.
//!
//! The library never reads files or environment variables; callers build a
//! `StreamConfig` directly or deserialize one from their own configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_QUEUE_CAP, MAX_CHUNK_SIZE, MAX_QUEUE_CAP, MIN_CHUNK_SIZE};
use crate::types::StreamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Bytes read from the source per `update` call.
    pub chunk_size: usize,

    /// Chunks allowed in flight between the reader thread and the cipher.
    /// A full queue blocks the reader (backpressure).
    pub queue_cap: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            queue_cap: DEFAULT_QUEUE_CAP,
        }
    }
}

impl StreamConfig {
    /// `None` falls back to the default for that field.
    pub fn new(chunk_size: Option<usize>, queue_cap: Option<usize>) -> Self {
        Self {
            chunk_size: chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            queue_cap: queue_cap.unwrap_or(DEFAULT_QUEUE_CAP),
        }
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(StreamError::Config(format!(
                "chunk_size={} outside {}..={}",
                self.chunk_size, MIN_CHUNK_SIZE, MAX_CHUNK_SIZE
            )));
        }
        if !(1..=MAX_QUEUE_CAP).contains(&self.queue_cap) {
            return Err(StreamError::Config(format!(
                "queue_cap={} outside 1..={}",
                self.queue_cap, MAX_QUEUE_CAP
            )));
        }
        Ok(())
    }
}
