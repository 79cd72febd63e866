//! telemetry/counters.rs
//! Mutable counters used while a stream is processed.
//!
//! Summary: chunk and byte counts on both sides of the cipher.
//! Converted into an immutable `TelemetrySnapshot` when the stream ends.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub chunks: u64,
    pub bytes_aad: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub bytes_tag: u64,
}

impl TelemetryCounters {
    pub fn add_aad(&mut self, aad_len: usize) {
        self.bytes_aad += aad_len as u64;
    }

    /// Record one `update` call.
    pub fn add_chunk(&mut self, in_len: usize, out_len: usize) {
        self.chunks += 1;
        self.bytes_in += in_len as u64;
        self.bytes_out += out_len as u64;
    }

    /// Record the bytes returned by `finalize`.
    pub fn add_final(&mut self, out_len: usize, tag_len: usize) {
        self.bytes_out += out_len as u64;
        self.bytes_tag += tag_len as u64;
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.chunks += other.chunks;
        self.bytes_aad += other.bytes_aad;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
        self.bytes_tag += other.bytes_tag;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates() {
        let mut c = TelemetryCounters::default();
        c.add_aad(42);
        c.add_chunk(100, 96);
        c.add_chunk(28, 32);
        c.add_final(16, 16);
        assert_eq!(c.chunks, 2);
        assert_eq!(c.bytes_in, 128);
        assert_eq!(c.bytes_out, 144);

        let mut total = TelemetryCounters::default();
        total += c.clone();
        total += c;
        assert_eq!(total.bytes_aad, 84);
        assert_eq!(total.bytes_tag, 32);
    }
}
