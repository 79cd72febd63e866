//! telemetry/snapshot.rs
//! Immutable telemetry snapshot produced at the end of a stream.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub algorithm: String,
    pub chunks: u64,
    pub bytes_aad: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub bytes_tag: u64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(algorithm: &str, counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_in as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            algorithm: algorithm.to_string(),
            chunks: counters.chunks,
            bytes_aad: counters.bytes_aad,
            bytes_in: counters.bytes_in,
            bytes_out: counters.bytes_out,
            bytes_tag: counters.bytes_tag,
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    /// Time spent on the thread that drives the cipher. `Stage::Read` is
    /// excluded: the pipeline measures it on the reader thread, where it
    /// overlaps the other stages.
    pub fn driver_stage_time(&self) -> Duration {
        self.total_stage_time().saturating_sub(self.stage_times.get(Stage::Read))
    }

    /// Driver-thread stage times never exceed wall time, and CBC output stays
    /// within one block of the input.
    pub fn sanity_check(&self) -> bool {
        self.driver_stage_time() <= self.elapsed
            && self.bytes_out.abs_diff(self.bytes_in) <= crate::constants::BLOCK_LEN as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_copies_counters() {
        let counters = TelemetryCounters {
            chunks: 3,
            bytes_aad: 8,
            bytes_in: 100,
            bytes_out: 112,
            bytes_tag: 16,
        };
        let mut timer = TelemetryTimer::new();
        timer.finish();
        let snap = TelemetrySnapshot::from("aes-128-cbc-hmac-sha-256", &counters, &timer);
        assert_eq!(snap.chunks, 3);
        assert_eq!(snap.bytes_out, 112);
        assert!(snap.sanity_check());
    }

    #[test]
    fn read_time_is_not_charged_against_wall_time() {
        let counters = TelemetryCounters::default();
        let mut timer = TelemetryTimer::new();
        timer.finish();
        let wall = timer.elapsed();
        timer.add_stage_time(Stage::Read, wall + Duration::from_millis(50));

        let snap = TelemetrySnapshot::from("aes-128-cbc-hmac-sha-256", &counters, &timer);
        assert!(snap.total_stage_time() > snap.elapsed);
        assert_eq!(snap.driver_stage_time(), Duration::ZERO);
        assert!(snap.sanity_check());

        timer.add_stage_time(Stage::Encrypt, wall + Duration::from_millis(50));
        let snap = TelemetrySnapshot::from("aes-128-cbc-hmac-sha-256", &counters, &timer);
        assert!(!snap.sanity_check());
    }
}
