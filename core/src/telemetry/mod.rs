//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for the stream adapters.
//!
//! Notes:
//! - Counters are plain fields owned by the thread that drives the cipher; no
//!   atomics are needed.
//! - Snapshots are serde-serializable for reporting.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
