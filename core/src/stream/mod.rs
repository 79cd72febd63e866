//! stream: adapters that drive a `Cipher`/`Decipher` over buffers, writers
//! and a threaded reader pipeline.
//!
//! Every adapter is a thin loop over the same `AeadStream` calls, so output
//! is byte-identical to calling `update`/`finalize` directly with the same
//! data, however it is chunked.

pub mod core;
pub mod io;
pub mod pipeline;

pub use self::core::{open, open_with, run_chunks, seal, seal_with, Sealed};
pub use self::io::{copy_through, read_exact_or_eof, DecryptWriter, EncryptWriter};
pub use self::pipeline::{run_decrypt_pipeline, run_encrypt_pipeline, EncryptOutcome};
