//! stream/pipeline.rs
//! Reader thread -> bounded channel -> cipher -> writer.
//!
//! The reader thread pulls `chunk_size` blocks from the source and pushes
//! them into a bounded crossbeam channel; a full channel blocks the reader.
//! The calling thread owns the cipher state and the writer, so the state
//! machine is never shared across threads.

use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam::channel::bounded;
use tracing::{debug, info, warn};

use crate::config::StreamConfig;
use crate::crypto::{AeadStream, Cipher, Decipher};
use crate::stream::io::read_exact_or_eof;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::StreamError;

/// Result of a successful encrypt pipeline.
#[derive(Debug, Clone)]
pub struct EncryptOutcome {
    pub tag: Vec<u8>,
    pub telemetry: TelemetrySnapshot,
}

/// Pump `reader` through `stream` into `writer`, recording into `counters` and `timer`.
fn drive<R, W, S>(
    mut reader: R,
    writer: &mut W,
    stream: &mut S,
    config: &StreamConfig,
    stage: Stage,
    counters: &mut TelemetryCounters,
    timer: &mut TelemetryTimer,
) -> Result<(), StreamError>
where
    R: Read + Send,
    W: Write + ?Sized,
    S: AeadStream + ?Sized,
{
    let chunk_size = config.chunk_size;
    let (chunk_tx, chunk_rx) = bounded::<io::Result<Bytes>>(config.queue_cap);

    let read_time = thread::scope(|scope| -> Result<Duration, StreamError> {
        // ---- Reader thread ----
        let reader_handle = scope.spawn(move || {
            let mut read_time = Duration::ZERO;
            loop {
                let t = Instant::now();
                let res = read_exact_or_eof(&mut reader, chunk_size);
                read_time += t.elapsed();

                match res {
                    Ok(buf) if buf.is_empty() => break,
                    Ok(buf) => {
                        // A closed channel means the consumer gave up.
                        if chunk_tx.send(Ok(buf)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = chunk_tx.send(Err(e));
                        break;
                    }
                }
            }
            read_time
        });

        // ---- Cipher + writer (this thread) ----
        let consumed = (|| -> Result<(), StreamError> {
            for msg in chunk_rx.iter() {
                let chunk = msg?;
                let out = timer.time(stage, || stream.update(&chunk))?;
                counters.add_chunk(chunk.len(), out.len());
                timer.time(Stage::Write, || writer.write_all(&out))?;
            }
            Ok(())
        })();
        // Unblock the reader if we stopped early.
        drop(chunk_rx);

        let read_time = reader_handle
            .join()
            .map_err(|_| StreamError::Pipeline("reader thread panicked"))?;
        consumed?;
        Ok(read_time)
    })?;
    timer.add_stage_time(Stage::Read, read_time);

    let last = timer.time(stage, || stream.finalize())?;
    timer.time(Stage::Write, || -> io::Result<()> {
        writer.write_all(&last)?;
        writer.flush()
    })?;
    counters.add_final(last.len(), 0);
    Ok(())
}

/// Encrypt `reader` into `writer` using a fresh `cipher`.
///
/// `aad`, when given, is bound before the first chunk.
pub fn run_encrypt_pipeline<R, W>(
    reader: R,
    mut writer: W,
    mut cipher: Cipher,
    aad: Option<&[u8]>,
    config: &StreamConfig,
) -> Result<EncryptOutcome, StreamError>
where
    R: Read + Send,
    W: Write,
{
    config.validate()?;
    let algorithm = cipher.algorithm();
    debug!(algorithm, chunk_size = config.chunk_size, queue_cap = config.queue_cap, "encrypt pipeline start");

    let mut counters = TelemetryCounters::default();
    let mut timer = TelemetryTimer::new();

    if let Some(aad) = aad {
        cipher.set_aad(aad)?;
        counters.add_aad(aad.len());
    }

    drive(reader, &mut writer, &mut cipher, config, Stage::Encrypt, &mut counters, &mut timer)?;

    let tag = cipher.auth_tag()?.to_vec();
    counters.bytes_tag += tag.len() as u64;
    timer.finish();

    let telemetry = TelemetrySnapshot::from(algorithm, &counters, &timer);
    info!(algorithm, bytes_in = telemetry.bytes_in, bytes_out = telemetry.bytes_out, "encrypt pipeline done");
    Ok(EncryptOutcome { tag, telemetry })
}

/// Decrypt `reader` into `writer`, verifying `tag` at the end.
///
/// Plaintext is written as it is produced. If this returns an error, whatever
/// already reached `writer` is unauthenticated and must be discarded.
pub fn run_decrypt_pipeline<R, W>(
    reader: R,
    mut writer: W,
    mut decipher: Decipher,
    aad: Option<&[u8]>,
    tag: &[u8],
    config: &StreamConfig,
) -> Result<TelemetrySnapshot, StreamError>
where
    R: Read + Send,
    W: Write,
{
    config.validate()?;
    let algorithm = decipher.algorithm();
    debug!(algorithm, chunk_size = config.chunk_size, queue_cap = config.queue_cap, "decrypt pipeline start");

    let mut counters = TelemetryCounters::default();
    let mut timer = TelemetryTimer::new();

    if let Some(aad) = aad {
        decipher.set_aad(aad)?;
        counters.add_aad(aad.len());
    }
    decipher.set_auth_tag(tag)?;

    if let Err(e) = drive(reader, &mut writer, &mut decipher, config, Stage::Decrypt, &mut counters, &mut timer) {
        warn!(algorithm, bytes_written = counters.bytes_out, error = %e, "decrypt pipeline failed");
        return Err(e);
    }
    timer.finish();

    let telemetry = TelemetrySnapshot::from(algorithm, &counters, &timer);
    info!(algorithm, bytes_in = telemetry.bytes_in, bytes_out = telemetry.bytes_out, "decrypt pipeline done");
    Ok(telemetry)
}
