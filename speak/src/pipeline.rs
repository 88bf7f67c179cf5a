use std::io::Write;

use anyhow::Result;
use futures_util::StreamExt;
use tracing::debug;
use tts::{Synthesizer, TtsChunk, WordTiming};

pub const METADATA_START: &str = "METADATA_START";
pub const METADATA_END: &str = "METADATA_END";

/// Consume the synthesis stream for `text`, relaying audio to `audio_out`.
///
/// Audio payloads are written and flushed as they arrive so a downstream
/// player can start before synthesis finishes. Word boundaries are collected
/// and returned once the stream is exhausted. On a stream error the bytes
/// already flushed stay in place and the error propagates.
pub async fn relay(
    synth: &dyn Synthesizer,
    text: &str,
    voice: &str,
    audio_out: &mut impl Write,
) -> Result<Vec<WordTiming>> {
    let mut stream = synth.stream(text, voice).await?;
    let mut timings = Vec::new();
    while let Some(chunk) = stream.next().await {
        match chunk? {
            TtsChunk::Audio(bytes) => {
                audio_out.write_all(&bytes)?;
                audio_out.flush()?;
            }
            TtsChunk::WordBoundary {
                text,
                offset_ticks,
                duration_ticks,
            } => {
                timings.push(WordTiming::from_ticks(text, offset_ticks, duration_ticks));
            }
        }
    }
    debug!(words = timings.len(), "synthesis stream exhausted");
    Ok(timings)
}

/// Write the sentinel-delimited metadata block, one JSON array per run.
///
/// An empty collection produces no block at all.
pub fn emit_metadata(timings: &[WordTiming], meta_out: &mut impl Write) -> Result<()> {
    if timings.is_empty() {
        return Ok(());
    }
    writeln!(meta_out, "{METADATA_START}")?;
    writeln!(meta_out, "{}", serde_json::to_string(timings)?)?;
    writeln!(meta_out, "{METADATA_END}")?;
    Ok(())
}
