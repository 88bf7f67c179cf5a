//! Events produced by a synthesis session and the timing records derived
//! from them.

use serde::{Deserialize, Serialize};

/// The service expresses time in 100-nanosecond ticks.
pub const TICKS_PER_SECOND: f64 = 10_000_000.0;

/// One event from the synthesis stream, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TtsChunk {
    /// Encoded audio bytes in the format negotiated at session start.
    Audio(Vec<u8>),
    /// A spoken fragment with its position in the audio, in ticks.
    WordBoundary {
        text: String,
        offset_ticks: u64,
        duration_ticks: u64,
    },
}

/// Consumer-facing timing record, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl WordTiming {
    /// Convert a word boundary from service ticks to seconds.
    pub fn from_ticks(text: impl Into<String>, offset_ticks: u64, duration_ticks: u64) -> Self {
        Self {
            text: text.into(),
            start: offset_ticks as f64 / TICKS_PER_SECOND,
            duration: duration_ticks as f64 / TICKS_PER_SECOND,
        }
    }
}
