//! Streaming client for a hosted neural text-to-speech service.
//!
//! The `tts` crate defines a [`Synthesizer`] trait along with the concrete
//! [`EdgeTts`] implementation, which speaks the Microsoft Edge "read aloud"
//! WebSocket protocol. A synthesis session yields an ordered stream of
//! [`TtsChunk`] events: raw audio payloads interleaved with word-boundary
//! timing marks. A [`voice`] module fetches the service's voice catalog.

pub mod chunk;
pub mod edge;
pub mod synth;
pub mod voice;

pub use chunk::{TtsChunk, WordTiming, TICKS_PER_SECOND};
pub use edge::{EdgeTts, Prosody};
pub use synth::{ChunkStream, Synthesizer};
pub use voice::{list_voices, Voice};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TtsError {
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Endpoint(#[from] url::ParseError),
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Convenience result type used throughout this crate.
pub type Result<T> = std::result::Result<T, TtsError>;
