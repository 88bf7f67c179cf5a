//! Relay pipeline for piping text through a hosted neural voice.
//!
//! Text arrives on stdin, audio bytes leave on stdout as they are
//! synthesized, and word timings are emitted afterwards as a
//! sentinel-delimited JSON block on stderr.

pub mod input;
pub mod pipeline;

pub use input::read_text;
pub use pipeline::{emit_metadata, relay, METADATA_END, METADATA_START};

/// Voice used when the caller does not name one.
pub const DEFAULT_VOICE: &str = "tr-TR-AhmetNeural";
