use async_trait::async_trait;
use futures_core::Stream;
use std::pin::Pin;

use crate::{chunk::TtsChunk, Result};

/// Ordered, finite, one-pass stream of synthesis events.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<TtsChunk>> + Send>>;

/// A speech synthesis backend reachable over the network.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Open a streaming session speaking `text` with `voice`.
    ///
    /// Chunks are produced incrementally; each fetch may suspend while
    /// awaiting network data.
    async fn stream(&self, text: &str, voice: &str) -> Result<ChunkStream>;
}
