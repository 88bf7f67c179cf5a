use anyhow::{bail, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Read `reader` to end-of-stream and trim surrounding whitespace.
///
/// Supports arbitrarily long text; everything is read before synthesis
/// starts. Fails when nothing but whitespace arrives.
pub async fn read_text(mut reader: impl AsyncRead + Unpin) -> Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text).await?;
    let text = text.trim();
    if text.is_empty() {
        bail!("No text provided");
    }
    Ok(text.to_string())
}
