//! Voice catalog lookup.

use serde::{Deserialize, Serialize};
use std::env;

use crate::Result;

const DEFAULT_VOICES_URL: &str = "https://speech.platform.bing.com/consumer/speech/synthesize/\
                                  readaloud/voices/list?trustedclienttoken=6A5AA1D4EAFF4E9FB37E23D68491D6F4";

/// One entry from the service's voice list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ShortName")]
    pub short_name: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Locale")]
    pub locale: String,
    #[serde(rename = "FriendlyName", default)]
    pub friendly_name: String,
    #[serde(rename = "SuggestedCodec", default)]
    pub suggested_codec: String,
    #[serde(rename = "Status", default)]
    pub status: String,
}

/// Fetch the available voices from the service, or from the URL in the
/// `EDGE_VOICES_URL` environment variable when set.
pub async fn list_voices() -> Result<Vec<Voice>> {
    let url = env::var("EDGE_VOICES_URL").unwrap_or_else(|_| DEFAULT_VOICES_URL.into());
    let voices = reqwest::Client::new()
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(voices)
}
