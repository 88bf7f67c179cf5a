//! WebSocket client for the Microsoft Edge "read aloud" synthesis service.
//!
//! One session per call: connect, send a `speech.config` message enabling
//! word-boundary metadata, send the SSML for the text, then relay the typed
//! frames the service returns until it signals `turn.end`. Binary frames
//! carry audio; text frames carry JSON metadata or turn bookkeeping.

use std::collections::VecDeque;
use std::env;

use chrono::Utc;
use futures_util::{stream, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::{
    chunk::TtsChunk,
    synth::{ChunkStream, Synthesizer},
    Result, TtsError,
};
use async_trait::async_trait;

const DEFAULT_ENDPOINT: &str = "wss://speech.platform.bing.com/consumer/speech/synthesize/\
                                readaloud/edge/v1?TrustedClientToken=6A5AA1D4EAFF4E9FB37E23D68491D6F4";

const OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Prosody adjustments applied around the spoken text.
#[derive(Debug, Clone)]
pub struct Prosody {
    /// Speaking rate, e.g. `+10%`.
    pub rate: String,
    /// Pitch shift, e.g. `-20Hz`.
    pub pitch: String,
    /// Volume adjustment, e.g. `+0%`.
    pub volume: String,
}

impl Default for Prosody {
    fn default() -> Self {
        Self {
            rate: "+0%".into(),
            pitch: "+0Hz".into(),
            volume: "+0%".into(),
        }
    }
}

/// Client for the Edge read-aloud endpoint.
pub struct EdgeTts {
    endpoint: String,
    prosody: Prosody,
}

impl EdgeTts {
    /// Create a client targeting the public endpoint, or the URL in the
    /// `EDGE_TTS_URL` environment variable when set.
    pub fn new() -> Self {
        let endpoint = env::var("EDGE_TTS_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        Self {
            endpoint,
            prosody: Prosody::default(),
        }
    }

    /// Target a specific endpoint, e.g. a local mock server.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_prosody(mut self, prosody: Prosody) -> Self {
        self.prosody = prosody;
        self
    }

    fn session_url(&self) -> Result<Url> {
        let sep = if self.endpoint.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}ConnectionId={}",
            self.endpoint,
            sep,
            Uuid::new_v4().simple()
        );
        Ok(Url::parse(&url)?)
    }
}

impl Default for EdgeTts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Synthesizer for EdgeTts {
    async fn stream(&self, text: &str, voice: &str) -> Result<ChunkStream> {
        let url = self.session_url()?;
        debug!(%url, "opening synthesis session");
        let (mut ws, _) = connect_async(url).await?;

        ws.send(Message::Text(config_message())).await?;
        ws.send(Message::Text(ssml_message(text, voice, &self.prosody)))
            .await?;

        let session = Session {
            ws,
            pending: VecDeque::new(),
            done: false,
        };
        let stream = stream::unfold(session, |mut session| async move {
            loop {
                if let Some(chunk) = session.pending.pop_front() {
                    return Some((Ok(chunk), session));
                }
                if session.done {
                    return None;
                }
                match session.ws.next().await {
                    None => return None,
                    Some(Err(e)) => {
                        session.done = true;
                        return Some((Err(TtsError::from(e)), session));
                    }
                    Some(Ok(msg)) => match dispatch(msg) {
                        Ok(Frame::Audio(bytes)) => session.pending.push_back(TtsChunk::Audio(bytes)),
                        Ok(Frame::Boundaries(chunks)) => session.pending.extend(chunks),
                        Ok(Frame::TurnEnd) => session.done = true,
                        Ok(Frame::Other) => {}
                        Err(e) => {
                            session.done = true;
                            return Some((Err(e), session));
                        }
                    },
                }
            }
        });
        Ok(Box::pin(stream))
    }
}

struct Session {
    ws: WsStream,
    pending: VecDeque<TtsChunk>,
    done: bool,
}

/// One service frame, reduced to what the consumer cares about.
enum Frame {
    Audio(Vec<u8>),
    Boundaries(Vec<TtsChunk>),
    TurnEnd,
    Other,
}

fn dispatch(msg: Message) -> Result<Frame> {
    match msg {
        Message::Binary(frame) => parse_binary_frame(&frame),
        Message::Text(frame) => parse_text_frame(&frame),
        _ => Ok(Frame::Other),
    }
}

/// Binary frames start with a 2-byte big-endian header length, followed by
/// the ASCII header and the payload.
fn parse_binary_frame(frame: &[u8]) -> Result<Frame> {
    if frame.len() < 2 {
        return Err(TtsError::Protocol("truncated binary frame".into()));
    }
    let header_len = u16::from_be_bytes([frame[0], frame[1]]) as usize;
    let rest = &frame[2..];
    if header_len > rest.len() {
        return Err(TtsError::Protocol("binary frame header overruns frame".into()));
    }
    let header = String::from_utf8_lossy(&rest[..header_len]);
    if header_path(&header) == Some("audio") {
        Ok(Frame::Audio(rest[header_len..].to_vec()))
    } else {
        Ok(Frame::Other)
    }
}

/// Text frames are `Key:Value` header lines, a blank line, then a body.
fn parse_text_frame(frame: &str) -> Result<Frame> {
    let (headers, body) = match frame.split_once("\r\n\r\n") {
        Some(parts) => parts,
        None => (frame, ""),
    };
    match header_path(headers) {
        Some("audio.metadata") => parse_metadata(body),
        Some("turn.end") => Ok(Frame::TurnEnd),
        _ => Ok(Frame::Other),
    }
}

fn header_path(headers: &str) -> Option<&str> {
    headers.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == "Path").then_some(value.trim())
    })
}

#[derive(Deserialize)]
struct MetadataEnvelope {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<MetadataEntry>,
}

#[derive(Deserialize)]
struct MetadataEntry {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Data")]
    data: MetadataData,
}

#[derive(Deserialize)]
struct MetadataData {
    #[serde(rename = "Offset")]
    offset: u64,
    #[serde(rename = "Duration", default)]
    duration: u64,
    #[serde(rename = "text")]
    text: MetadataText,
}

#[derive(Deserialize)]
struct MetadataText {
    #[serde(rename = "Text")]
    text: String,
}

fn parse_metadata(body: &str) -> Result<Frame> {
    let envelope: MetadataEnvelope = serde_json::from_str(body)
        .map_err(|e| TtsError::Protocol(format!("bad metadata payload: {e}")))?;
    let chunks = envelope
        .metadata
        .into_iter()
        .filter(|entry| entry.kind == "WordBoundary")
        .map(|entry| TtsChunk::WordBoundary {
            text: entry.data.text.text,
            offset_ticks: entry.data.offset,
            duration_ticks: entry.data.duration,
        })
        .collect();
    Ok(Frame::Boundaries(chunks))
}

fn timestamp() -> String {
    Utc::now()
        .format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
        .to_string()
}

fn config_message() -> String {
    format!(
        "X-Timestamp:{}\r\n\
         Content-Type:application/json; charset=utf-8\r\n\
         Path:speech.config\r\n\r\n\
         {{\"context\":{{\"synthesis\":{{\"audio\":{{\"metadataoptions\":{{\
         \"sentenceBoundaryEnabled\":\"false\",\"wordBoundaryEnabled\":\"true\"}},\
         \"outputFormat\":\"{}\"}}}}}}}}",
        timestamp(),
        OUTPUT_FORMAT
    )
}

fn ssml_message(text: &str, voice: &str, prosody: &Prosody) -> String {
    format!(
        "X-RequestId:{}\r\n\
         Content-Type:application/ssml+xml\r\n\
         X-Timestamp:{}\r\n\
         Path:ssml\r\n\r\n{}",
        Uuid::new_v4().simple(),
        timestamp(),
        ssml(text, voice, prosody)
    )
}

fn ssml(text: &str, voice: &str, prosody: &Prosody) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='en-US'>\
         <voice name='{}'><prosody pitch='{}' rate='{}' volume='{}'>{}</prosody></voice></speak>",
        voice,
        prosody.pitch,
        prosody.rate,
        prosody.volume,
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
