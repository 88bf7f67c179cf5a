use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use tts::{EdgeTts, Synthesizer, TtsChunk};

fn audio_frame(payload: &[u8]) -> Message {
    let header = "X-RequestId:1\r\nContent-Type:audio/mpeg\r\nPath:audio\r\n";
    let mut frame = (header.len() as u16).to_be_bytes().to_vec();
    frame.extend_from_slice(header.as_bytes());
    frame.extend_from_slice(payload);
    Message::Binary(frame)
}

fn metadata_frame(text: &str, offset: u64, duration: u64) -> Message {
    Message::Text(format!(
        "X-RequestId:1\r\nPath:audio.metadata\r\n\r\n\
         {{\"Metadata\":[{{\"Type\":\"WordBoundary\",\"Data\":{{\"Offset\":{offset},\
         \"Duration\":{duration},\"text\":{{\"Text\":\"{text}\",\"Length\":{},\
         \"BoundaryType\":\"WordBoundary\"}}}}}}]}}",
        text.len()
    ))
}

fn turn_end() -> Message {
    Message::Text("X-RequestId:1\r\nPath:turn.end\r\n\r\n{}".into())
}

/// Serve one synthesis session: wait for the SSML message, forward every
/// received text message to the returned channel, then reply with `frames`.
async fn spawn_mock_edge(frames: Vec<Message>) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                let is_ssml = text.contains("Path:ssml");
                let _ = tx.send(text).await;
                if is_ssml {
                    break;
                }
            }
        }
        for frame in frames {
            ws.send(frame).await.unwrap();
        }
        let _ = ws.close(None).await;
    });
    (format!("ws://{addr}"), rx)
}

#[tokio::test]
async fn session_demuxes_audio_and_word_boundaries_in_order() {
    let (url, _rx) = spawn_mock_edge(vec![
        audio_frame(b"first"),
        metadata_frame("Hello", 1_000_000, 5_000_000),
        audio_frame(b"second"),
        turn_end(),
    ])
    .await;

    let synth = EdgeTts::new().with_endpoint(url);
    let stream = synth.stream("Hello world", "en-US-AriaNeural").await.unwrap();
    let chunks: Vec<TtsChunk> = stream.map(|c| c.unwrap()).collect().await;

    assert_eq!(
        chunks,
        vec![
            TtsChunk::Audio(b"first".to_vec()),
            TtsChunk::WordBoundary {
                text: "Hello".into(),
                offset_ticks: 1_000_000,
                duration_ticks: 5_000_000,
            },
            TtsChunk::Audio(b"second".to_vec()),
        ]
    );
}

#[tokio::test]
async fn handshake_carries_config_and_voice() {
    let (url, mut rx) = spawn_mock_edge(vec![turn_end()]).await;

    let synth = EdgeTts::new().with_endpoint(url);
    let mut stream = synth.stream("Merhaba", "tr-TR-AhmetNeural").await.unwrap();
    while stream.next().await.is_some() {}

    let config = rx.recv().await.unwrap();
    assert!(config.contains("Path:speech.config"));
    assert!(config.contains("\"wordBoundaryEnabled\":\"true\""));

    let ssml = rx.recv().await.unwrap();
    assert!(ssml.contains("Path:ssml"));
    assert!(ssml.contains("<voice name='tr-TR-AhmetNeural'>"));
    assert!(ssml.contains("Merhaba"));
}

#[tokio::test]
async fn stream_ends_when_server_closes_without_turn_end() {
    let (url, _rx) = spawn_mock_edge(vec![audio_frame(b"partial")]).await;

    let synth = EdgeTts::new().with_endpoint(url);
    let stream = synth.stream("hi", "en-US-AriaNeural").await.unwrap();
    let chunks: Vec<_> = stream.collect().await;

    assert_eq!(chunks.len(), 1);
    assert_eq!(
        chunks[0].as_ref().unwrap(),
        &TtsChunk::Audio(b"partial".to_vec())
    );
}

#[tokio::test]
async fn unreachable_endpoint_fails_to_open() {
    let synth = EdgeTts::new().with_endpoint("ws://127.0.0.1:1");
    assert!(synth.stream("hi", "en-US-AriaNeural").await.is_err());
}
