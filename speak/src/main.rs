use clap::Parser;
use speak::{emit_metadata, read_text, relay, DEFAULT_VOICE};
use tracing_subscriber::EnvFilter;
use tts::{EdgeTts, Prosody};

/// Pipe text from stdin through a neural voice to stdout.
///
/// Audio bytes stream to stdout as they are synthesized; word timings are
/// printed to stderr afterwards as a METADATA_START/METADATA_END block.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Voice used for synthesis, e.g. "en-US-AriaNeural".
    #[arg(default_value = DEFAULT_VOICE, env = "SPEAK_VOICE")]
    voice: String,
    /// Speaking rate adjustment, e.g. "+10%" or "-5%".
    #[arg(long, default_value = "+0%", allow_hyphen_values = true)]
    rate: String,
    /// Pitch adjustment, e.g. "+20Hz".
    #[arg(long, default_value = "+0Hz", allow_hyphen_values = true)]
    pitch: String,
    /// Volume adjustment, e.g. "-10%".
    #[arg(long, default_value = "+0%", allow_hyphen_values = true)]
    volume: String,
    /// Print the available voices as JSON and exit.
    #[arg(long)]
    list_voices: bool,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // stderr doubles as the error and metadata channel, so logging stays
    // silent unless RUST_LOG asks for it.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprint!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.list_voices {
        let voices = tts::list_voices().await?;
        println!("{}", serde_json::to_string_pretty(&voices)?);
        return Ok(());
    }

    let text = read_text(tokio::io::stdin()).await?;
    let synth = EdgeTts::new().with_prosody(Prosody {
        rate: cli.rate,
        pitch: cli.pitch,
        volume: cli.volume,
    });

    let timings = relay(&synth, &text, &cli.voice, &mut std::io::stdout()).await?;
    emit_metadata(&timings, &mut std::io::stderr())?;
    Ok(())
}
