use clap::Parser;
use std::path::PathBuf;

/// Generate the voice command WAV fixtures (16 kHz, mono) used by the device tests.
#[derive(Parser, Debug)]
#[command(name = "generate-test-audio", version)]
pub struct Args {
    #[clap(long, default_value = "test_audio")]
    pub output_dir: PathBuf,

    #[clap(long, default_value = "en")]
    pub lang: String,

    /// Ask the speech service for slower speech.
    #[clap(long)]
    pub slow: bool,

    #[clap(long, default_value = crate::tts::DEFAULT_TTS_URL)]
    pub tts_url: String,

    #[clap(long, default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    #[clap(long, default_value = "ffprobe")]
    pub ffprobe: PathBuf,

    /// Check every produced file is 16 kHz mono after the run.
    #[clap(long)]
    pub verify: bool,

    /// Write manifest.json into the output directory.
    #[clap(long)]
    pub manifest: bool,

    /// Log filter used when RUST_LOG is unset.
    #[clap(long, default_value = "warn")]
    pub log_filter: String,
}
