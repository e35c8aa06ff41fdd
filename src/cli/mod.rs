use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "yt-transcript-server",
    about = "YouTube Transcript Server - paste a video URL, get its transcript as plain text",
    version,
    long_about = "Serves a small JSON API that extracts the video ID from any common YouTube URL form and returns the video's transcript, falling back to an alternative transcript API when captions can't be read directly."
)]
pub struct Cli {
    /// Path to a YAML config file (defaults to ./config.yaml, then the user config dir)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, value_name = "ADDR", env = "TRANSCRIPT_SERVER_ADDR")]
    pub bind: Option<SocketAddr>,

    /// Endpoint of the alternative transcript API
    #[arg(long, value_name = "URL", env = "TRANSCRIPT_ALT_ENDPOINT")]
    pub alt_endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}
