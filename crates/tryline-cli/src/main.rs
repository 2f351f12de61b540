//! # tryline
//!
//! Resolves an NRL Live video to a playable HLS URL and prints it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tryline_core::Config;
use tryline_ooyala::OoyalaSession;

#[derive(Parser, Debug)]
#[command(name = "tryline", version, about = "NRL Live playback URL resolver")]
struct Args {
    /// Provider video identifier to resolve.
    video_id: String,

    /// Treat the video as a live stream rather than a replay.
    #[arg(long)]
    live: bool,

    /// Path to a JSON settings file; unset fields use built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Account username.
    #[arg(long, env = "TRYLINE_USERNAME")]
    username: Option<String>,

    /// Account password.
    #[arg(long, env = "TRYLINE_PASSWORD")]
    password: Option<String>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse settings file {}", path.display()))?
        }
        None => Config::default(),
    };

    // Flags and env vars win over the settings file.
    if let Some(username) = &args.username {
        config.username.clone_from(username);
    }
    if let Some(password) = &args.password {
        config.password.clone_from(password);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tryline=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!("Starting tryline v{}", env!("CARGO_PKG_VERSION"));

    let session = OoyalaSession::new(config)?;
    let url = session
        .resolve_playback_url(&args.video_id, args.live)
        .await?;

    println!("{url}");
    Ok(())
}
