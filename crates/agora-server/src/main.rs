//! agora-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), overlays
//! `AGORA_*` environment variables, and serves the debate API over HTTP.
//!
//! ```text
//! AGORA_GEMINI__API_KEY=... cargo run -p agora-server
//! ```

use std::path::PathBuf;

use agora_gemini::GeminiAnalyst;
use agora_server::{AppState, ServerConfig};
use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Agora debate server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("AGORA")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.gemini.api_key.is_empty() {
    tracing::warn!("no Gemini API key configured; every analysis will fall back");
  }

  let analyst = GeminiAnalyst::new(server_cfg.gemini.clone())
    .context("failed to build Gemini client")?;
  let app = agora_server::router(AppState::new(analyst));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
