//! JSON HTTP surface for Agora debates.
//!
//! Exposes an axum [`Router`] over an in-memory [`DebateRegistry`] and any
//! [`Analyst`]. Auth and TLS are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = agora_server::router(AppState::new(analyst));
//! ```

pub mod error;
pub mod handlers;
pub mod registry;

use std::sync::Arc;

use agora_core::analysis::Analyst;
use agora_gemini::GeminiConfig;
use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use registry::DebateRegistry;

use handlers::{analysis, arguments, debates, votes};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `AGORA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:   String,
  #[serde(default = "default_port")]
  pub port:   u16,
  #[serde(default)]
  pub gemini: GeminiConfig,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:   default_host(),
      port:   default_port(),
      gemini: GeminiConfig::default(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<A> {
  pub registry: Arc<DebateRegistry>,
  pub analyst:  Arc<A>,
}

impl<A> AppState<A> {
  pub fn new(analyst: A) -> Self {
    Self {
      registry: Arc::new(DebateRegistry::new()),
      analyst:  Arc::new(analyst),
    }
  }
}

// Manual impl: `A` itself need not be `Clone`.
impl<A> Clone for AppState<A> {
  fn clone(&self) -> Self {
    Self {
      registry: Arc::clone(&self.registry),
      analyst:  Arc::clone(&self.analyst),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router. Every route lives under `/api`.
pub fn router<A>(state: AppState<A>) -> Router
where
  A: Analyst + 'static,
{
  let api = Router::new()
    // Debates
    .route("/debates", get(debates::list::<A>).post(debates::create::<A>))
    .route("/debates/{id}", get(debates::get_one::<A>))
    .route("/debates/{id}/status", post(debates::change_status::<A>))
    // Tree
    .route("/debates/{id}/arguments", post(arguments::create::<A>))
    .route("/debates/{id}/votes", post(votes::cast::<A>))
    // Analysis
    .route("/debates/{id}/transcript", get(analysis::transcript::<A>))
    .route("/debates/{id}/analysis", post(analysis::run::<A>))
    .with_state(state);

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}
