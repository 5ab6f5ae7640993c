//! [`Analyst`] backed by Google's Gemini `generateContent` REST endpoint.
//!
//! ```rust,ignore
//! let analyst = GeminiAnalyst::new(GeminiConfig { api_key, ..Default::default() })?;
//! let verdict = session.analyze(&analyst).await?;
//! ```

pub mod error;
pub mod prompt;
pub mod response;

use std::{future::Future, time::Duration};

use agora_core::analysis::{Analyst, Transcript, Verdict};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub use error::{Error, Result};

pub const DEFAULT_BASE_URL: &str =
  "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Connection settings; deserialised from the server's `[gemini]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
  #[serde(default)]
  pub api_key:      String,
  #[serde(default = "default_model")]
  pub model:        String,
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_model() -> String { DEFAULT_MODEL.to_owned() }

fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }

fn default_timeout_secs() -> u64 { 30 }

impl Default for GeminiConfig {
  fn default() -> Self {
    Self {
      api_key:      String::new(),
      model:        default_model(),
      base_url:     default_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiAnalyst {
  client: Client,
  config: GeminiConfig,
}

impl GeminiAnalyst {
  pub fn new(config: GeminiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn endpoint(&self) -> String {
    format!(
      "{}/{}:generateContent",
      self.config.base_url.trim_end_matches('/'),
      self.config.model
    )
  }

  async fn generate(&self, transcript: &Transcript) -> Result<Verdict> {
    if self.config.api_key.is_empty() {
      return Err(Error::MissingApiKey);
    }

    debug!(
      model = %self.config.model,
      entries = transcript.entries.len(),
      "requesting verdict"
    );
    let resp = self
      .client
      .post(self.endpoint())
      .query(&[("key", self.config.api_key.as_str())])
      .json(&prompt::request_body(transcript))
      .send()
      .await?;

    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
      return Err(Error::Status { status: status.as_u16(), body });
    }
    response::parse_verdict(&body)
  }
}

impl Analyst for GeminiAnalyst {
  type Error = Error;

  fn analyze<'a>(
    &'a self,
    transcript: &'a Transcript,
  ) -> impl Future<Output = Result<Verdict>> + Send + 'a {
    self.generate(transcript)
  }
}
