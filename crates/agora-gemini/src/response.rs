//! Decoding a `generateContent` response into a [`Verdict`].

use agora_core::analysis::{Verdict, Winner};
use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
  text: Option<String>,
}

/// The verdict as the model writes it; `winner` is free text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
  winner:    String,
  reasoning: String,
  pro_score: f64,
  con_score: f64,
}

/// Parse a raw response body. Text from all parts of the first candidate
/// is concatenated and decoded as a verdict.
pub fn parse_verdict(body: &str) -> Result<Verdict> {
  let response: GenerateResponse = serde_json::from_str(body)?;
  let text: String = response
    .candidates
    .into_iter()
    .next()
    .and_then(|c| c.content)
    .map(|content| {
      content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect()
    })
    .unwrap_or_default();

  if text.trim().is_empty() {
    return Err(Error::EmptyResponse);
  }

  let raw: RawVerdict = serde_json::from_str(strip_code_fence(&text))?;
  Ok(
    Verdict {
      winner:    Winner::from_label(&raw.winner),
      reasoning: raw.reasoning,
      pro_score: raw.pro_score,
      con_score: raw.con_score,
    }
    .normalized(),
  )
}

/// Models occasionally wrap JSON in a Markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
  let trimmed = text.trim();
  let Some(inner) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  let inner = inner.strip_prefix("json").unwrap_or(inner);
  inner.strip_suffix("```").unwrap_or(inner).trim()
}
