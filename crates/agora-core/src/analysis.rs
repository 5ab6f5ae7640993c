//! The contract with an external debate analyst.
//!
//! A [`Transcript`] is the flattened forest projected to
//! `{id, sender, role, content, timestamp}` entries. An [`Analyst`] turns
//! it into a [`Verdict`]. Failures never reach the caller: an
//! [`AnalysisJob`] substitutes [`Verdict::fallback`] for any error.
//!
//! Only one analysis per debate may be outstanding. [`AnalysisGate`] is a
//! single in-flight flag; a second request while the flag is set is
//! refused, not queued. The flag is cleared when the permit is dropped,
//! whether the call succeeded, failed, or was abandoned.

use std::{
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{info, warn};

use crate::{
  Error, Result,
  forest::Forest,
  node::{ArgumentNode, NodeId, Role},
};

/// Reasoning attached to [`Verdict::fallback`].
pub const FALLBACK_REASONING: &str =
  "Analysis is temporarily unavailable; the debate is scored as a tie.";

// ─── Transcript ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
  pub id:        NodeId,
  pub sender:    String,
  pub role:      Role,
  pub content:   String,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
}

impl From<&ArgumentNode> for TranscriptEntry {
  fn from(node: &ArgumentNode) -> Self {
    Self {
      id:        node.id.clone(),
      sender:    node.author.clone(),
      role:      node.role,
      content:   node.content.clone(),
      timestamp: node.timestamp.trunc_subsecs(3),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
  pub topic:   String,
  pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
  /// Project `forest` in pre-order. Entry order is structural, not
  /// chronological.
  pub fn from_forest(topic: impl Into<String>, forest: &Forest) -> Self {
    Self {
      topic:   topic.into(),
      entries: forest.iter().map(TranscriptEntry::from).collect(),
    }
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// ─── Verdict ─────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
  Pro,
  Con,
  Tie,
}

impl Winner {
  /// Read a free-form label from an analyst. Case and surrounding
  /// whitespace are ignored; anything unrecognised is a tie.
  pub fn from_label(label: &str) -> Self {
    match label.trim().to_ascii_uppercase().as_str() {
      "PRO" => Self::Pro,
      "CON" => Self::Con,
      _ => Self::Tie,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
  pub winner:    Winner,
  pub reasoning: String,
  /// 0..=100.
  pub pro_score: f64,
  /// 0..=100.
  pub con_score: f64,
}

impl Verdict {
  /// The tie reported whenever the analyst cannot be reached or answers
  /// with something unusable.
  pub fn fallback() -> Self {
    Self {
      winner:    Winner::Tie,
      reasoning: FALLBACK_REASONING.to_owned(),
      pro_score: 50.0,
      con_score: 50.0,
    }
  }

  pub fn is_fallback(&self) -> bool { self == &Self::fallback() }

  /// Clamp scores into 0..=100; a non-finite score becomes 50.
  pub fn normalized(mut self) -> Self {
    self.pro_score = clamp_score(self.pro_score);
    self.con_score = clamp_score(self.con_score);
    self
  }
}

fn clamp_score(score: f64) -> f64 {
  if score.is_finite() { score.clamp(0.0, 100.0) } else { 50.0 }
}

// ─── Analyst ─────────────────────────────────────────────────────────────────

/// An external service that judges a transcript.
///
/// Implementations report their own failures; callers go through
/// [`AnalysisJob::run`], which never fails.
pub trait Analyst: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn analyze<'a>(
    &'a self,
    transcript: &'a Transcript,
  ) -> impl Future<Output = Result<Verdict, Self::Error>> + Send + 'a;
}

// ─── In-flight gate ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct AnalysisGate {
  in_flight: AtomicBool,
}

impl AnalysisGate {
  pub fn new() -> Self { Self::default() }

  pub fn is_in_flight(&self) -> bool { self.in_flight.load(Ordering::Acquire) }

  /// Claim the gate, or fail with [`Error::AnalysisInFlight`].
  pub fn try_begin(self: &Arc<Self>) -> Result<AnalysisPermit> {
    self
      .in_flight
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .map_err(|_| Error::AnalysisInFlight)?;
    Ok(AnalysisPermit { gate: Arc::clone(self) })
  }
}

/// Proof of holding an [`AnalysisGate`]. Releases it on drop.
#[derive(Debug)]
pub struct AnalysisPermit {
  gate: Arc<AnalysisGate>,
}

impl Drop for AnalysisPermit {
  fn drop(&mut self) { self.gate.in_flight.store(false, Ordering::Release); }
}

// ─── Job ─────────────────────────────────────────────────────────────────────

/// A transcript paired with the permit that allowed its analysis.
#[derive(Debug)]
pub struct AnalysisJob {
  transcript: Transcript,
  _permit:    AnalysisPermit,
}

impl AnalysisJob {
  pub fn new(transcript: Transcript, permit: AnalysisPermit) -> Self {
    Self { transcript, _permit: permit }
  }

  pub fn transcript(&self) -> &Transcript { &self.transcript }

  /// Ask `analyst` for a verdict. Errors are logged and replaced by
  /// [`Verdict::fallback`]. The gate is released when this returns.
  pub async fn run<A: Analyst>(self, analyst: &A) -> Verdict {
    let entries = self.transcript.len();
    match analyst.analyze(&self.transcript).await {
      Ok(verdict) => {
        let verdict = verdict.normalized();
        info!(
          topic = %self.transcript.topic,
          entries,
          winner = %verdict.winner,
          pro = verdict.pro_score,
          con = verdict.con_score,
          "analysis complete"
        );
        verdict
      }
      Err(error) => {
        warn!(
          topic = %self.transcript.topic,
          entries,
          error = %error,
          "analysis failed, reporting a tie"
        );
        Verdict::fallback()
      }
    }
  }
}
