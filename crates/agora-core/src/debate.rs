//! The debate envelope: topic, participants, lifecycle, vote tallies, and
//! the argument forest it owns.

use std::{fmt, str::FromStr};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::info;
use uuid::Uuid;

use crate::{Error, Result, forest::Forest};

// ─── Identity ────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DebateId(Uuid);

impl DebateId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for DebateId {
  fn default() -> Self { Self::new() }
}

impl From<Uuid> for DebateId {
  fn from(id: Uuid) -> Self { Self(id) }
}

impl fmt::Display for DebateId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.0, f)
  }
}

impl FromStr for DebateId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Uuid::parse_str(s).map(Self) }
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DebateStatus {
  Upcoming,
  Live,
  Completed,
  Cancelled,
}

impl DebateStatus {
  /// Whether new arguments may still be posted.
  pub fn accepts_arguments(self) -> bool {
    matches!(self, Self::Upcoming | Self::Live)
  }

  fn can_become(self, next: Self) -> bool {
    use DebateStatus::*;
    matches!(
      (self, next),
      (Upcoming, Live) | (Upcoming | Live, Completed) | (Upcoming | Live, Cancelled)
    )
  }
}

// ─── Votes ───────────────────────────────────────────────────────────────────

/// A side a spectator can vote for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
  #[serde(alias = "pro")]
  Pro,
  #[serde(alias = "con")]
  Con,
}

/// Debate-level tallies. Independent of the per-node counters.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct DebateVotes {
  pub pro: u64,
  pub con: u64,
}

impl DebateVotes {
  /// Count one vote for `side` and return its new tally. Every call counts;
  /// there is no per-voter deduplication and no undo.
  pub fn record(&mut self, side: Side) -> u64 {
    let tally = match side {
      Side::Pro => &mut self.pro,
      Side::Con => &mut self.con,
    };
    *tally = tally.saturating_add(1);
    *tally
  }

  pub fn get(&self, side: Side) -> u64 {
    match side {
      Side::Pro => self.pro,
      Side::Con => self.con,
    }
  }

  pub fn total(&self) -> u64 { self.pro.saturating_add(self.con) }

  /// Fraction of all votes that went to `side`; `0.0` before any vote.
  pub fn share(&self, side: Side) -> f64 {
    match self.total() {
      0 => 0.0,
      total => self.get(side) as f64 / total as f64,
    }
  }
}

// ─── Debate ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debate {
  pub id:          DebateId,
  pub topic:       String,
  #[serde(default)]
  pub category:    String,
  #[serde(default)]
  pub description: String,
  pub status:      DebateStatus,
  pub pro_user:    String,
  pub con_user:    String,
  #[serde(default)]
  pub viewers:     u64,
  #[serde(default)]
  pub votes:       DebateVotes,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url:   Option<String>,
  /// When the debate went live; epoch milliseconds on the wire.
  #[serde(
    default,
    with = "chrono::serde::ts_milliseconds_option",
    skip_serializing_if = "Option::is_none"
  )]
  pub start_time:  Option<DateTime<Utc>>,
  #[serde(default, alias = "argumentTree")]
  pub roots:       Forest,
}

impl Debate {
  /// An upcoming debate with no arguments and no votes.
  pub fn new(
    topic: impl Into<String>,
    pro_user: impl Into<String>,
    con_user: impl Into<String>,
  ) -> Self {
    Self {
      id:          DebateId::new(),
      topic:       topic.into(),
      category:    String::new(),
      description: String::new(),
      status:      DebateStatus::Upcoming,
      pro_user:    pro_user.into(),
      con_user:    con_user.into(),
      viewers:     0,
      votes:       DebateVotes::default(),
      image_url:   None,
      start_time:  None,
      roots:       Forest::new(),
    }
  }

  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = category.into();
    self
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn forest(&self) -> &Forest { &self.roots }

  /// UPCOMING → LIVE. Stamps `start_time` if it was unset.
  pub fn start(&mut self) -> Result<()> {
    self.transition(DebateStatus::Live)?;
    self.start_time.get_or_insert_with(|| Utc::now().trunc_subsecs(3));
    Ok(())
  }

  /// UPCOMING or LIVE → COMPLETED.
  pub fn end(&mut self) -> Result<()> { self.transition(DebateStatus::Completed) }

  /// UPCOMING or LIVE → CANCELLED.
  pub fn cancel(&mut self) -> Result<()> {
    self.transition(DebateStatus::Cancelled)
  }

  fn transition(&mut self, next: DebateStatus) -> Result<()> {
    if !self.status.can_become(next) {
      return Err(Error::InvalidTransition { from: self.status, to: next });
    }
    info!(debate = %self.id, from = %self.status, to = %next, "debate status changed");
    self.status = next;
    Ok(())
  }

  /// Count one spectator vote; see [`DebateVotes::record`].
  pub fn vote(&mut self, side: Side) -> u64 { self.votes.record(side) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn votes_accumulate_without_dedup() {
    let mut d = Debate::new("t", "p", "c");
    for _ in 0..3 {
      d.vote(Side::Pro);
    }
    assert_eq!(d.vote(Side::Con), 1);
    assert_eq!(d.votes, DebateVotes { pro: 3, con: 1 });
    assert_eq!(d.votes.total(), 4);
    assert!((d.votes.share(Side::Pro) - 0.75).abs() < f64::EPSILON);
  }

  #[test]
  fn share_is_zero_without_votes() {
    let votes = DebateVotes::default();
    assert_eq!(votes.share(Side::Pro), 0.0);
    assert_eq!(votes.share(Side::Con), 0.0);
  }

  #[test]
  fn lifecycle_transitions() {
    let mut d = Debate::new("t", "p", "c");
    assert!(d.start_time.is_none());
    d.start().unwrap();
    assert_eq!(d.status, DebateStatus::Live);
    assert!(d.start_time.is_some());

    assert_eq!(
      d.start().unwrap_err(),
      Error::InvalidTransition {
        from: DebateStatus::Live,
        to:   DebateStatus::Live,
      }
    );

    d.end().unwrap();
    assert_eq!(d.status, DebateStatus::Completed);
    assert!(d.cancel().is_err());
    assert_eq!(d.status, DebateStatus::Completed);
    assert!(!d.status.accepts_arguments());
  }

  #[test]
  fn started_debate_with_arguments_round_trips() {
    let mut d = Debate::new("t", "p", "c").with_category("Tech");
    d.start().unwrap();
    d.roots
      .add_root(crate::node::ArgumentNode::new(
        "p",
        crate::node::Role::Pro,
        crate::node::NodeKind::Argument,
        "opening",
      ))
      .unwrap();

    let json = serde_json::to_string(&d).unwrap();
    let back: Debate = serde_json::from_str(&json).unwrap();
    assert_eq!(back, d);
  }

  #[test]
  fn side_accepts_lowercase_on_the_wire() {
    let side: Side = serde_json::from_str("\"con\"").unwrap();
    assert_eq!(side, Side::Con);
    assert_eq!(serde_json::to_string(&Side::Pro).unwrap(), "\"PRO\"");
  }

  #[test]
  fn deserialises_the_platform_shape() {
    let json = serde_json::json!({
      "id": "6f1c7c5e-8f6f-4a43-9d7e-1f0a4f5d2b11",
      "topic": "Space exploration is a waste of resources",
      "category": "Science",
      "status": "LIVE",
      "proUser": "EarthFirst",
      "conUser": "StarGazer",
      "viewers": 890,
      "votes": { "pro": 120, "con": 600 },
      "argumentTree": [{
        "id": "root-1",
        "author": "EarthFirst",
        "role": "PRO",
        "content": "Fix Earth first.",
        "type": "ARGUMENT",
        "timestamp": 1_000
      }]
    });

    let d: Debate = serde_json::from_value(json).unwrap();
    assert_eq!(d.status, DebateStatus::Live);
    assert_eq!(d.votes.con, 600);
    assert_eq!(d.roots.len(), 1);
    assert!(d.start_time.is_none());

    let out = serde_json::to_value(&d).unwrap();
    assert_eq!(out["proUser"], "EarthFirst");
    assert_eq!(out["roots"][0]["id"], "root-1");
    assert!(out.get("startTime").is_none());
  }
}
