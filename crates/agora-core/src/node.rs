//! Argument nodes: the vertices of a debate's argument tree.
//!
//! A node is created once and never edited. Replies hang off their parent
//! in insertion order; the parent owns them exclusively. Children are held
//! behind [`Arc`] so that successive snapshots of a [`Forest`] can share
//! every subtree a mutation did not touch.
//!
//! Timestamps carry millisecond precision, the resolution of the wire
//! format. Serde, `Debug`, equality, and drop all work at any depth: the
//! serde impls grow the stack on demand, the others do not recurse.
//!
//! [`Forest`]: crate::forest::Forest

use std::{fmt, sync::Arc};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{
  Deserialize, Deserializer, Serialize, Serializer, ser::SerializeStruct,
};
use strum::Display;
use uuid::Uuid;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Stable identifier of an argument node, unique across a whole forest.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
  /// A fresh random identifier.
  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for NodeId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for NodeId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Classification ──────────────────────────────────────────────────────────

/// The side or capacity an author speaks in.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  Pro,
  Con,
  Judge,
}

/// What a node does relative to its parent. Roots are always `Argument`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
  Argument,
  Rebuttal,
  Agreement,
  Disagreement,
}

impl NodeKind {
  /// The reply type this kind corresponds to, if it is a reply kind.
  pub fn reply_type(self) -> Option<ReplyType> {
    match self {
      Self::Argument => None,
      Self::Rebuttal => Some(ReplyType::Rebuttal),
      Self::Agreement => Some(ReplyType::Agreement),
      Self::Disagreement => Some(ReplyType::Disagreement),
    }
  }
}

/// The kinds a reply may carry.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplyType {
  Rebuttal,
  Agreement,
  Disagreement,
}

impl From<ReplyType> for NodeKind {
  fn from(t: ReplyType) -> Self {
    match t {
      ReplyType::Rebuttal => Self::Rebuttal,
      ReplyType::Agreement => Self::Agreement,
      ReplyType::Disagreement => Self::Disagreement,
    }
  }
}

/// Per-node reaction counters. Carried for interchange; nothing in this
/// crate updates them.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct NodeVotes {
  pub likes:   u64,
  pub support: u64,
}

// ─── Node ────────────────────────────────────────────────────────────────────

/// One argument, rebuttal, agreement, or disagreement.
///
/// Equality is structural and covers the whole subtree.
#[derive(Clone)]
pub struct ArgumentNode {
  pub id:        NodeId,
  pub author:    String,
  pub role:      Role,
  pub content:   String,
  /// Serialised as `type`.
  pub kind:      NodeKind,
  /// Creation time, whole milliseconds; epoch milliseconds on the wire.
  pub timestamp: DateTime<Utc>,
  pub votes:     NodeVotes,
  pub(crate) children: Vec<Arc<ArgumentNode>>,
}

impl ArgumentNode {
  /// A childless node with a fresh id, stamped now.
  pub fn new(
    author: impl Into<String>,
    role: Role,
    kind: NodeKind,
    content: impl Into<String>,
  ) -> Self {
    Self {
      id: NodeId::generate(),
      author: author.into(),
      role,
      content: content.into(),
      kind,
      timestamp: Utc::now().trunc_subsecs(3),
      votes: NodeVotes::default(),
      children: Vec::new(),
    }
  }

  /// Replace the generated id with a caller-chosen one.
  pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
    self.id = id.into();
    self
  }

  /// Sub-millisecond precision is dropped.
  pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
    self.timestamp = timestamp.trunc_subsecs(3);
    self
  }

  /// Append a child before the node enters a forest. Used to assemble
  /// imported subtrees; live replies go through
  /// [`Forest::add_reply`](crate::forest::Forest::add_reply).
  pub fn with_child(mut self, child: ArgumentNode) -> Self {
    self.children.push(Arc::new(child));
    self
  }

  /// Direct replies in insertion order.
  pub fn children(&self) -> impl ExactSizeIterator<Item = &ArgumentNode> {
    self.children.iter().map(Arc::as_ref)
  }

  pub fn child_count(&self) -> usize { self.children.len() }

  /// Field-wise equality that ignores children beyond their count.
  pub(crate) fn shallow_eq(&self, other: &Self) -> bool {
    self.id == other.id
      && self.author == other.author
      && self.role == other.role
      && self.content == other.content
      && self.kind == other.kind
      && self.timestamp == other.timestamp
      && self.votes == other.votes
      && self.children.len() == other.children.len()
  }
}

impl Drop for ArgumentNode {
  // Unlink uniquely-owned descendants one at a time so that dropping a
  // long reply chain does not recurse once per level.
  fn drop(&mut self) {
    let mut pending = std::mem::take(&mut self.children);
    while let Some(child) = pending.pop() {
      if let Some(mut owned) = Arc::into_inner(child) {
        pending.append(&mut owned.children);
      }
    }
  }
}

impl PartialEq for ArgumentNode {
  fn eq(&self, other: &Self) -> bool {
    let mut pending = vec![(self, other)];
    while let Some((a, b)) = pending.pop() {
      if !a.shallow_eq(b) {
        return false;
      }
      pending.extend(a.children().zip(b.children()));
    }
    true
  }
}

impl fmt::Debug for ArgumentNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ArgumentNode")
      .field("id", &self.id)
      .field("author", &self.author)
      .field("role", &self.role)
      .field("content", &self.content)
      .field("kind", &self.kind)
      .field("timestamp", &self.timestamp)
      .field("votes", &self.votes)
      .field("children", &self.children.len())
      .finish()
  }
}

// ─── Serde ───────────────────────────────────────────────────────────────────

// Nested nodes recurse once per level through the (de)serializer. Each
// level first makes sure enough stack is left, and moves onto a fresh heap
// segment otherwise.

const STACK_RED_ZONE: usize = 256 * 1024;
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

impl Serialize for ArgumentNode {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
      let mut node = serializer.serialize_struct("ArgumentNode", 8)?;
      node.serialize_field("id", &self.id)?;
      node.serialize_field("author", &self.author)?;
      node.serialize_field("role", &self.role)?;
      node.serialize_field("content", &self.content)?;
      node.serialize_field("type", &self.kind)?;
      node.serialize_field("timestamp", &self.timestamp.timestamp_millis())?;
      node.serialize_field("votes", &self.votes)?;
      node.serialize_field("children", &self.children)?;
      node.end()
    })
  }
}

/// Wire shape of a node.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRepr {
  id:        NodeId,
  author:    String,
  role:      Role,
  content:   String,
  #[serde(rename = "type")]
  kind:      NodeKind,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  timestamp: DateTime<Utc>,
  #[serde(default)]
  votes:     NodeVotes,
  #[serde(default)]
  children:  Vec<ArgumentNode>,
}

impl<'de> Deserialize<'de> for ArgumentNode {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let repr = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
      NodeRepr::deserialize(deserializer)
    })?;
    Ok(Self {
      id:        repr.id,
      author:    repr.author,
      role:      repr.role,
      content:   repr.content,
      kind:      repr.kind,
      timestamp: repr.timestamp,
      votes:     repr.votes,
      children:  repr.children.into_iter().map(Arc::new).collect(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn serialises_with_interchange_field_names() {
    let at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
    let node = ArgumentNode::new("Ada", Role::Con, NodeKind::Rebuttal, "No.")
      .with_id("c1")
      .with_timestamp(at);

    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["id"], "c1");
    assert_eq!(json["role"], "CON");
    assert_eq!(json["type"], "REBUTTAL");
    assert_eq!(json["timestamp"], 1_700_000_000_000_i64);
    assert_eq!(json["votes"]["likes"], 0);
    assert!(json["children"].as_array().unwrap().is_empty());
  }

  #[test]
  fn fresh_nodes_survive_a_round_trip() {
    let node = ArgumentNode::new("Ada", Role::Pro, NodeKind::Argument, "Yes.")
      .with_child(ArgumentNode::new("Bo", Role::Con, NodeKind::Rebuttal, "No."));
    assert_eq!(node.timestamp.timestamp_subsec_nanos() % 1_000_000, 0);

    let json = serde_json::to_string(&node).unwrap();
    let back: ArgumentNode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, node);

    let precise = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
    let stamped = node.with_timestamp(precise);
    assert_eq!(stamped.timestamp.timestamp_subsec_nanos(), 123_000_000);
  }

  #[test]
  fn deserialises_nested_children() {
    let json = serde_json::json!({
      "id": "r1",
      "author": "Ada",
      "role": "PRO",
      "content": "Yes.",
      "type": "ARGUMENT",
      "timestamp": 1_000,
      "votes": { "likes": 3, "support": 1 },
      "children": [{
        "id": "c1",
        "author": "Bo",
        "role": "CON",
        "content": "No.",
        "type": "DISAGREEMENT",
        "timestamp": 2_000
      }]
    });

    let node: ArgumentNode = serde_json::from_value(json).unwrap();
    assert_eq!(node.votes.likes, 3);
    assert_eq!(node.child_count(), 1);
    let child = node.children().next().unwrap();
    assert_eq!(child.kind, NodeKind::Disagreement);
    assert_eq!(child.votes, NodeVotes::default());
  }

  #[test]
  fn reply_kinds_map_both_ways() {
    for t in [
      ReplyType::Rebuttal,
      ReplyType::Agreement,
      ReplyType::Disagreement,
    ] {
      assert_eq!(NodeKind::from(t).reply_type(), Some(t));
    }
    assert_eq!(NodeKind::Argument.reply_type(), None);
    assert_eq!(NodeKind::Disagreement.to_string(), "DISAGREEMENT");
  }

  #[test]
  fn dropping_a_long_chain_does_not_overflow() {
    let mut node = ArgumentNode::new("a", Role::Pro, NodeKind::Argument, "x");
    for _ in 0..200_000 {
      node = ArgumentNode::new("a", Role::Con, NodeKind::Rebuttal, "x")
        .with_child(node);
    }
    drop(node);
  }
}
