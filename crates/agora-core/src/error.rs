//! Error types for `agora-core`.

use thiserror::Error;

use crate::{debate::DebateStatus, node::NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("argument not found: {0}")]
  NodeNotFound(NodeId),

  #[error("argument id already present in the tree: {0}")]
  DuplicateNodeId(NodeId),

  #[error("argument content is empty")]
  EmptyContent,

  #[error("no reply is being composed")]
  NotReplying,

  #[error("viewers cannot post arguments")]
  NotPermitted,

  #[error("debate is {0} and no longer accepts arguments")]
  DebateClosed(DebateStatus),

  #[error("cannot move debate from {from} to {to}")]
  InvalidTransition { from: DebateStatus, to: DebateStatus },

  #[error("an analysis is already in flight")]
  AnalysisInFlight,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
