//! Reply context: whether the next post starts a new argument or answers an
//! existing one, and the submit step that turns a draft into a node.
//!
//! ```text
//!            reply_to(p, t)                 switch_type(t')
//!   Idle ─────────────────────▶ Replying(p, t) ───────────▶ Replying(p, t')
//!    ▲                               │
//!    └──── cancel / submit (ok) ─────┘
//! ```
//!
//! A rejected submit (empty content, missing parent, closed debate) leaves
//! the context where it was.

use tracing::debug;

use crate::{
  Error, Result,
  debate::Debate,
  node::{ArgumentNode, NodeId, NodeKind, ReplyType},
  participant::Participant,
};

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReplyContext {
  /// Composing a new root argument.
  #[default]
  Idle,
  Replying {
    parent:     NodeId,
    reply_type: ReplyType,
  },
}

impl ReplyContext {
  /// Start (or retarget) a reply. Valid from any state.
  pub fn reply_to(&mut self, parent: NodeId, reply_type: ReplyType) {
    *self = Self::Replying { parent, reply_type };
  }

  /// Change the reply type while keeping the target.
  pub fn switch_type(&mut self, reply_type: ReplyType) -> Result<()> {
    match self {
      Self::Idle => Err(Error::NotReplying),
      Self::Replying { reply_type: current, .. } => {
        *current = reply_type;
        Ok(())
      }
    }
  }

  pub fn cancel(&mut self) { *self = Self::Idle; }

  pub fn is_replying(&self) -> bool { matches!(self, Self::Replying { .. }) }

  pub fn parent(&self) -> Option<&NodeId> {
    match self {
      Self::Idle => None,
      Self::Replying { parent, .. } => Some(parent),
    }
  }

  /// Kind of the node the next submit will create.
  pub fn kind(&self) -> NodeKind {
    match self {
      Self::Idle => NodeKind::Argument,
      Self::Replying { reply_type, .. } => (*reply_type).into(),
    }
  }
}

// ─── Composer ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Composer {
  context: ReplyContext,
}

impl Composer {
  pub fn new() -> Self { Self::default() }

  /// A composer already replying to `parent`.
  pub fn replying(parent: NodeId, reply_type: ReplyType) -> Self {
    Self { context: ReplyContext::Replying { parent, reply_type } }
  }

  pub fn context(&self) -> &ReplyContext { &self.context }

  pub fn reply_to(&mut self, parent: NodeId, reply_type: ReplyType) {
    self.context.reply_to(parent, reply_type);
  }

  pub fn switch_type(&mut self, reply_type: ReplyType) -> Result<()> {
    self.context.switch_type(reply_type)
  }

  pub fn cancel(&mut self) { self.context.cancel(); }

  /// Post `content` to `debate` as `participant` and return the new node's
  /// id. Goes back to [`ReplyContext::Idle`] on success only.
  pub fn submit(
    &mut self,
    debate: &mut Debate,
    participant: Participant,
    content: &str,
  ) -> Result<NodeId> {
    if content.trim().is_empty() {
      return Err(Error::EmptyContent);
    }
    if !debate.status.accepts_arguments() {
      return Err(Error::DebateClosed(debate.status));
    }
    let (author, role) = participant.speaker(debate)?;

    let node = ArgumentNode::new(author, role, self.context.kind(), content);
    let id = node.id.clone();
    match &self.context {
      ReplyContext::Idle => debate.roots.add_root(node)?,
      ReplyContext::Replying { parent, .. } => {
        debate.roots.add_reply(parent, node)?
      }
    }

    debug!(debate = %debate.id, id = %id, "argument submitted");
    self.context.cancel();
    Ok(id)
  }
}
