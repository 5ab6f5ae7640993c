//! One debate's working state: the debate itself, the local composer, the
//! analysis gate, and the most recent verdict.
//!
//! A session is a plain owned value. Callers that share it across tasks
//! wrap it in a lock; the analysis round trip is split into
//! [`begin_analysis`](DebateSession::begin_analysis) and
//! [`record_verdict`](DebateSession::record_verdict) so that no lock needs
//! to be held while the analyst is working.

use std::sync::Arc;

use crate::{
  Error, Result,
  analysis::{AnalysisGate, AnalysisJob, Analyst, Transcript, Verdict},
  composer::{Composer, ReplyContext},
  debate::{Debate, Side},
  forest::Forest,
  node::{NodeId, ReplyType},
  participant::Participant,
};

#[derive(Debug)]
pub struct DebateSession {
  debate:   Debate,
  composer: Composer,
  gate:     Arc<AnalysisGate>,
  verdict:  Option<Verdict>,
}

impl DebateSession {
  pub fn new(debate: Debate) -> Self {
    Self {
      debate,
      composer: Composer::new(),
      gate: Arc::new(AnalysisGate::new()),
      verdict: None,
    }
  }

  pub fn debate(&self) -> &Debate { &self.debate }

  /// Direct access for lifecycle changes and posts made with a composer
  /// other than the session's own.
  pub fn debate_mut(&mut self) -> &mut Debate { &mut self.debate }

  pub fn forest(&self) -> &Forest { &self.debate.roots }

  /// A snapshot of the forest that later mutations will not touch.
  pub fn snapshot(&self) -> Forest { self.debate.roots.clone() }

  // ── Composing ─────────────────────────────────────────────────────────

  pub fn reply_context(&self) -> &ReplyContext { self.composer.context() }

  /// Target `parent` with the next post. The parent must exist.
  pub fn reply_to(&mut self, parent: NodeId, reply_type: ReplyType) -> Result<()> {
    if !self.debate.roots.contains(&parent) {
      return Err(Error::NodeNotFound(parent));
    }
    self.composer.reply_to(parent, reply_type);
    Ok(())
  }

  pub fn switch_reply_type(&mut self, reply_type: ReplyType) -> Result<()> {
    self.composer.switch_type(reply_type)
  }

  pub fn cancel_reply(&mut self) { self.composer.cancel(); }

  pub fn submit(
    &mut self,
    participant: Participant,
    content: &str,
  ) -> Result<NodeId> {
    self.composer.submit(&mut self.debate, participant, content)
  }

  // ── Votes ─────────────────────────────────────────────────────────────

  pub fn vote(&mut self, side: Side) -> u64 { self.debate.vote(side) }

  // ── Analysis ──────────────────────────────────────────────────────────

  pub fn transcript(&self) -> Transcript {
    Transcript::from_forest(self.debate.topic.clone(), &self.debate.roots)
  }

  pub fn is_analyzing(&self) -> bool { self.gate.is_in_flight() }

  /// Claim the analysis slot and capture the current transcript.
  pub fn begin_analysis(&self) -> Result<AnalysisJob> {
    let permit = self.gate.try_begin()?;
    Ok(AnalysisJob::new(self.transcript(), permit))
  }

  pub fn record_verdict(&mut self, verdict: Verdict) {
    self.verdict = Some(verdict);
  }

  pub fn last_verdict(&self) -> Option<&Verdict> { self.verdict.as_ref() }

  /// Run a full analysis round trip while holding `self` exclusively.
  pub async fn analyze<A: Analyst>(&mut self, analyst: &A) -> Result<Verdict> {
    let job = self.begin_analysis()?;
    let verdict = job.run(analyst).await;
    self.record_verdict(verdict.clone());
    Ok(verdict)
  }
}
