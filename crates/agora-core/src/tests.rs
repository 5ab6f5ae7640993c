//! End-to-end scenarios and properties for the argument tree, composer,
//! votes, and analysis round trip.

use std::{
  collections::HashMap,
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
};

use proptest::prelude::*;
use tokio::sync::Notify;

use crate::{
  Error,
  analysis::{Analyst, Transcript, Verdict, Winner},
  composer::ReplyContext,
  debate::{Debate, Side},
  forest::Forest,
  node::{ArgumentNode, NodeId, NodeKind, ReplyType, Role},
  participant::Participant,
  session::DebateSession,
};

fn node(id: &str, kind: NodeKind) -> ArgumentNode {
  ArgumentNode::new("tester", Role::Pro, kind, id).with_id(id)
}

fn ids(forest: &Forest) -> Vec<String> {
  forest.iter().map(|n| n.id.to_string()).collect()
}

fn live_session() -> DebateSession {
  let mut debate = Debate::new("Is a hot dog a sandwich?", "Ada", "Bo");
  debate.start().unwrap();
  DebateSession::new(debate)
}

// ─── Analysts ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("analyst unavailable")]
struct Unavailable;

/// Always answers with the same verdict.
struct Fixed(Verdict);

impl Analyst for Fixed {
  type Error = Unavailable;

  fn analyze<'a>(
    &'a self,
    _transcript: &'a Transcript,
  ) -> impl Future<Output = Result<Verdict, Unavailable>> + Send + 'a {
    async move { Ok(self.0.clone()) }
  }
}

/// Fails, but only once released; counts invocations.
#[derive(Default)]
struct Stalled {
  calls:   AtomicUsize,
  release: Notify,
}

impl Analyst for Stalled {
  type Error = Unavailable;

  fn analyze<'a>(
    &'a self,
    _transcript: &'a Transcript,
  ) -> impl Future<Output = Result<Verdict, Unavailable>> + Send + 'a {
    async move {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self.release.notified().await;
      Err(Unavailable)
    }
  }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn scenario_a_first_root() {
  let forest = Forest::new().with_root(node("r1", NodeKind::Argument)).unwrap();
  assert_eq!(forest.root_count(), 1);
  assert_eq!(forest.len(), 1);
  assert_eq!(ids(&forest), ["r1"]);
}

#[test]
fn scenario_b_reply_chain_flattens_in_pre_order() {
  let forest = Forest::new()
    .with_root(node("r1", NodeKind::Argument))
    .and_then(|f| f.with_reply(&"r1".into(), node("c1", NodeKind::Rebuttal)))
    .and_then(|f| f.with_reply(&"c1".into(), node("g1", NodeKind::Agreement)))
    .unwrap();
  assert_eq!(ids(&forest), ["r1", "c1", "g1"]);
}

#[test]
fn scenario_c_siblings_keep_insertion_order_not_time_order() {
  let now = chrono::Utc::now();
  let mut forest = Forest::new();
  forest.add_root(node("r1", NodeKind::Argument)).unwrap();
  forest
    .add_reply(
      &"r1".into(),
      node("c1", NodeKind::Rebuttal).with_timestamp(now),
    )
    .unwrap();
  forest
    .add_reply(
      &"r1".into(),
      node("c2", NodeKind::Agreement)
        .with_timestamp(now - chrono::Duration::hours(1)),
    )
    .unwrap();
  assert_eq!(ids(&forest), ["r1", "c1", "c2"]);
}

#[test]
fn scenario_d_missing_parent_changes_nothing() {
  let mut forest = Forest::new();
  forest.add_root(node("r1", NodeKind::Argument)).unwrap();
  forest.add_reply(&"r1".into(), node("c1", NodeKind::Rebuttal)).unwrap();
  let before = forest.clone();

  let result = forest.add_reply(&"missing-id".into(), node("x", NodeKind::Rebuttal));

  assert_eq!(result, Err(Error::NodeNotFound("missing-id".into())));
  assert_eq!(forest.len(), before.len());
  assert_eq!(forest, before);
}

#[tokio::test]
async fn scenario_e_second_analysis_is_refused_while_in_flight() {
  let mut session = live_session();
  session.submit(Participant::ProDebater, "Yes, bread around filling.").unwrap();

  let analyst = Arc::new(Stalled::default());
  let job = session.begin_analysis().unwrap();
  let worker = {
    let analyst = Arc::clone(&analyst);
    tokio::spawn(async move { job.run(analyst.as_ref()).await })
  };
  while analyst.calls.load(Ordering::SeqCst) == 0 {
    tokio::task::yield_now().await;
  }

  assert!(session.is_analyzing());
  assert_eq!(session.begin_analysis().unwrap_err(), Error::AnalysisInFlight);

  analyst.release.notify_one();
  let verdict = worker.await.unwrap();

  assert_eq!(analyst.calls.load(Ordering::SeqCst), 1);
  assert_eq!(verdict.winner, Winner::Tie);
  assert_eq!(verdict.pro_score, 50.0);
  assert_eq!(verdict.con_score, 50.0);
  assert!(!session.is_analyzing());
  assert!(session.begin_analysis().is_ok());
}

// ─── Session flows ───────────────────────────────────────────────────────────

#[test]
fn session_threads_replies_through_the_reply_context() {
  let mut s = live_session();
  let root = s.submit(Participant::ProDebater, "Opening").unwrap();

  assert_eq!(
    s.reply_to("nope".into(), ReplyType::Rebuttal),
    Err(Error::NodeNotFound("nope".into()))
  );
  assert_eq!(s.reply_context(), &ReplyContext::Idle);

  s.reply_to(root.clone(), ReplyType::Agreement).unwrap();
  s.switch_reply_type(ReplyType::Rebuttal).unwrap();
  let rebuttal = s.submit(Participant::ConDebater, "Counter").unwrap();

  s.reply_to(rebuttal.clone(), ReplyType::Disagreement).unwrap();
  s.cancel_reply();
  let second_root = s.submit(Participant::Judge, "Order, please").unwrap();

  let forest = s.forest();
  assert_eq!(forest.get(&rebuttal).unwrap().kind, NodeKind::Rebuttal);
  assert_eq!(forest.get(&second_root).unwrap().kind, NodeKind::Argument);
  assert_eq!(forest.get(&second_root).unwrap().role, Role::Judge);
  assert_eq!(
    forest.flatten().iter().map(|n| n.id.clone()).collect::<Vec<_>>(),
    [root, rebuttal, second_root]
  );
}

#[test]
fn snapshot_survives_later_posts() {
  let mut s = live_session();
  s.submit(Participant::ProDebater, "One").unwrap();
  let snapshot = s.snapshot();
  s.submit(Participant::ConDebater, "Two").unwrap();

  assert_eq!(snapshot.len(), 1);
  assert_eq!(s.forest().len(), 2);
}

#[test]
fn transcript_projects_author_as_sender_in_pre_order() {
  let mut s = live_session();
  let root = s.submit(Participant::ProDebater, "Opening").unwrap();
  s.submit(Participant::ProDebater, "Second point").unwrap();
  s.reply_to(root, ReplyType::Rebuttal).unwrap();
  s.submit(Participant::ConDebater, "Rebuttal").unwrap();

  let t = s.transcript();
  assert_eq!(t.topic, "Is a hot dog a sandwich?");
  let lines: Vec<_> = t
    .entries
    .iter()
    .map(|e| (e.sender.as_str(), e.role, e.content.as_str()))
    .collect();
  assert_eq!(lines, [
    ("Ada", Role::Pro, "Opening"),
    ("Bo", Role::Con, "Rebuttal"),
    ("Ada", Role::Pro, "Second point"),
  ]);
}

#[tokio::test]
async fn successful_analysis_is_normalised_and_recorded() {
  let mut s = live_session();
  s.submit(Participant::ConDebater, "No.").unwrap();
  let analyst = Fixed(Verdict {
    winner:    Winner::Con,
    reasoning: "Clearer framing.".into(),
    pro_score: -5.0,
    con_score: 81.0,
  });

  let verdict = s.analyze(&analyst).await.unwrap();

  assert_eq!(verdict.winner, Winner::Con);
  assert_eq!(verdict.pro_score, 0.0);
  assert_eq!(s.last_verdict(), Some(&verdict));
  assert!(!s.is_analyzing());
}

#[test]
fn session_votes_accumulate() {
  let mut s = live_session();
  s.vote(Side::Pro);
  s.vote(Side::Pro);
  s.vote(Side::Con);
  assert_eq!(s.debate().votes.pro, 2);
  assert_eq!(s.debate().votes.con, 1);
}

// ─── Properties ──────────────────────────────────────────────────────────────

/// Each step either adds a root or replies to an already-inserted node
/// chosen by index.
fn ops_strategy() -> impl Strategy<Value = Vec<(bool, usize)>> {
  prop::collection::vec((any::<bool>(), any::<usize>()), 0..60)
}

/// Apply `ops` to a forest and to a plain parent → children model.
fn build(ops: &[(bool, usize)]) -> (Forest, Vec<String>, HashMap<String, Vec<String>>) {
  let mut forest = Forest::new();
  let mut roots = Vec::new();
  let mut children: HashMap<String, Vec<String>> = HashMap::new();
  let mut inserted: Vec<String> = Vec::new();

  for (i, &(as_root, pick)) in ops.iter().enumerate() {
    let id = format!("n{i}");
    if as_root || inserted.is_empty() {
      forest.add_root(node(&id, NodeKind::Argument)).unwrap();
      roots.push(id.clone());
    } else {
      let parent = inserted[pick % inserted.len()].clone();
      forest
        .add_reply(&NodeId::from(parent.as_str()), node(&id, NodeKind::Rebuttal))
        .unwrap();
      children.entry(parent).or_default().push(id.clone());
    }
    inserted.push(id);
  }
  (forest, roots, children)
}

fn model_pre_order(
  roots: &[String],
  children: &HashMap<String, Vec<String>>,
) -> Vec<String> {
  let mut out = Vec::new();
  let mut stack: Vec<&String> = roots.iter().rev().collect();
  while let Some(id) = stack.pop() {
    out.push(id.clone());
    if let Some(kids) = children.get(id) {
      stack.extend(kids.iter().rev());
    }
  }
  out
}

proptest! {
  #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

  #[test]
  fn node_count_matches_operations(ops in ops_strategy()) {
    let (forest, _, _) = build(&ops);
    prop_assert_eq!(forest.len(), ops.len());
    prop_assert_eq!(forest.flatten().len(), ops.len());
  }

  #[test]
  fn flatten_is_pre_order_with_stable_siblings(ops in ops_strategy()) {
    let (forest, roots, children) = build(&ops);
    let flat = ids(&forest);
    prop_assert_eq!(&flat, &model_pre_order(&roots, &children));

    let position: HashMap<&str, usize> =
      flat.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();
    for (parent, kids) in &children {
      for kid in kids {
        prop_assert!(position[parent.as_str()] < position[kid.as_str()]);
      }
    }
  }

  #[test]
  fn flatten_is_repeatable(ops in ops_strategy()) {
    let (forest, _, _) = build(&ops);
    prop_assert_eq!(ids(&forest), ids(&forest));
  }

  #[test]
  fn missing_parent_is_a_no_op(ops in ops_strategy()) {
    let (mut forest, _, _) = build(&ops);
    let before = forest.clone();
    let result = forest.add_reply(&"absent".into(), node("new", NodeKind::Rebuttal));
    prop_assert!(matches!(result, Err(Error::NodeNotFound(_))));
    prop_assert_eq!(forest, before);
  }

  #[test]
  fn votes_count_every_call(pro in 0u64..200, con in 0u64..200) {
    let mut debate = Debate::new("t", "p", "c");
    for _ in 0..pro {
      debate.vote(Side::Pro);
    }
    for _ in 0..con {
      debate.vote(Side::Con);
    }
    prop_assert_eq!(debate.votes.pro, pro);
    prop_assert_eq!(debate.votes.con, con);
  }
}
