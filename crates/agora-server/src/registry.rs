//! In-memory registry of live debate sessions.
//!
//! Each session sits behind its own mutex, so mutations of one debate are
//! serialised while different debates proceed independently.

use std::{collections::HashMap, sync::Arc};

use agora_core::{
  debate::{Debate, DebateId},
  session::DebateSession,
};
use tokio::sync::{Mutex, RwLock};

pub type SharedSession = Arc<Mutex<DebateSession>>;

#[derive(Default)]
struct Inner {
  sessions: HashMap<DebateId, SharedSession>,
  /// Creation order, for stable listings.
  order:    Vec<DebateId>,
}

#[derive(Default)]
pub struct DebateRegistry {
  inner: RwLock<Inner>,
}

impl DebateRegistry {
  pub fn new() -> Self { Self::default() }

  /// Register `debate` and return its id. A debate whose id is already
  /// registered replaces the earlier session.
  pub async fn insert(&self, debate: Debate) -> DebateId {
    let id = debate.id;
    let session = Arc::new(Mutex::new(DebateSession::new(debate)));
    let mut inner = self.inner.write().await;
    if inner.sessions.insert(id, session).is_none() {
      inner.order.push(id);
    }
    id
  }

  pub async fn get(&self, id: DebateId) -> Option<SharedSession> {
    self.inner.read().await.sessions.get(&id).cloned()
  }

  /// Every session in creation order.
  pub async fn all(&self) -> Vec<SharedSession> {
    let inner = self.inner.read().await;
    inner
      .order
      .iter()
      .filter_map(|id| inner.sessions.get(id).cloned())
      .collect()
  }
}
