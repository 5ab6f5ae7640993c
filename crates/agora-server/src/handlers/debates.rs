//! Handlers for `/debates` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/debates` | Summaries, creation order |
//! | `POST` | `/debates` | Body: [`CreateBody`]; returns 201 + debate |
//! | `GET`  | `/debates/{id}` | Full debate including the argument tree |
//! | `POST` | `/debates/{id}/status` | Body: `{"action":"start"\|"end"\|"cancel"}` |

use agora_core::{
  analysis::Analyst,
  debate::{Debate, DebateId, DebateStatus, DebateVotes},
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, error::ApiError, handlers::session};

// ─── List ─────────────────────────────────────────────────────────────────────

/// A debate without its argument tree.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateSummary {
  pub id:             DebateId,
  pub topic:          String,
  pub category:       String,
  pub status:         DebateStatus,
  pub pro_user:       String,
  pub con_user:       String,
  pub votes:          DebateVotes,
  pub argument_count: usize,
}

impl From<&Debate> for DebateSummary {
  fn from(d: &Debate) -> Self {
    Self {
      id:             d.id,
      topic:          d.topic.clone(),
      category:       d.category.clone(),
      status:         d.status,
      pro_user:       d.pro_user.clone(),
      con_user:       d.con_user.clone(),
      votes:          d.votes,
      argument_count: d.roots.len(),
    }
  }
}

/// `GET /debates`
pub async fn list<A>(State(state): State<AppState<A>>) -> Json<Vec<DebateSummary>>
where
  A: Analyst + 'static,
{
  let sessions = state.registry.all().await;
  let mut summaries = Vec::with_capacity(sessions.len());
  for session in sessions {
    summaries.push(DebateSummary::from(session.lock().await.debate()));
  }
  Json(summaries)
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub topic:       String,
  pub pro_user:    String,
  pub con_user:    String,
  #[serde(default)]
  pub category:    String,
  #[serde(default)]
  pub description: String,
  /// Start the debate immediately instead of leaving it upcoming.
  #[serde(default)]
  pub live:        bool,
}

/// `POST /debates`; returns 201 + the new [`Debate`].
pub async fn create<A>(
  State(state): State<AppState<A>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  A: Analyst + 'static,
{
  if body.topic.trim().is_empty() {
    return Err(ApiError::BadRequest("topic must not be empty".into()));
  }

  let mut debate = Debate::new(body.topic, body.pro_user, body.con_user)
    .with_category(body.category)
    .with_description(body.description);
  if body.live {
    debate.start()?;
  }

  info!(debate = %debate.id, topic = %debate.topic, "debate created");
  state.registry.insert(debate.clone()).await;
  Ok((StatusCode::CREATED, Json(debate)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /debates/{id}`
pub async fn get_one<A>(
  State(state): State<AppState<A>>,
  Path(id): Path<DebateId>,
) -> Result<Json<Debate>, ApiError>
where
  A: Analyst + 'static,
{
  let session = session(&state, id).await?;
  let debate = session.lock().await.debate().clone();
  Ok(Json(debate))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusAction {
  Start,
  End,
  Cancel,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub action: StatusAction,
}

/// `POST /debates/{id}/status`; 409 if the transition is not allowed.
pub async fn change_status<A>(
  State(state): State<AppState<A>>,
  Path(id): Path<DebateId>,
  Json(body): Json<StatusBody>,
) -> Result<Json<DebateSummary>, ApiError>
where
  A: Analyst + 'static,
{
  let session = session(&state, id).await?;
  let mut session = session.lock().await;
  let debate = session.debate_mut();
  match body.action {
    StatusAction::Start => debate.start()?,
    StatusAction::End => debate.end()?,
    StatusAction::Cancel => debate.cancel()?,
  }
  Ok(Json(DebateSummary::from(&*debate)))
}
