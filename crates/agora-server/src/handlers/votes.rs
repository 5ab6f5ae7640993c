//! `POST /debates/{id}/votes`. Body `{"side":"pro"|"con"}`; returns the
//! updated tallies. Every call counts.

use agora_core::{
  analysis::Analyst,
  debate::{DebateId, DebateVotes, Side},
};
use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;

use crate::{AppState, error::ApiError, handlers::session};

#[derive(Debug, Deserialize)]
pub struct VoteBody {
  pub side: Side,
}

pub async fn cast<A>(
  State(state): State<AppState<A>>,
  Path(id): Path<DebateId>,
  Json(body): Json<VoteBody>,
) -> Result<Json<DebateVotes>, ApiError>
where
  A: Analyst + 'static,
{
  let session = session(&state, id).await?;
  let mut session = session.lock().await;
  session.vote(body.side);
  Ok(Json(session.debate().votes))
}
