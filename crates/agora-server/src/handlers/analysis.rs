//! Handlers for the flattened transcript and the analysis round trip.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/debates/{id}/transcript` | Pre-order transcript |
//! | `POST` | `/debates/{id}/analysis` | 409 while another analysis runs; otherwise always a verdict |

use agora_core::{
  analysis::{Analyst, Transcript, Verdict},
  debate::DebateId,
};
use axum::{
  Json,
  extract::{Path, State},
};

use crate::{AppState, error::ApiError, handlers::session};

/// `GET /debates/{id}/transcript`
pub async fn transcript<A>(
  State(state): State<AppState<A>>,
  Path(id): Path<DebateId>,
) -> Result<Json<Transcript>, ApiError>
where
  A: Analyst + 'static,
{
  let session = session(&state, id).await?;
  let transcript = session.lock().await.transcript();
  Ok(Json(transcript))
}

/// `POST /debates/{id}/analysis`
///
/// The session lock is released while the analyst works, so posts and
/// votes continue meanwhile; the verdict reflects the transcript captured
/// when the request arrived.
pub async fn run<A>(
  State(state): State<AppState<A>>,
  Path(id): Path<DebateId>,
) -> Result<Json<Verdict>, ApiError>
where
  A: Analyst + 'static,
{
  let session = session(&state, id).await?;
  let job = session.lock().await.begin_analysis()?;

  let verdict = job.run(state.analyst.as_ref()).await;

  session.lock().await.record_verdict(verdict.clone());
  Ok(Json(verdict))
}
