//! Handler for posting to a debate's argument tree.
//!
//! `POST /debates/{id}/arguments` with body [`ArgumentBody`]. Without
//! `parentId` the post becomes a new root argument; with `parentId` and
//! `replyType` it is appended under that node.
//!
//! | Status | When |
//! |--------|------|
//! | 201 | Created; body is the new node |
//! | 400 | Blank content, or only one of `parentId` / `replyType` |
//! | 403 | Posting as a viewer |
//! | 404 | Unknown debate or parent |
//! | 409 | Debate completed or cancelled |

use agora_core::{
  analysis::Analyst,
  composer::Composer,
  debate::DebateId,
  node::{NodeId, ReplyType},
  participant::Participant,
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError, handlers::session};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentBody {
  pub participant: Participant,
  pub content:     String,
  pub parent_id:   Option<NodeId>,
  pub reply_type:  Option<ReplyType>,
}

impl ArgumentBody {
  fn composer(&self) -> Result<Composer, ApiError> {
    match (&self.parent_id, self.reply_type) {
      (None, None) => Ok(Composer::new()),
      (Some(parent), Some(reply_type)) => {
        Ok(Composer::replying(parent.clone(), reply_type))
      }
      _ => Err(ApiError::BadRequest(
        "parentId and replyType must be given together".into(),
      )),
    }
  }
}

/// `POST /debates/{id}/arguments`
pub async fn create<A>(
  State(state): State<AppState<A>>,
  Path(id): Path<DebateId>,
  Json(body): Json<ArgumentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  A: Analyst + 'static,
{
  let mut composer = body.composer()?;
  let session = session(&state, id).await?;
  let mut session = session.lock().await;

  let node_id =
    composer.submit(session.debate_mut(), body.participant, &body.content)?;
  let node = session
    .forest()
    .get(&node_id)
    .cloned()
    .ok_or_else(|| ApiError::NotFound(format!("argument {node_id} not found")))?;
  Ok((StatusCode::CREATED, Json(node)))
}
