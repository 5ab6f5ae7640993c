//! Route handlers, one module per resource.

pub mod analysis;
pub mod arguments;
pub mod debates;
pub mod votes;

use agora_core::{analysis::Analyst, debate::DebateId};

use crate::{AppState, error::ApiError, registry::SharedSession};

/// Look up a session or fail with 404.
pub(crate) async fn session<A: Analyst>(
  state: &AppState<A>,
  id: DebateId,
) -> Result<SharedSession, ApiError> {
  state
    .registry
    .get(id)
    .await
    .ok_or_else(|| ApiError::NotFound(format!("debate {id} not found")))
}
