use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::Identity;
use crate::state::AppState;

use super::{log_failure, parse_id};

/// Confirmation body; the deleted record itself is not echoed
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
    pub id: Uuid,
}

/// DELETE /{resource}/:id - remove a record
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    match delete_record(&state, &identity, &id).await {
        Ok(deleted) => {
            tracing::info!(
                operation = "delete",
                resource = %state.resource,
                id = %deleted,
                subject = identity.subject().unwrap_or("-"),
                "Record deleted"
            );
            Ok(Json(DeleteResponse {
                message: "Record deleted",
                id: deleted,
            }))
        }
        Err(e) => Err(log_failure("delete", &state, Some(&id), e)),
    }
}

async fn delete_record(state: &AppState, identity: &Identity, raw_id: &str) -> Result<Uuid, ApiError> {
    state.authorize_write(identity)?;

    let id = parse_id(raw_id)?;
    let removed = state.store.delete(id).await?;
    Ok(removed.id)
}
