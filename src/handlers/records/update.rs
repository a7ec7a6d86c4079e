use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::database::{Record, RecordPayload};
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::state::AppState;

use super::{log_failure, parse_id};

/// PUT /{resource}/:id - merge-patch update; omitted fields keep their value
pub async fn put(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Record>, ApiError> {
    match update_record(&state, &identity, &id, payload).await {
        Ok(record) => {
            tracing::info!(
                operation = "update",
                resource = %state.resource,
                id = %record.id,
                subject = identity.subject().unwrap_or("-"),
                "Record updated"
            );
            Ok(Json(record))
        }
        Err(e) => Err(log_failure("update", &state, Some(&id), e)),
    }
}

async fn update_record(
    state: &AppState,
    identity: &Identity,
    raw_id: &str,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Record, ApiError> {
    state.authorize_write(identity)?;

    let id = parse_id(raw_id)?;
    let Json(body) = payload?;
    let patch = RecordPayload::from_json(body)?.into_patch()?;

    Ok(state.store.update(id, patch).await?)
}
