use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;

use crate::database::{Record, RecordPayload};
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::state::AppState;

use super::log_failure;

/// POST /{resource} - create a record from {title, body, tags?}
pub async fn post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    match create_record(&state, &identity, payload).await {
        Ok(record) => {
            tracing::info!(
                operation = "create",
                resource = %state.resource,
                id = %record.id,
                subject = identity.subject().unwrap_or("-"),
                "Record created"
            );
            Ok((StatusCode::CREATED, Json(record)))
        }
        Err(e) => Err(log_failure("create", &state, None, e)),
    }
}

async fn create_record(
    state: &AppState,
    identity: &Identity,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Record, ApiError> {
    // Nothing is parsed or stored before the write gate
    state.authorize_write(identity)?;

    let Json(body) = payload?;
    let new_record = RecordPayload::from_json(body)?.into_new_record()?;

    Ok(state.store.create(new_record).await?)
}
