// handlers/records - CRUD endpoints for the configured resource
//
//   GET    /{resource}?search=   list.rs
//   POST   /{resource}           create.rs
//   PUT    /{resource}/:id       update.rs
//   DELETE /{resource}/:id       delete.rs

pub mod create;
pub mod delete;
pub mod list;
pub mod update;

pub use create::post as record_create;
pub use delete::delete as record_delete;
pub use list::get as record_list;
pub use update::put as record_update;

use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Record the failed outcome of an operation and hand the error back
pub(crate) fn log_failure(operation: &'static str, state: &AppState, id: Option<&str>, err: ApiError) -> ApiError {
    let id = id.unwrap_or("-");
    if err.is_server_error() {
        tracing::error!(operation, resource = %state.resource, id, code = err.error_code(), "Request failed");
    } else {
        tracing::warn!(operation, resource = %state.resource, id, code = err.error_code(), "Request rejected");
    }
    err
}

/// Ids that are not UUIDs cannot name a stored record
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Record not found"))
}
