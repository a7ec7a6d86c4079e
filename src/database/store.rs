use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::query_builder::SearchFilter;
use crate::database::record::{NewRecord, Record, RecordPatch};

/// Errors from record stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("Record rejected by store: {0}")]
    Validation(String),

    #[error("Invalid resource name: {0}")]
    InvalidResource(String),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// CRUD contract over a single collection of records.
///
/// Implementations must be safe to share between request tasks; each call is
/// a single atomic store operation.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Matching records, newest `created_at` first
    async fn list(&self, filter: &SearchFilter) -> Result<Vec<Record>, StoreError>;

    async fn create(&self, record: NewRecord) -> Result<Record, StoreError>;

    /// Returns the record after the patch, or `StoreError::NotFound`
    async fn update(&self, id: Uuid, patch: RecordPatch) -> Result<Record, StoreError>;

    /// Returns the removed record, or `StoreError::NotFound`
    async fn delete(&self, id: Uuid) -> Result<Record, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Release connections; called once after the server stops accepting requests
    async fn close(&self);
}

/// Resource names double as table names, so keep them to `[a-z][a-z0-9_]*`
pub fn validate_resource_name(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = name.len() <= 63
        && chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidResource(name.to_string()))
    }
}
