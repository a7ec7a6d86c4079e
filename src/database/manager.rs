use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{AppConfig, StoreBackend};
use crate::database::memory::MemoryRecordStore;
use crate::database::postgres::PgRecordStore;
use crate::database::store::{validate_resource_name, RecordStore, StoreError};

/// Builds the store handle once at startup. The returned handle is shared by
/// every request task and must be closed after the server stops.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
        let resource = &config.api.resource;
        validate_resource_name(resource)?;

        match config.database.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store for '{}'; records are lost on restart", resource);
                Ok(Arc::new(MemoryRecordStore::new()))
            }
            StoreBackend::Postgres => {
                let pool = Self::connect(config).await?;
                let store = PgRecordStore::new(pool, resource.clone())?;
                store.ensure_schema().await?;
                Ok(Arc::new(store))
            }
        }
    }

    async fn connect(config: &AppConfig) -> Result<PgPool, StoreError> {
        let db = &config.database;
        let display_url = Self::redact_url(&db.url)?;

        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .acquire_timeout(Duration::from_secs(db.connection_timeout))
            .connect(&db.url)
            .await?;

        info!("Connected to database at {}", display_url);
        Ok(pool)
    }

    /// Connection string safe for logs (password removed)
    pub fn redact_url(raw: &str) -> Result<String, StoreError> {
        let mut url = url::Url::parse(raw).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***")).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
