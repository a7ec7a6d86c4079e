use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::query_builder::SearchFilter;
use crate::database::record::{NewRecord, Record, RecordPatch};
use crate::database::store::{validate_resource_name, RecordStore, StoreError};

const COLUMNS: &str = r#""id", "title", "body", "tags", "created_at""#;

/// PostgreSQL-backed store: one table per resource, named after it
pub struct PgRecordStore {
    pool: PgPool,
    table: String,
}

impl PgRecordStore {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        validate_resource_name(&table)?;
        Ok(Self { pool, table })
    }

    /// Create the table and its ordering index if missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in self.schema_statements() {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        tracing::info!("Schema ready for table {}", self.table);
        Ok(())
    }

    fn quoted_table(&self) -> String {
        format!("\"{}\"", self.table)
    }

    fn schema_statements(&self) -> Vec<String> {
        let table = self.quoted_table();
        vec![
            format!(
                r#"CREATE TABLE IF NOT EXISTS {table} (
                    "id" UUID PRIMARY KEY,
                    "title" TEXT NOT NULL CHECK (btrim("title") <> ''),
                    "body" TEXT NOT NULL CHECK (btrim("body") <> ''),
                    "tags" TEXT[] NOT NULL DEFAULT '{{}}',
                    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now()
                )"#,
                table = table
            ),
            format!(
                r#"CREATE INDEX IF NOT EXISTS "{name}_created_at_idx" ON {table} ("created_at" DESC)"#,
                name = self.table,
                table = table
            ),
        ]
    }

    fn list_sql(&self, where_clause: &str) -> String {
        format!(
            r#"SELECT {columns} FROM {table} WHERE {where_clause} ORDER BY "created_at" DESC"#,
            columns = COLUMNS,
            table = self.quoted_table(),
            where_clause = where_clause
        )
    }

    fn insert_sql(&self) -> String {
        format!(
            r#"INSERT INTO {table} ({columns}) VALUES ($1, $2, $3, $4, $5) RETURNING {columns}"#,
            table = self.quoted_table(),
            columns = COLUMNS
        )
    }

    fn update_sql(&self) -> String {
        format!(
            r#"UPDATE {table} SET "title" = COALESCE($2, "title"), "body" = COALESCE($3, "body"), "tags" = COALESCE($4, "tags") WHERE "id" = $1 RETURNING {columns}"#,
            table = self.quoted_table(),
            columns = COLUMNS
        )
    }

    fn delete_sql(&self) -> String {
        format!(
            r#"DELETE FROM {table} WHERE "id" = $1 RETURNING {columns}"#,
            table = self.quoted_table(),
            columns = COLUMNS
        )
    }
}

/// Constraint violations are the store rejecting the record shape
fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        // 23502 not_null_violation, 23514 check_violation
        if matches!(db.code().as_deref(), Some("23502") | Some("23514")) {
            return StoreError::Validation(db.message().to_string());
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list(&self, filter: &SearchFilter) -> Result<Vec<Record>, StoreError> {
        let (where_clause, params) = filter.to_sql(1);
        let sql = self.list_sql(&where_clause);

        let mut q = sqlx::query_as::<_, Record>(&sql);
        for p in params.iter() {
            q = q.bind(p);
        }
        q.fetch_all(&self.pool).await.map_err(map_sqlx)
    }

    async fn create(&self, record: NewRecord) -> Result<Record, StoreError> {
        let record = record.into_record(Utc::now());
        let sql = self.insert_sql();

        sqlx::query_as::<_, Record>(&sql)
            .bind(record.id)
            .bind(&record.title)
            .bind(&record.body)
            .bind(&record.tags)
            .bind(record.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)
    }

    async fn update(&self, id: Uuid, patch: RecordPatch) -> Result<Record, StoreError> {
        let sql = self.update_sql();

        sqlx::query_as::<_, Record>(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.body)
            .bind(patch.tags)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<Record, StoreError> {
        let sql = self.delete_sql();

        sqlx::query_as::<_, Record>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or(StoreError::NotFound(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Closed database pool for table {}", self.table);
    }
}
