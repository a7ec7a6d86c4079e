use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::query_builder::SearchFilter;
use crate::database::record::{NewRecord, Record, RecordPatch};
use crate::database::store::{RecordStore, StoreError};

/// In-process store for local development and tests. Records are kept in
/// insertion order; nothing survives a restart.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, filter: &SearchFilter) -> Result<Vec<Record>, StoreError> {
        let records = self.records.read().await;
        // Reverse first so the stable sort puts later inserts first on equal timestamps
        let mut matching: Vec<Record> = records
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn create(&self, record: NewRecord) -> Result<Record, StoreError> {
        let record = record.into_record(Utc::now());
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: RecordPatch) -> Result<Record, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        patch.apply(record);
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<Record, StoreError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(records.remove(index))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {
        let count = self.records.read().await.len();
        tracing::info!("Memory store closed with {} records (discarded)", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(title: &str, tags: &[&str]) -> NewRecord {
        NewRecord {
            title: title.to_string(),
            body: format!("{} body", title),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = MemoryRecordStore::new();
        let first = store.create(new_record("first", &[])).await.unwrap();
        let second = store.create(new_record("second", &[])).await.unwrap();
        let third = store.create(new_record("third", &[])).await.unwrap();

        let ids: Vec<Uuid> = store
            .list(&SearchFilter::All)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn update_keeps_identity_and_order() {
        let store = MemoryRecordStore::new();
        let older = store.create(new_record("older", &[])).await.unwrap();
        let newer = store.create(new_record("newer", &[])).await.unwrap();

        let patch = RecordPatch {
            title: Some("older, edited".to_string()),
            ..Default::default()
        };
        let updated = store.update(older.id, patch).await.unwrap();
        assert_eq!(updated.id, older.id);
        assert_eq!(updated.created_at, older.created_at);
        assert_eq!(updated.body, older.body);

        let listed = store.list(&SearchFilter::All).await.unwrap();
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].title, "older, edited");
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids_are_not_found() {
        let store = MemoryRecordStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.update(id, RecordPatch::default()).await,
            Err(StoreError::NotFound(missing)) if missing == id
        ));
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let store = MemoryRecordStore::new();
        let keep = store.create(new_record("keep", &["a"])).await.unwrap();
        let drop = store.create(new_record("drop", &["a"])).await.unwrap();

        let removed = store.delete(drop.id).await.unwrap();
        assert_eq!(removed.id, drop.id);

        let listed = store.list(&SearchFilter::All).await.unwrap();
        assert_eq!(listed, vec![keep]);
        assert!(matches!(store.delete(drop.id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn search_filters_by_tag() {
        let store = MemoryRecordStore::new();
        let tagged = store.create(new_record("a", &["Work"])).await.unwrap();
        store.create(new_record("b", &["home"])).await.unwrap();

        let found = store.list(&SearchFilter::from_param(Some("work"))).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, tagged.id);
    }
}
