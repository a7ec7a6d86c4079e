pub mod manager;
pub mod memory;
pub mod postgres;
pub mod query_builder;
pub mod record;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;
pub use query_builder::SearchFilter;
pub use record::{NewRecord, Record, RecordError, RecordPatch, RecordPayload};
pub use store::{RecordStore, StoreError};
