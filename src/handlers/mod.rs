// handlers/mod.rs
//
// records: CRUD on the configured resource (identity checked on writes)
// system:  service description and health, always public

pub mod records;
pub mod system;
