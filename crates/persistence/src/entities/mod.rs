//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod kv_entry;

pub use kv_entry::KvEntryEntity;
