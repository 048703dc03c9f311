//! Repository implementations for database operations.

pub mod kv_entry;

pub use kv_entry::KvEntryRepository;
