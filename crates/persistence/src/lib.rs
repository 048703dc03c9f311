//! Persistence layer for the Fleet Beacon backend.
//!
//! This crate contains:
//! - Database connection management
//! - Key-value store back ends (in-memory and PostgreSQL)
//! - Fixture sources used to seed empty tables
//! - The reference store that owns the dashboard tables

pub mod db;
pub mod entities;
pub mod error;
pub mod fixtures;
pub mod kv;
pub mod metrics;
pub mod reference_store;
pub mod repositories;

pub use error::StoreError;
pub use fixtures::{FixtureSource, HttpFixtureSource, StaticFixtureSource};
pub use kv::{InMemoryKeyValueStore, KeyValueStore};
pub use reference_store::ReferenceStore;
pub use repositories::KvEntryRepository;
