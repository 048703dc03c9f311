//! Domain layer for the Fleet Beacon backend.
//!
//! This crate contains:
//! - Domain models (Location, Vessel, BeaconReader, BeaconSighting, MapAnnotation)
//! - Business logic services (reader resolution, correlation, table editors)
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::{CorrelationError, DomainError};
