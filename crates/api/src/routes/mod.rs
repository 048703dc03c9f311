//! HTTP route handlers.

pub mod feed;
pub mod health;
pub mod locations;
pub mod map;
pub mod readers;
pub mod sightings;
pub mod vessels;
