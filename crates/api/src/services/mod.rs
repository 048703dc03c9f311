//! Application services.

pub mod tracking;

pub use tracking::{MapSnapshot, TickOutcome, TrackingError, TrackingService};
