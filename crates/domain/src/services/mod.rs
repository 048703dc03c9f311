//! Domain services for Fleet Beacon.
//!
//! Services contain business logic that operates on domain models.

pub mod correlation;
pub mod editor;
pub mod reader_resolver;

pub use correlation::{correlate, CorrelationOutcome, ReferenceTables, LATITUDE_STEP};
pub use reader_resolver::{orphaned_only, resolve_readers, resolved_only, ReaderResolution};
