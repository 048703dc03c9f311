//! Domain models for Fleet Beacon.

pub mod annotation;
pub mod beacon_reader;
pub mod location;
pub mod sighting;
pub mod table;
pub mod vessel;

pub use annotation::{BoundingBox, MapAnnotation};
pub use beacon_reader::{BeaconReader, ReaderInput, ResolvedReader};
pub use location::{Location, LocationInput};
pub use sighting::{BeaconSighting, GATEWAY_TYPE};
pub use table::{next_id, Record, TableKind};
pub use vessel::{Vessel, VesselInput};
