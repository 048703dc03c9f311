//! Add/edit/delete operations on the reference tables.
//!
//! Each operation mutates the in-memory table only after every check has
//! passed; the caller persists the table afterward. An input `Id` of 0 means
//! "add", anything else edits the record with that id.

use tracing::info;
use validator::Validate;

use crate::error::DomainError;
use crate::models::{
    next_id, BeaconReader, Location, LocationInput, ReaderInput, Vessel, VesselInput,
};

/// Adds or updates a location. Returns the stored record.
pub fn save_location(
    table: &mut Vec<Location>,
    input: LocationInput,
) -> Result<Location, DomainError> {
    input.validate()?;

    if table
        .iter()
        .any(|l| l.id != input.id && l.same_coordinates(input.latitude, input.longitude))
    {
        return Err(DomainError::Validation(
            "A location already exists at this latitude and longitude".to_string(),
        ));
    }

    if input.id == 0 {
        let location = input.into_location(next_id(table));
        table.push(location.clone());
        info!(location_id = location.id, name = %location.name, "Location created");
        return Ok(location);
    }

    let existing = find_mut(table, input.id, |l| l.id, "Location")?;
    *existing = input.into_location(existing.id);
    info!(location_id = existing.id, "Location updated");
    Ok(existing.clone())
}

/// Removes a location unless a reader is installed there.
pub fn delete_location(
    table: &mut Vec<Location>,
    readers: &[BeaconReader],
    id: i64,
) -> Result<Location, DomainError> {
    if let Some(reader) = readers.iter().find(|r| r.location_id == id) {
        return Err(DomainError::ReferentialIntegrity(format!(
            "Location {} cannot be deleted because reader '{}' is installed there",
            id, reader.name
        )));
    }

    let removed = remove(table, id, |l| l.id, "Location")?;
    info!(location_id = id, "Location deleted");
    Ok(removed)
}

/// Adds or updates a vessel. Returns the stored record.
pub fn save_vessel(table: &mut Vec<Vessel>, input: VesselInput) -> Result<Vessel, DomainError> {
    input.validate()?;

    if table.iter().any(|v| v.id != input.id && v.mac == input.mac) {
        return Err(DomainError::Validation(format!(
            "A vessel with mac {} already exists",
            input.mac
        )));
    }

    if input.id == 0 {
        let vessel = input.into_vessel(next_id(table));
        table.push(vessel.clone());
        info!(vessel_id = vessel.id, mac = %vessel.mac, "Vessel created");
        return Ok(vessel);
    }

    let existing = find_mut(table, input.id, |v| v.id, "Vessel")?;
    *existing = input.into_vessel(existing.id);
    info!(vessel_id = existing.id, "Vessel updated");
    Ok(existing.clone())
}

pub fn delete_vessel(table: &mut Vec<Vessel>, id: i64) -> Result<Vessel, DomainError> {
    let removed = remove(table, id, |v| v.id, "Vessel")?;
    info!(vessel_id = id, "Vessel deleted");
    Ok(removed)
}

/// Adds or updates a beacon reader. The referenced location must exist.
pub fn save_reader(
    table: &mut Vec<BeaconReader>,
    locations: &[Location],
    input: ReaderInput,
) -> Result<BeaconReader, DomainError> {
    input.validate()?;

    if !locations.iter().any(|l| l.id == input.location_id) {
        return Err(DomainError::Validation(format!(
            "Location {} does not exist",
            input.location_id
        )));
    }

    if table.iter().any(|r| r.id != input.id && r.mac == input.mac) {
        return Err(DomainError::Validation(format!(
            "A reader with mac {} already exists",
            input.mac
        )));
    }

    if input.id == 0 {
        let reader = input.into_reader(next_id(table));
        table.push(reader.clone());
        info!(reader_id = reader.id, mac = %reader.mac, "Reader created");
        return Ok(reader);
    }

    let existing = find_mut(table, input.id, |r| r.id, "Reader")?;
    *existing = input.into_reader(existing.id);
    info!(reader_id = existing.id, "Reader updated");
    Ok(existing.clone())
}

pub fn delete_reader(table: &mut Vec<BeaconReader>, id: i64) -> Result<BeaconReader, DomainError> {
    let removed = remove(table, id, |r| r.id, "Reader")?;
    info!(reader_id = id, "Reader deleted");
    Ok(removed)
}

fn find_mut<'a, T>(
    table: &'a mut [T],
    id: i64,
    key: impl Fn(&T) -> i64,
    entity: &str,
) -> Result<&'a mut T, DomainError> {
    table
        .iter_mut()
        .find(|r| key(r) == id)
        .ok_or_else(|| DomainError::NotFound(format!("{} {}", entity, id)))
}

fn remove<T>(
    table: &mut Vec<T>,
    id: i64,
    key: impl Fn(&T) -> i64,
    entity: &str,
) -> Result<T, DomainError> {
    let index = table
        .iter()
        .position(|r| key(r) == id)
        .ok_or_else(|| DomainError::NotFound(format!("{} {}", entity, id)))?;
    Ok(table.remove(index))
}
