//! Flight data loading from JSON files.

use anyhow::{bail, Context, Result};
use deconflict_core::{Path, Waypoint};
use serde::Deserialize;
use std::fs;

/// Drone id used when the primary flight entry does not name one.
pub const DEFAULT_PRIMARY_ID: &str = "primary";

#[derive(Debug, Deserialize)]
struct FlightEntry {
    #[serde(default)]
    drone_id: Option<String>,
    waypoints: Vec<Waypoint>,
}

#[derive(Debug, Deserialize)]
struct TrafficFile {
    flights: Vec<FlightEntry>,
}

#[derive(Debug, Deserialize)]
struct PrimaryFile {
    #[serde(rename = "Primary flight")]
    primary_flight: Vec<FlightEntry>,
}

/// Parse a traffic document: `{"flights": [{"drone_id", "waypoints"}]}`.
pub fn parse_traffic(json: &str) -> Result<Vec<Path>> {
    let file: TrafficFile = serde_json::from_str(json).context("Invalid traffic JSON")?;

    file.flights
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let drone_id = entry
                .drone_id
                .with_context(|| format!("Flight {index} has no drone_id"))?;
            Path::new(drone_id, entry.waypoints)
                .with_context(|| format!("Flight {index} is invalid"))
        })
        .collect()
}

/// Parse a primary document: `{"Primary flight": [{"waypoints"}]}`.
///
/// Only the first entry is used.
pub fn parse_primary(json: &str) -> Result<Path> {
    let file: PrimaryFile = serde_json::from_str(json).context("Invalid primary flight JSON")?;

    let Some(entry) = file.primary_flight.into_iter().next() else {
        bail!("Primary flight list is empty");
    };
    if entry.waypoints.is_empty() {
        bail!("Primary flight has no waypoints");
    }

    let drone_id = entry
        .drone_id
        .unwrap_or_else(|| DEFAULT_PRIMARY_ID.to_string());
    Ok(Path::new(drone_id, entry.waypoints)?)
}

pub fn load_traffic(path: &std::path::Path) -> Result<Vec<Path>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read traffic file {}", path.display()))?;
    let flights = parse_traffic(&json)?;
    tracing::info!("Loaded {} drones from {}", flights.len(), path.display());
    Ok(flights)
}

pub fn load_primary(path: &std::path::Path) -> Result<Path> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read primary file {}", path.display()))?;
    let primary = parse_primary(&json)?;
    tracing::info!(
        "Loaded primary drone {} with {} waypoints",
        primary.drone_id(),
        primary.waypoints().len()
    );
    Ok(primary)
}
