//! Core data models for flight-plan deconfliction.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

use crate::error::PathError;

/// A position in local Cartesian coordinates (meters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance_to(self, other: Point3) -> f64 {
        (self - other).norm()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Point3 {
    type Output = Point3;

    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Point3;

    fn mul(self, rhs: f64) -> Point3 {
        Point3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// A timestamped point on a planned flight path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, z: f64, timestamp: DateTime<Utc>) -> Self {
        Self { x, y, z, timestamp }
    }

    pub fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Parse a waypoint timestamp.
///
/// Accepts RFC 3339 (with offset) as well as naive ISO-8601 date-times,
/// which are taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unparseable timestamp '{raw}'")))
}

/// An identified, time-ordered planned flight path.
///
/// Built only through [`Path::new`], which rejects non-finite coordinates and
/// timestamps that are not strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    drone_id: String,
    waypoints: Vec<Waypoint>,
}

impl Path {
    pub fn new(drone_id: impl Into<String>, waypoints: Vec<Waypoint>) -> Result<Self, PathError> {
        let drone_id = drone_id.into();

        for (index, waypoint) in waypoints.iter().enumerate() {
            if !waypoint.position().is_finite() {
                return Err(PathError::NonFiniteCoordinate { drone_id, index });
            }
        }

        for (index, pair) in waypoints.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(PathError::NonIncreasingTimestamp {
                    drone_id,
                    index: index + 1,
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }

        Ok(Self {
            drone_id,
            waypoints,
        })
    }

    pub fn drone_id(&self) -> &str {
        &self.drone_id
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of segments this path contributes to a comparison.
    pub fn segment_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.waypoints.first().map(|wp| wp.timestamp)
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.waypoints.last().map(|wp| wp.timestamp)
    }

    /// Axis-aligned bounds of all waypoints as (min, max).
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = self.waypoints.first()?.position();
        Some(self.waypoints.iter().skip(1).fold((first, first), |(lo, hi), wp| {
            let p = wp.position();
            (
                Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        }))
    }

    /// Interpolated position at an absolute time, if the drone is airborne then.
    pub fn position_at(&self, at: DateTime<Utc>) -> Option<Point3> {
        let first = self.waypoints.first()?;
        if self.waypoints.len() == 1 {
            return (first.timestamp == at).then(|| first.position());
        }
        self.waypoints.windows(2).find_map(|pair| {
            let (wp1, wp2) = (&pair[0], &pair[1]);
            if at < wp1.timestamp || at > wp2.timestamp {
                return None;
            }
            let total = crate::segment::seconds_between(wp1.timestamp, wp2.timestamp);
            let alpha = crate::segment::seconds_between(wp1.timestamp, at) / total;
            Some(wp1.position() + (wp2.position() - wp1.position()) * alpha)
        })
    }
}

/// Kind of a detected conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictType {
    /// Paths come within the safety threshold, but not at the same time
    Spatial,
    /// Paths come within the safety threshold within the safety time
    Spatiotemporal,
}

impl ConflictType {
    /// Numeric conflict level (1 or 2; 0 is "no conflict").
    pub fn level(self) -> u8 {
        match self {
            ConflictType::Spatial => 1,
            ConflictType::Spatiotemporal => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConflictType::Spatial => "SPATIAL",
            ConflictType::Spatiotemporal => "SPATIOTEMPORAL",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected conflict between the primary drone and one other drone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub with_drone: String,
    pub min_distance_m: f64,
    pub location_primary: Point3,
    pub location_other: Point3,
    pub timestamp_primary: DateTime<Utc>,
    pub timestamp_other: DateTime<Utc>,
    /// Absolute difference between the two closest-point instants (seconds)
    pub time_difference_s: f64,
    pub conflict_type: ConflictType,
    pub primary_segment: usize,
    pub other_segment: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn parses_naive_and_rfc3339_timestamps() {
        assert_eq!(parse_timestamp("2025-01-01T10:00:00"), Some(t0()));
        assert_eq!(parse_timestamp("2025-01-01 10:00:00"), Some(t0()));
        assert_eq!(parse_timestamp("2025-01-01T10:00:00Z"), Some(t0()));
        assert_eq!(parse_timestamp("2025-01-01T12:00:00+02:00"), Some(t0()));
        assert_eq!(
            parse_timestamp("2025-01-01T10:00:00.500"),
            Some(t0() + Duration::milliseconds(500))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn path_rejects_non_increasing_timestamps() {
        let err = Path::new(
            "D1",
            vec![
                Waypoint::new(0.0, 0.0, 0.0, t0()),
                Waypoint::new(1.0, 0.0, 0.0, t0()),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, PathError::NonIncreasingTimestamp { index: 1, .. }));
    }

    #[test]
    fn path_rejects_non_finite_coordinates() {
        let err = Path::new("D1", vec![Waypoint::new(f64::NAN, 0.0, 0.0, t0())]).unwrap_err();
        assert!(matches!(err, PathError::NonFiniteCoordinate { index: 0, .. }));
    }

    #[test]
    fn position_at_interpolates_within_segment() {
        let path = Path::new(
            "D1",
            vec![
                Waypoint::new(0.0, 0.0, 10.0, t0()),
                Waypoint::new(100.0, 0.0, 20.0, t0() + Duration::seconds(10)),
            ],
        )
        .unwrap();

        let mid = path.position_at(t0() + Duration::seconds(5)).unwrap();
        assert!((mid.x - 50.0).abs() < 1e-9);
        assert!((mid.z - 15.0).abs() < 1e-9);
        assert!(path.position_at(t0() + Duration::seconds(11)).is_none());
    }

    #[test]
    fn bounds_cover_all_waypoints() {
        let path = Path::new(
            "D1",
            vec![
                Waypoint::new(5.0, -3.0, 10.0, t0()),
                Waypoint::new(-2.0, 8.0, 4.0, t0() + Duration::seconds(1)),
            ],
        )
        .unwrap();
        let (lo, hi) = path.bounds().unwrap();
        assert_eq!(lo, Point3::new(-2.0, -3.0, 4.0));
        assert_eq!(hi, Point3::new(5.0, 8.0, 10.0));
    }

    #[test]
    fn conflict_type_serializes_as_tag() {
        let json = serde_json::to_string(&ConflictType::Spatiotemporal).unwrap();
        assert_eq!(json, "\"SPATIOTEMPORAL\"");
        assert_eq!(ConflictType::Spatial.level(), 1);
    }
}
