//! Conflict detection between a primary flight plan and other drones' plans.
//!
//! Every segment of the primary path is compared against every segment of
//! each other path using the exact closest-point solver. Records come out
//! ordered by other drone (input order), then primary segment, then other
//! segment, regardless of whether evaluation ran in parallel.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::classify::ConflictClassifier;
use crate::error::PathError;
use crate::models::{ConflictRecord, Path, Point3};
use crate::rules::SafetyRules;
use crate::segment::{build_segments, reference_epoch, timestamp_at, Segment};
use crate::spatial::closest_points;

/// A strategy that finds conflicts between a primary path and other paths.
pub trait ConflictDetection: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Compare `primary` against each of `others`, returning records in
    /// encounter order.
    fn detect_conflicts(
        &self,
        primary: &Path,
        others: &[Path],
    ) -> Result<Vec<ConflictRecord>, PathError>;
}

/// Exact segment-to-segment conflict detector.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    classifier: ConflictClassifier,
    /// Skip drone pairs whose bounding boxes are at least the safety threshold apart
    prefilter: bool,
    /// Evaluate comparisons on the rayon thread pool
    parallel: bool,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(SafetyRules::default())
    }
}

impl ConflictDetector {
    pub fn new(rules: SafetyRules) -> Self {
        Self {
            classifier: ConflictClassifier::new(&rules),
            prefilter: true,
            parallel: true,
        }
    }

    pub fn with_prefilter(mut self, enabled: bool) -> Self {
        self.prefilter = enabled;
        self
    }

    pub fn with_parallelism(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn classifier(&self) -> &ConflictClassifier {
        &self.classifier
    }

    /// Compare the primary path against one other path.
    pub fn compare(&self, primary: &Path, other: &Path) -> Vec<ConflictRecord> {
        let Some(epoch) = reference_epoch(primary, other) else {
            return Vec::new();
        };
        if primary.segment_count() == 0 || other.segment_count() == 0 {
            return Vec::new();
        }

        if self.prefilter && !self.may_conflict(primary, other) {
            tracing::debug!(
                drone_id = other.drone_id(),
                "Skipped: bounding boxes beyond safety threshold"
            );
            return Vec::new();
        }

        let primary_segments = build_segments(primary, epoch);
        let other_segments = build_segments(other, epoch);
        let drone_id = other.drone_id();

        let conflicts: Vec<ConflictRecord> = if self.parallel {
            primary_segments
                .par_iter()
                .enumerate()
                .map(|(i, p)| self.evaluate_row(drone_id, epoch, i, p, &other_segments))
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        } else {
            primary_segments
                .iter()
                .enumerate()
                .flat_map(|(i, p)| self.evaluate_row(drone_id, epoch, i, p, &other_segments))
                .collect()
        };

        tracing::debug!(
            drone_id,
            primary_segments = primary_segments.len(),
            other_segments = other_segments.len(),
            conflicts = conflicts.len(),
            "Compared flight paths"
        );

        conflicts
    }

    /// Evaluate one primary segment against every segment of the other path.
    fn evaluate_row(
        &self,
        drone_id: &str,
        epoch: DateTime<Utc>,
        primary_index: usize,
        primary: &Segment,
        others: &[Segment],
    ) -> Vec<ConflictRecord> {
        others
            .iter()
            .enumerate()
            .filter_map(|(j, other)| {
                let cpa = closest_points(primary, other);
                let time_difference_s = cpa.time_difference();
                let conflict_type = self
                    .classifier
                    .classify(cpa.distance_m, time_difference_s)?;

                Some(ConflictRecord {
                    with_drone: drone_id.to_string(),
                    min_distance_m: cpa.distance_m,
                    location_primary: cpa.point_a,
                    location_other: cpa.point_b,
                    timestamp_primary: timestamp_at(epoch, cpa.time_a),
                    timestamp_other: timestamp_at(epoch, cpa.time_b),
                    time_difference_s,
                    conflict_type,
                    primary_segment: primary_index,
                    other_segment: j,
                })
            })
            .collect()
    }

    /// Conservative pair filter: no point of either path can be closer than
    /// the gap between their bounding boxes.
    fn may_conflict(&self, primary: &Path, other: &Path) -> bool {
        match (primary.bounds(), other.bounds()) {
            (Some(a), Some(b)) => box_gap(a, b) < self.classifier.safety_threshold_m(),
            _ => false,
        }
    }
}

impl ConflictDetection for ConflictDetector {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn detect_conflicts(
        &self,
        primary: &Path,
        others: &[Path],
    ) -> Result<Vec<ConflictRecord>, PathError> {
        if primary.is_empty() {
            return Err(PathError::EmptyPrimary {
                drone_id: primary.drone_id().to_string(),
            });
        }

        let per_drone: Vec<Vec<ConflictRecord>> = if self.parallel {
            others
                .par_iter()
                .map(|other| self.compare(primary, other))
                .collect()
        } else {
            others
                .iter()
                .map(|other| self.compare(primary, other))
                .collect()
        };

        let conflicts: Vec<ConflictRecord> = per_drone.into_iter().flatten().collect();
        tracing::info!(
            primary = primary.drone_id(),
            drones = others.len(),
            conflicts = conflicts.len(),
            "Exact conflict detection complete"
        );
        Ok(conflicts)
    }
}

/// Euclidean distance between two axis-aligned boxes (0 when they overlap).
fn box_gap(a: (Point3, Point3), b: (Point3, Point3)) -> f64 {
    let (a_lo, a_hi) = a;
    let (b_lo, b_hi) = b;
    let axis = |lo1: f64, hi1: f64, lo2: f64, hi2: f64| (lo2 - hi1).max(lo1 - hi2).max(0.0);
    Point3::new(
        axis(a_lo.x, a_hi.x, b_lo.x, b_hi.x),
        axis(a_lo.y, a_hi.y, b_lo.y, b_hi.y),
        axis(a_lo.z, a_hi.z, b_lo.z, b_hi.z),
    )
    .norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConflictType, Waypoint};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
    }

    fn path(id: &str, points: &[(f64, f64, f64, i64)]) -> Path {
        Path::new(
            id,
            points
                .iter()
                .map(|&(x, y, z, secs)| Waypoint::new(x, y, z, t0() + Duration::seconds(secs)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_crossing_paths_generate_spatiotemporal_conflict() {
        let detector = ConflictDetector::new(SafetyRules::new(5.0, 2.0));
        let primary = path("PRIMARY", &[(0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 10)]);
        let other = path("DRONE001", &[(50.0, -50.0, 0.0, 0), (50.0, 50.0, 0.0, 10)]);

        let conflicts = detector.detect_conflicts(&primary, &[other]).unwrap();
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.with_drone, "DRONE001");
        assert_eq!(c.conflict_type, ConflictType::Spatiotemporal);
        assert!(c.min_distance_m < 1e-9);
        assert_eq!(c.timestamp_primary, t0() + Duration::seconds(5));
        assert_eq!(c.timestamp_other, t0() + Duration::seconds(5));
        assert_eq!((c.primary_segment, c.other_segment), (0, 0));
    }

    #[test]
    fn test_every_segment_pair_is_reported() {
        let detector = ConflictDetector::new(SafetyRules::new(5.0, 2.0));
        // Primary turns exactly where the other drone crosses.
        let primary = path(
            "PRIMARY",
            &[(0.0, 0.0, 0.0, 0), (50.0, 0.0, 0.0, 5), (50.0, 50.0, 0.0, 10)],
        );
        let other = path("DRONE001", &[(0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 10)]);

        let conflicts = detector.detect_conflicts(&primary, &[other]).unwrap();
        let indices: Vec<_> = conflicts
            .iter()
            .map(|c| (c.primary_segment, c.other_segment))
            .collect();
        assert_eq!(indices, vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn test_empty_primary_is_rejected() {
        let detector = ConflictDetector::default();
        let primary = Path::new("PRIMARY", Vec::new()).unwrap();
        let err = detector.detect_conflicts(&primary, &[]).unwrap_err();
        assert!(matches!(err, PathError::EmptyPrimary { .. }));
    }

    #[test]
    fn test_short_paths_cannot_conflict() {
        let detector = ConflictDetector::default();
        let primary = path("PRIMARY", &[(0.0, 0.0, 0.0, 0)]);
        let other = path("DRONE001", &[(0.0, 0.0, 0.0, 0), (1.0, 0.0, 0.0, 1)]);
        assert!(detector.detect_conflicts(&primary, &[other]).unwrap().is_empty());

        let primary = path("PRIMARY", &[(0.0, 0.0, 0.0, 0), (1.0, 0.0, 0.0, 1)]);
        let empty = Path::new("DRONE002", Vec::new()).unwrap();
        assert!(detector.detect_conflicts(&primary, &[empty]).unwrap().is_empty());
    }

    #[test]
    fn test_box_gap() {
        let unit = (Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let shifted = (Point3::new(4.0, 5.0, 0.5), Point3::new(6.0, 6.0, 2.0));
        assert_eq!(box_gap(unit, unit), 0.0);
        assert_eq!(box_gap(unit, shifted), 5.0);
        assert_eq!(box_gap(shifted, unit), 5.0);
    }

    #[test]
    fn test_prefilter_skips_only_distant_drones() {
        let detector = ConflictDetector::new(SafetyRules::new(5.0, 2.0));
        let primary = path("PRIMARY", &[(0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 10)]);
        let near = path("NEAR", &[(0.0, 10.0, 0.0, 0), (100.0, 10.0, 0.0, 10)]);
        let far = path("FAR", &[(0.0, 15.0, 0.0, 0), (100.0, 15.0, 0.0, 10)]);

        assert!(detector.may_conflict(&primary, &near));
        assert!(!detector.may_conflict(&primary, &far));
    }
}
