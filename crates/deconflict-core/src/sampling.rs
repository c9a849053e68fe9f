//! Approximate conflict detection by time sampling.
//!
//! Both paths are sampled at a fixed interval and each primary sample is
//! matched to the nearest other-drone sample taken at roughly the same time.
//! Cheaper than the exact detector but may miss approaches that happen
//! between samples, so reports are also rate limited per drone.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::classify::ConflictClassifier;
use crate::conflict::ConflictDetection;
use crate::error::PathError;
use crate::models::{ConflictRecord, Path, Point3};
use crate::rules::{SafetyRules, SamplingRules};
use crate::segment::{build_segments, reference_epoch, seconds_between, timestamp_at};

/// A sampled position with its epoch-relative time and source segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub position: Point3,
    pub t: f64,
    pub segment: usize,
}

/// Sample `path` every `step_s` seconds from the start of each segment.
pub fn sample_path(path: &Path, epoch: DateTime<Utc>, step_s: u32) -> Vec<PathSample> {
    let step = step_s.max(1) as usize;
    let mut samples = Vec::new();

    for (index, segment) in build_segments(path, epoch).iter().enumerate() {
        let whole_secs = segment.duration().floor() as u64;
        for offset in (0..=whole_secs).step_by(step) {
            let t = segment.start.t + offset as f64;
            if let Some(position) = segment.position_at_time(t) {
                samples.push(PathSample {
                    position,
                    t,
                    segment: index,
                });
            }
        }
    }

    samples
}

/// Time-sampling conflict detector sharing the exact detector's classifier.
#[derive(Debug, Clone)]
pub struct SampledDetector {
    classifier: ConflictClassifier,
    sampling: SamplingRules,
}

impl Default for SampledDetector {
    fn default() -> Self {
        Self::new(SafetyRules::default(), SamplingRules::default())
    }
}

impl SampledDetector {
    pub fn new(rules: SafetyRules, sampling: SamplingRules) -> Self {
        Self {
            classifier: ConflictClassifier::new(&rules),
            sampling,
        }
    }

    pub fn sampling(&self) -> &SamplingRules {
        &self.sampling
    }

    /// Flight windows further apart than the allowed gap cannot interact.
    fn temporally_relevant(&self, primary: &Path, other: &Path) -> bool {
        let (Some(p_start), Some(p_end), Some(o_start), Some(o_end)) = (
            primary.start_time(),
            primary.end_time(),
            other.start_time(),
            other.end_time(),
        ) else {
            return false;
        };

        let gap = if p_end < o_start {
            seconds_between(p_end, o_start)
        } else if o_end < p_start {
            seconds_between(o_end, p_start)
        } else {
            0.0
        };
        gap <= self.sampling.max_time_gap_s
    }

    /// Compare the primary path against one other path.
    pub fn compare(&self, primary: &Path, other: &Path) -> Vec<ConflictRecord> {
        if !self.temporally_relevant(primary, other) {
            tracing::debug!(drone_id = other.drone_id(), "Skipped: flight windows too far apart");
            return Vec::new();
        }
        let Some(epoch) = reference_epoch(primary, other) else {
            return Vec::new();
        };

        let primary_samples = sample_path(primary, epoch, self.sampling.sample_step_s);
        let other_samples = sample_path(other, epoch, self.sampling.sample_step_s);

        let mut conflicts = Vec::new();
        let mut last_reported: Option<f64> = None;

        for p in &primary_samples {
            let Some((nearest, distance)) = self.nearest_match(p, &other_samples) else {
                continue;
            };
            let time_difference_s = (nearest.t - p.t).abs();
            let Some(conflict_type) = self.classifier.classify(distance, time_difference_s) else {
                continue;
            };

            let cooled_down = last_reported
                .map(|last| p.t - last >= self.sampling.cooldown_s)
                .unwrap_or(true);
            if !cooled_down {
                continue;
            }

            conflicts.push(ConflictRecord {
                with_drone: other.drone_id().to_string(),
                min_distance_m: distance,
                location_primary: p.position,
                location_other: nearest.position,
                timestamp_primary: timestamp_at(epoch, p.t),
                timestamp_other: timestamp_at(epoch, nearest.t),
                time_difference_s,
                conflict_type,
                primary_segment: p.segment,
                other_segment: nearest.segment,
            });
            last_reported = Some(p.t);
        }

        tracing::debug!(
            drone_id = other.drone_id(),
            primary_samples = primary_samples.len(),
            other_samples = other_samples.len(),
            conflicts = conflicts.len(),
            "Compared sampled flight paths"
        );

        conflicts
    }

    /// Closest other sample within the match window; first found wins ties.
    fn nearest_match<'a>(
        &self,
        sample: &PathSample,
        others: &'a [PathSample],
    ) -> Option<(&'a PathSample, f64)> {
        let mut best: Option<(&PathSample, f64)> = None;
        for other in others {
            if (other.t - sample.t).abs() > self.sampling.match_window_s {
                continue;
            }
            let distance = sample.position.distance_to(other.position);
            if best.map(|(_, d)| distance < d).unwrap_or(true) {
                best = Some((other, distance));
            }
        }
        best
    }
}

impl ConflictDetection for SampledDetector {
    fn name(&self) -> &'static str {
        "sampled"
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

        let per_drone: Vec<Vec<ConflictRecord>> = others
            .par_iter()
            .map(|other| self.compare(primary, other))
            .collect();

        let conflicts: Vec<ConflictRecord> = per_drone.into_iter().flatten().collect();
        tracing::info!(
            primary = primary.drone_id(),
            drones = others.len(),
            conflicts = conflicts.len(),
            "Sampled conflict detection complete"
        );
        Ok(conflicts)
    }
}
