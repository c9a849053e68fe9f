//! Conflict classification against distance and time thresholds.

use crate::models::ConflictType;
use crate::rules::SafetyRules;

/// Maps a (distance, time difference) pair to a conflict type.
///
/// Both comparisons are strict on the unsafe side: a distance equal to the
/// threshold is safe, and a time difference equal to the safety time is
/// only spatial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictClassifier {
    safety_threshold_m: f64,
    safety_time_s: f64,
}

impl ConflictClassifier {
    pub fn new(rules: &SafetyRules) -> Self {
        Self {
            safety_threshold_m: rules.safety_threshold_m(),
            safety_time_s: rules.safety_time_s,
        }
    }

    pub fn safety_threshold_m(&self) -> f64 {
        self.safety_threshold_m
    }

    pub fn safety_time_s(&self) -> f64 {
        self.safety_time_s
    }

    /// Classify a closest approach; `None` means no conflict.
    pub fn classify(&self, distance_m: f64, time_difference_s: f64) -> Option<ConflictType> {
        if distance_m >= self.safety_threshold_m {
            return None;
        }
        if time_difference_s.abs() < self.safety_time_s {
            Some(ConflictType::Spatiotemporal)
        } else {
            Some(ConflictType::Spatial)
        }
    }

    /// Numeric conflict level: 0 none, 1 spatial, 2 spatiotemporal.
    pub fn level(&self, distance_m: f64, time_difference_s: f64) -> u8 {
        self.classify(distance_m, time_difference_s)
            .map(ConflictType::level)
            .unwrap_or(0)
    }
}

impl Default for ConflictClassifier {
    fn default() -> Self {
        Self::new(&SafetyRules::default())
    }
}
