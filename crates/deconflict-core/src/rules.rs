//! Safety rules and thresholds for deconfliction.

use serde::{Deserialize, Serialize};

use crate::error::RulesError;

/// Multiplier applied to the drone radius to obtain the spatial safety
/// threshold. Absorbs the error of linearly interpolating between waypoints.
pub const SAFETY_THRESHOLD_MULTIPLIER: f64 = 3.0;

/// Configuration for conflict classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRules {
    /// Drone safety radius in meters
    pub drone_radius_m: f64,
    /// Time difference below which a spatial conflict becomes spatiotemporal (seconds)
    pub safety_time_s: f64,
    /// Safety threshold = drone_radius_m * threshold_multiplier
    #[serde(default = "default_threshold_multiplier")]
    pub threshold_multiplier: f64,
}

fn default_threshold_multiplier() -> f64 {
    SAFETY_THRESHOLD_MULTIPLIER
}

impl Default for SafetyRules {
    fn default() -> Self {
        Self {
            drone_radius_m: 5.0,
            safety_time_s: 2.0,
            threshold_multiplier: SAFETY_THRESHOLD_MULTIPLIER,
        }
    }
}

impl SafetyRules {
    pub fn new(drone_radius_m: f64, safety_time_s: f64) -> Self {
        Self {
            drone_radius_m,
            safety_time_s,
            ..Self::default()
        }
    }

    /// Distance below which two drones are spatially unsafe.
    pub fn safety_threshold_m(&self) -> f64 {
        self.drone_radius_m * self.threshold_multiplier
    }

    /// Reject values that would make every comparison vacuous or undefined.
    pub fn validate(&self) -> Result<(), RulesError> {
        if !(self.drone_radius_m.is_finite() && self.drone_radius_m > 0.0) {
            return Err(RulesError::InvalidRadius(self.drone_radius_m));
        }
        if !(self.safety_time_s.is_finite() && self.safety_time_s >= 0.0) {
            return Err(RulesError::InvalidSafetyTime(self.safety_time_s));
        }
        if !(self.threshold_multiplier.is_finite() && self.threshold_multiplier > 0.0) {
            return Err(RulesError::InvalidMultiplier(self.threshold_multiplier));
        }
        Ok(())
    }
}

/// Tuning for the approximate sampling detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingRules {
    /// Interval between samples along each segment (seconds)
    pub sample_step_s: u32,
    /// Only samples this close in time are matched against each other (seconds)
    pub match_window_s: f64,
    /// Minimum primary-time spacing between two reports for one drone (seconds)
    pub cooldown_s: f64,
    /// Drone pairs whose flight windows are further apart are skipped (seconds)
    pub max_time_gap_s: f64,
}

impl Default for SamplingRules {
    fn default() -> Self {
        Self {
            sample_step_s: 1,
            match_window_s: 1.0,
            cooldown_s: 2.0,
            max_time_gap_s: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_three_radii_by_default() {
        let rules = SafetyRules::new(5.0, 2.0);
        assert_eq!(rules.safety_threshold_m(), 15.0);
    }

    #[test]
    fn threshold_multiplier_is_tunable() {
        let rules = SafetyRules {
            threshold_multiplier: 1.0,
            ..SafetyRules::new(10.0, 2.0)
        };
        assert_eq!(rules.safety_threshold_m(), 10.0);
    }

    #[test]
    fn validate_accepts_defaults_and_zero_safety_time() {
        assert_eq!(SafetyRules::default().validate(), Ok(()));
        assert_eq!(SafetyRules::new(5.0, 0.0).validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_unusable_values() {
        assert!(matches!(
            SafetyRules::new(f64::NAN, 2.0).validate(),
            Err(RulesError::InvalidRadius(r)) if r.is_nan()
        ));
        assert_eq!(
            SafetyRules::new(-5.0, 2.0).validate(),
            Err(RulesError::InvalidRadius(-5.0))
        );
        assert_eq!(
            SafetyRules::new(0.0, 2.0).validate(),
            Err(RulesError::InvalidRadius(0.0))
        );
        assert_eq!(
            SafetyRules::new(5.0, -1.0).validate(),
            Err(RulesError::InvalidSafetyTime(-1.0))
        );
        assert_eq!(
            SafetyRules::new(5.0, f64::INFINITY).validate(),
            Err(RulesError::InvalidSafetyTime(f64::INFINITY))
        );
        let rules = SafetyRules {
            threshold_multiplier: f64::NAN,
            ..SafetyRules::default()
        };
        assert!(matches!(rules.validate(), Err(RulesError::InvalidMultiplier(_))));
    }

    #[test]
    fn missing_multiplier_deserializes_to_default() {
        let rules: SafetyRules =
            serde_json::from_str(r#"{"drone_radius_m": 4.0, "safety_time_s": 1.5}"#).unwrap();
        assert_eq!(rules.threshold_multiplier, SAFETY_THRESHOLD_MULTIPLIER);
        assert_eq!(rules.safety_threshold_m(), 12.0);
    }
}
