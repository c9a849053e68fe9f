//! Analysis configuration from environment and command-line flags.

use clap::ValueEnum;
use deconflict_core::{
    ConflictDetection, ConflictDetector, RulesError, SafetyRules, SampledDetector, SamplingRules,
    SAFETY_THRESHOLD_MULTIPLIER,
};
use std::env;

/// Which detection strategy to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DetectionMode {
    /// Exact segment-to-segment closest approach
    #[default]
    Exact,
    /// Approximate time sampling with report rate limiting
    Sampled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub drone_radius_m: f64,
    pub safety_time_s: f64,
    pub threshold_multiplier: f64,
    pub mode: DetectionMode,
    pub prefilter: bool,
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        let rules = SafetyRules::default();
        Self {
            drone_radius_m: rules.drone_radius_m,
            safety_time_s: rules.safety_time_s,
            threshold_multiplier: SAFETY_THRESHOLD_MULTIPLIER,
            mode: DetectionMode::Exact,
            prefilter: true,
            parallel: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from a variable lookup; unset or unparseable values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str| lookup(key).and_then(|s| s.trim().parse::<f64>().ok());
        let defaults = Self::default();
        Self {
            drone_radius_m: number("DECONFLICT_DRONE_RADIUS_M").unwrap_or(defaults.drone_radius_m),
            safety_time_s: number("DECONFLICT_SAFETY_TIME_S").unwrap_or(defaults.safety_time_s),
            threshold_multiplier: number("DECONFLICT_THRESHOLD_MULTIPLIER")
                .unwrap_or(defaults.threshold_multiplier),
            ..defaults
        }
    }

    /// Validated safety rules; NaN, negative or zero thresholds are rejected.
    pub fn safety_rules(&self) -> Result<SafetyRules, RulesError> {
        let rules = SafetyRules {
            drone_radius_m: self.drone_radius_m,
            safety_time_s: self.safety_time_s,
            threshold_multiplier: self.threshold_multiplier,
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Construct the configured detection strategy.
    pub fn build_detector(&self) -> Result<Box<dyn ConflictDetection>, RulesError> {
        let rules = self.safety_rules()?;
        let detector: Box<dyn ConflictDetection> = match self.mode {
            DetectionMode::Exact => Box::new(
                ConflictDetector::new(rules)
                    .with_prefilter(self.prefilter)
                    .with_parallelism(self.parallel),
            ),
            DetectionMode::Sampled => {
                Box::new(SampledDetector::new(rules, SamplingRules::default()))
            }
        };
        Ok(detector)
    }
}
