//! Strategic deconfliction of planned drone flight paths.
//!
//! Compares a primary drone's waypoint plan against other drones' plans and
//! reports where they come within a safety threshold, in space only or in
//! space and time.

pub mod classify;
pub mod conflict;
pub mod error;
pub mod models;
pub mod rules;
pub mod sampling;
pub mod segment;
pub mod spatial;

pub use classify::ConflictClassifier;
pub use conflict::{ConflictDetection, ConflictDetector};
pub use error::{PathError, RulesError};
pub use models::{parse_timestamp, ConflictRecord, ConflictType, Path, Point3, Waypoint};
pub use rules::{SafetyRules, SamplingRules, SAFETY_THRESHOLD_MULTIPLIER};
pub use sampling::{sample_path, PathSample, SampledDetector};
pub use segment::{build_segments, reference_epoch, Segment, TimedPoint};
pub use spatial::{closest_points, ClosestApproach};
