//! Input-contract errors for the deconfliction core.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Rejections raised when a flight path violates the input contract.
///
/// Numerical degeneracies inside the solver are never errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// A waypoint coordinate is NaN or infinite
    #[error("drone '{drone_id}': waypoint {index} has a non-finite coordinate")]
    NonFiniteCoordinate { drone_id: String, index: usize },

    /// Waypoint timestamps must be strictly increasing
    #[error(
        "drone '{drone_id}': waypoint {index} at {current} is not after the previous waypoint at {previous}"
    )]
    NonIncreasingTimestamp {
        drone_id: String,
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    /// The primary drone must have at least one waypoint
    #[error("primary drone '{drone_id}' has no waypoints")]
    EmptyPrimary { drone_id: String },
}

/// Rejections raised for safety rules that cannot classify anything sensibly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RulesError {
    #[error("drone radius must be a positive finite number of meters, got {0}")]
    InvalidRadius(f64),

    #[error("safety time must be a finite, non-negative number of seconds, got {0}")]
    InvalidSafetyTime(f64),

    #[error("threshold multiplier must be a positive finite number, got {0}")]
    InvalidMultiplier(f64),
}
