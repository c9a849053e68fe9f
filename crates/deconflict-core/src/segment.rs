//! Conversion of waypoint paths into timed 3D segments.

use chrono::{DateTime, Duration, Utc};

use crate::models::{Path, Point3};

/// One end of a segment: a position and its time in seconds since the
/// comparison's reference epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPoint {
    pub position: Point3,
    pub t: f64,
}

impl TimedPoint {
    pub const fn new(position: Point3, t: f64) -> Self {
        Self { position, t }
    }
}

/// Straight-line, linearly time-interpolated motion between two waypoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: TimedPoint,
    pub end: TimedPoint,
}

impl Segment {
    pub const fn new(start: TimedPoint, end: TimedPoint) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Point3 {
        self.end.position - self.start.position
    }

    pub fn duration(&self) -> f64 {
        self.end.t - self.start.t
    }

    /// Position at parameter `s` in [0, 1].
    pub fn point_at(&self, s: f64) -> Point3 {
        self.start.position + self.direction() * s
    }

    /// Time at parameter `s` in [0, 1].
    pub fn time_at(&self, s: f64) -> f64 {
        self.start.t + s * (self.end.t - self.start.t)
    }

    /// Position at epoch-relative time `t`, or `None` outside the segment.
    pub fn position_at_time(&self, t: f64) -> Option<Point3> {
        if t < self.start.t || t > self.end.t {
            return None;
        }
        let span = self.duration();
        let alpha = if span > 0.0 {
            (t - self.start.t) / span
        } else {
            0.0
        };
        Some(self.point_at(alpha))
    }
}

/// Seconds from `from` to `to`, at microsecond resolution.
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Absolute timestamp `seconds` after `epoch`.
pub fn timestamp_at(epoch: DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    epoch + Duration::microseconds((seconds * 1_000_000.0).round() as i64)
}

/// Earliest timestamp across two paths, or `None` if both are empty.
pub fn reference_epoch(a: &Path, b: &Path) -> Option<DateTime<Utc>> {
    match (a.start_time(), b.start_time()) {
        (Some(ta), Some(tb)) => Some(ta.min(tb)),
        (Some(t), None) | (None, Some(t)) => Some(t),
        (None, None) => None,
    }
}

/// Build the ordered segments of `path` relative to `epoch`.
///
/// Paths with fewer than two waypoints produce no segments.
pub fn build_segments(path: &Path, epoch: DateTime<Utc>) -> Vec<Segment> {
    path.waypoints()
        .windows(2)
        .map(|pair| {
            let (wp1, wp2) = (&pair[0], &pair[1]);
            Segment::new(
                TimedPoint::new(wp1.position(), seconds_between(epoch, wp1.timestamp)),
                TimedPoint::new(wp2.position(), seconds_between(epoch, wp2.timestamp)),
            )
        })
        .collect()
}
