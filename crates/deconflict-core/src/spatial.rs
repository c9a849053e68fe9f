//! Closest-point geometry between finite 3D segments.

use crate::models::Point3;
use crate::segment::Segment;

/// Squared sine of the angle between the segments below which their carrier
/// lines are treated as parallel. Compared against `|u x v|^2 / (|u|^2 |v|^2)`
/// so the test does not depend on segment length.
const PARALLEL_TOL: f64 = 1e-10;

/// Squared length (m^2) at or below which a segment is a single point.
const DEGENERATE_LEN_SQ: f64 = 1e-12;

/// Margin (m) by which an endpoint candidate must beat an in-range solution.
const DISTANCE_TOL: f64 = 1e-9;

/// Closest approach between two timed segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestApproach {
    /// Closest point on the first segment
    pub point_a: Point3,
    /// Closest point on the second segment
    pub point_b: Point3,
    pub distance_m: f64,
    /// Parameter along the first segment, in [0, 1]
    pub param_a: f64,
    /// Parameter along the second segment, in [0, 1]
    pub param_b: f64,
    /// Epoch-relative time at which the first drone is at `point_a`
    pub time_a: f64,
    /// Epoch-relative time at which the second drone is at `point_b`
    pub time_b: f64,
}

impl ClosestApproach {
    fn at(a: &Segment, b: &Segment, s: f64, t: f64) -> Self {
        let point_a = a.point_at(s);
        let point_b = b.point_at(t);
        Self {
            point_a,
            point_b,
            distance_m: point_a.distance_to(point_b),
            param_a: s,
            param_b: t,
            time_a: a.time_at(s),
            time_b: b.time_at(t),
        }
    }

    /// Absolute difference between the two closest-point instants.
    pub fn time_difference(&self) -> f64 {
        (self.time_b - self.time_a).abs()
    }
}

/// Minimum distance between segments `a` and `b`, each point constrained to
/// its own segment, with the instants at which each drone occupies it.
///
/// Ties between endpoint candidates resolve to the first found, in the order
/// a.start-vs-b, a.end-vs-b, b.start-vs-a, b.end-vs-a.
pub fn closest_points(a: &Segment, b: &Segment) -> ClosestApproach {
    let u = a.direction();
    let v = b.direction();
    let w = b.start.position - a.start.position;

    let uu = u.dot(u);
    let uv = u.dot(v);
    let vv = v.dot(v);
    let uw = u.dot(w);
    let vw = v.dot(w);

    let denom = uv * uv - uu * vv;
    let a_is_point = uu <= DEGENERATE_LEN_SQ;
    let b_is_point = vv <= DEGENERATE_LEN_SQ;
    let parallel = a_is_point || b_is_point || denom.abs() <= PARALLEL_TOL * uu * vv;

    // Parameters on the infinite carrier lines
    let (s, t) = if !parallel {
        ((uv * vw - vv * uw) / denom, (uu * vw - uv * uw) / denom)
    } else if !b_is_point {
        // Parallel: pin a.start and project it onto b's line
        (0.0, -vw / vv)
    } else if !a_is_point {
        // b is a single point: project it onto a
        (uw / uu, 0.0)
    } else {
        (0.0, 0.0)
    };

    // The constrained minimum otherwise lies on an endpoint of one segment.
    let candidates = [
        (0.0, project_onto(b, a.start.position)),
        (1.0, project_onto(b, a.end.position)),
        (project_onto(a, b.start.position), 0.0),
        (project_onto(a, b.end.position), 1.0),
    ];

    let mut endpoint = ClosestApproach::at(a, b, candidates[0].0, candidates[0].1);
    for &(s, t) in &candidates[1..] {
        let candidate = ClosestApproach::at(a, b, s, t);
        if candidate.distance_m < endpoint.distance_m {
            endpoint = candidate;
        }
    }

    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        let interior = ClosestApproach::at(a, b, s, t);
        // Guards against an ill-conditioned solve landing in range.
        if endpoint.distance_m < interior.distance_m - DISTANCE_TOL {
            return endpoint;
        }
        return interior;
    }

    endpoint
}

/// Parameter of the point on `segment` closest to `point`, clamped to [0, 1].
fn project_onto(segment: &Segment, point: Point3) -> f64 {
    let dir = segment.direction();
    let len_sq = dir.dot(dir);
    if len_sq <= DEGENERATE_LEN_SQ {
        return 0.0;
    }
    ((point - segment.start.position).dot(dir) / len_sq).clamp(0.0, 1.0)
}
