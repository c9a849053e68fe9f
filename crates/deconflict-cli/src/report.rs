//! Console rendering of conflict results.

use chrono::SecondsFormat;
use deconflict_core::{ConflictRecord, ConflictType};
use std::fmt;

/// Conflict counts per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictCounts {
    pub spatial: usize,
    pub spatiotemporal: usize,
}

impl ConflictCounts {
    pub fn tally(conflicts: &[ConflictRecord]) -> Self {
        conflicts
            .iter()
            .fold(Self::default(), |mut counts, c| {
                match c.conflict_type {
                    ConflictType::Spatial => counts.spatial += 1,
                    ConflictType::Spatiotemporal => counts.spatiotemporal += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.spatial + self.spatiotemporal
    }
}

fn describe(kind: ConflictType) -> &'static str {
    match kind {
        ConflictType::Spatial => "within safety threshold, not simultaneous",
        ConflictType::Spatiotemporal => "within safety threshold and safety time",
    }
}

/// Summary and per-conflict detail list, rendered through `Display`.
pub struct Summary<'a>(pub &'a [ConflictRecord]);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conflicts = self.0;
        if conflicts.is_empty() {
            return writeln!(f, "No conflicts detected.");
        }

        let counts = ConflictCounts::tally(conflicts);
        writeln!(f, "Conflict summary:")?;
        writeln!(f, "  SPATIAL:        {}", counts.spatial)?;
        writeln!(f, "  SPATIOTEMPORAL: {}", counts.spatiotemporal)?;
        writeln!(f, "  TOTAL:          {}", counts.total())?;

        for (i, c) in conflicts.iter().enumerate() {
            writeln!(f)?;
            writeln!(
                f,
                "#{} {} with {} ({})",
                i + 1,
                c.conflict_type,
                c.with_drone,
                describe(c.conflict_type)
            )?;
            writeln!(
                f,
                "  primary {} at {}",
                c.location_primary,
                c.timestamp_primary.to_rfc3339_opts(SecondsFormat::Millis, true)
            )?;
            writeln!(
                f,
                "  other   {} at {}",
                c.location_other,
                c.timestamp_other.to_rfc3339_opts(SecondsFormat::Millis, true)
            )?;
            writeln!(
                f,
                "  min distance {:.2} m, time difference {:.2} s, segments {} / {}",
                c.min_distance_m, c.time_difference_s, c.primary_segment, c.other_segment
            )?;
        }
        Ok(())
    }
}

/// Render the summary and the per-conflict detail list.
pub fn render_summary(conflicts: &[ConflictRecord]) -> String {
    Summary(conflicts).to_string()
}
