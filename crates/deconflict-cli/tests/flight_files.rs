//! Loads the bundled flight files and runs both detection modes over them.

use deconflict_cli::{load_primary, load_traffic, render_summary, Config, DetectionMode};
use deconflict_core::{ConflictDetection, ConflictType};
use std::path::PathBuf;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

#[test]
fn exact_mode_finds_crossing_and_late_overflight() {
    let traffic = load_traffic(&data("traffic.json")).unwrap();
    let primary = load_primary(&data("primary.json")).unwrap();
    assert_eq!(traffic.len(), 3);
    assert_eq!(primary.drone_id(), "PRIMARY-01");

    let conflicts = Config::default()
        .build_detector()
        .unwrap()
        .detect_conflicts(&primary, &traffic)
        .unwrap();

    let summary: Vec<(&str, ConflictType, usize, usize)> = conflicts
        .iter()
        .map(|c| {
            (
                c.with_drone.as_str(),
                c.conflict_type,
                c.primary_segment,
                c.other_segment,
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("CROSSER", ConflictType::Spatiotemporal, 0, 0),
            ("LATECOMER", ConflictType::Spatial, 0, 0),
            ("LATECOMER", ConflictType::Spatial, 1, 0),
        ]
    );
    assert!((conflicts[1].time_difference_s - 60.0).abs() < 1e-9);

    let text = render_summary(&conflicts);
    assert!(text.contains("SPATIAL:        2"));
    assert!(text.contains("SPATIOTEMPORAL: 1"));
}

#[test]
fn sampled_mode_skips_distant_windows_and_rate_limits() {
    let traffic = load_traffic(&data("traffic.json")).unwrap();
    let primary = load_primary(&data("primary.json")).unwrap();

    let config = Config {
        mode: DetectionMode::Sampled,
        ..Config::default()
    };
    let conflicts = config
        .build_detector()
        .unwrap()
        .detect_conflicts(&primary, &traffic)
        .unwrap();

    assert_eq!(conflicts.len(), 2);
    assert!(conflicts.iter().all(|c| c.with_drone == "CROSSER"));
    let gap = conflicts[1].timestamp_primary - conflicts[0].timestamp_primary;
    assert_eq!(gap.num_seconds(), 2);
}

#[test]
fn json_output_tags_conflict_types() {
    let traffic = load_traffic(&data("traffic.json")).unwrap();
    let primary = load_primary(&data("primary.json")).unwrap();
    let conflicts = Config::default()
        .build_detector()
        .unwrap()
        .detect_conflicts(&primary, &traffic)
        .unwrap();

    let json = serde_json::to_string(&conflicts).unwrap();
    assert!(json.contains("\"conflict_type\":\"SPATIOTEMPORAL\""));
    assert!(json.contains("\"with_drone\":\"LATECOMER\""));
    assert!(json.contains("\"timestamp_primary\":\"2025-03-14T09:00:05Z\""));
}
