//! Dataset export round trips.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::fs;

use shard::dataset::group_vessels;
use shard::export::{ADJACENCY_FILE, export_dataset};
use shard::prelude::*;

fn unit_box(x: f64) -> ShardMesh {
    ShardMesh::cuboid(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0))
}

fn flags(face: usize) -> Vec<bool> {
    (0..6).map(|f| f == face).collect()
}

/// Two vessels of two touching boxes each, given out of order.
fn raw_fragments() -> Vec<Fragment> {
    vec![
        Fragment::new("RND_Pot_1_0_cell.001", unit_box(0.0)).with_interior(flags(5)),
        Fragment::new("RND_Pot_0_0_cell.001", unit_box(0.0)).with_interior(flags(5)),
        Fragment::new("RND_Pot_0_0_cell.002", unit_box(1.0)).with_interior(flags(4)),
        Fragment::new("RND_Pot_1_0_cell.002", unit_box(1.0))
            .with_interior(flags(4))
            .with_current_translation(5.0, 0.0, 0.0),
    ]
}

#[test]
fn writes_one_directory_per_vessel() {
    let root = tempfile::tempdir().unwrap();
    let grouping = group_vessels(raw_fragments());
    assert!(grouping.ungrouped.is_empty());

    let params =
        PipelineParams::default().with_sample(SampleParams::seeded(8).points_per_fragment(50));
    let exports = export_dataset(root.path(), &grouping.vessels, &params).unwrap();
    assert_eq!(exports.len(), 2);

    for (export, id) in exports.iter().zip(["Pot_001", "Pot_002"]) {
        assert_eq!(export.vessel, id);
        assert_eq!(export.directory, root.path().join(id));
        assert_eq!(export.files.len(), 3);
        assert_eq!(export.summary.edges, 1);

        let adjacency = fs::read_to_string(export.directory.join(ADJACENCY_FILE)).unwrap();
        let pairs: Vec<[u32; 2]> = serde_json::from_str(&adjacency).unwrap();
        assert_eq!(pairs, vec![[1, 2]]);

        for cell in ["cell.001", "cell.002"] {
            let path = export.directory.join(format!("{id}_{cell}.json"));
            let text = fs::read_to_string(&path).unwrap();
            let points: Vec<LabeledPoint> = serde_json::from_str(&text).unwrap();
            assert_eq!(points.len(), 50);
            assert!(points.iter().all(|p| p.label <= 2));

            let raw: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
            let keys: Vec<&String> = raw[0].as_object().unwrap().keys().collect();
            assert_eq!(keys.len(), 3);
            assert_eq!(raw[0]["pos"].as_array().unwrap().len(), 3);
            assert_eq!(raw[0]["norm"].as_array().unwrap().len(), 3);
            assert!(raw[0]["label"].is_u64());
        }
    }
}

#[test]
fn exported_points_use_current_pose() {
    let root = tempfile::tempdir().unwrap();
    let grouping = group_vessels(raw_fragments());
    let params =
        PipelineParams::default().with_sample(SampleParams::seeded(1).points_per_fragment(40));
    export_dataset(root.path(), &grouping.vessels, &params).unwrap();

    // Pot_002 is the former RND_Pot_1_0; its second cell was moved by +5 in x.
    let path = root.path().join("Pot_002").join("Pot_002_cell.002.json");
    let text = fs::read_to_string(path).unwrap();
    let points: Vec<LabeledPoint> = serde_json::from_str(&text).unwrap();
    assert!(points.iter().all(|p| p.pos[0] >= 6.0 - 1e-9 && p.pos[0] <= 7.0 + 1e-9));
}

#[test]
fn export_is_reproducible_with_seed() {
    let params =
        PipelineParams::default().with_sample(SampleParams::seeded(99).points_per_fragment(20));
    let read = |root: &std::path::Path| {
        fs::read_to_string(root.join("Pot_001").join("Pot_001_cell.001.json")).unwrap()
    };

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    export_dataset(first.path(), &group_vessels(raw_fragments()).vessels, &params).unwrap();
    export_dataset(second.path(), &group_vessels(raw_fragments()).vessels, &params).unwrap();
    assert_eq!(read(first.path()), read(second.path()));
}
