//! Integration tests for Plait
//!
//! These tests verify that snapshots, copy/paste and compare work together,
//! both through the libraries and through the CLI.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use plait_changeset::{compare, pending_changes, Change, Op};
use plait_copypaste::{copy_full, paste_full, paste_link};
use plait_core::lang::structure::CLASS;
use plait_core::test_utils::ModelFixture;
use plait_core::{default_language, ModelStore, NodeId, Snapshot};
use tempfile::TempDir;

fn plait(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_plait"))
        .args(args)
        .output()
        .expect("Failed to execute plait")
}

fn write_snapshot(dir: &TempDir, name: &str, store: &ModelStore) -> PathBuf {
    let path = dir.path().join(name);
    let text = Snapshot::from_store(store).to_json_pretty().unwrap();
    std::fs::write(&path, text).unwrap();
    path
}

fn read_store(path: &Path) -> ModelStore {
    let text = std::fs::read_to_string(path).unwrap();
    Snapshot::from_json(&text).unwrap().into_store(&default_language()).unwrap()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "plait failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = plait(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("plait"));
    assert!(stdout.contains("three-way compare"));
}

#[test]
fn test_inspect_summarizes_snapshot() {
    let dir = TempDir::new().unwrap();
    let fixture = ModelFixture::two_classes_and_a_generalization();
    let path = write_snapshot(&dir, "model.json", &fixture.store);

    let summary = stdout_json(&plait(&["inspect", path.to_str().unwrap()]));

    assert_eq!(summary["elements"], 7);
    assert_eq!(summary["types"]["Structure:Class"], 2);
    assert_eq!(summary["types"]["Structure:ClassItem"], 2);
    assert_eq!(summary["types"]["Core:Diagram"], 1);
    assert_eq!(summary["pending_changes"], serde_json::json!([]));
}

#[test]
fn test_inspect_rejects_malformed_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"elements":[{"id":1,"type":"Class","properties":{"name":["text","X"]}}]}"#).unwrap();

    let output = plait(&["inspect", path.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid snapshot"));
}

#[test]
fn test_duplicate_links_onto_diagram() {
    let dir = TempDir::new().unwrap();
    let fixture = ModelFixture::two_classes_and_a_generalization();
    let path = write_snapshot(&dir, "model.json", &fixture.store);
    let diagram = fixture.id("diagram").to_string();
    let item = fixture.id("specific_item").to_string();

    let result = stdout_json(&plait(&["duplicate", path.to_str().unwrap(), "--diagram", &diagram, &item]));

    let pasted = result["pasted"].as_array().unwrap();
    assert_eq!(pasted.len(), 1);
    let elements = result["snapshot"]["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 8);
    let classes = elements.iter().filter(|e| e["type"] == "Class").count();
    assert_eq!(classes, 2);
}

#[test]
fn test_duplicate_full_creates_new_definitions() {
    let dir = TempDir::new().unwrap();
    let fixture = ModelFixture::two_classes_and_a_generalization();
    let path = write_snapshot(&dir, "model.json", &fixture.store);
    let diagram = fixture.id("diagram").to_string();
    let item = fixture.id("specific_item").to_string();

    let result = stdout_json(&plait(&[
        "duplicate",
        path.to_str().unwrap(),
        "--diagram",
        &diagram,
        "--full",
        &item,
    ]));

    let elements = result["snapshot"]["elements"].as_array().unwrap();
    let classes = elements.iter().filter(|e| e["type"] == "Class").count();
    assert_eq!(classes, 3);
}

#[test]
fn test_duplicate_onto_missing_diagram_fails() {
    let dir = TempDir::new().unwrap();
    let fixture = ModelFixture::two_classes_and_a_generalization();
    let path = write_snapshot(&dir, "model.json", &fixture.store);
    let item = fixture.id("specific_item").to_string();

    let output = plait(&["duplicate", path.to_str().unwrap(), "--diagram", "999999999", &item]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Cannot paste onto diagram"));
}

#[test]
fn test_compare_writes_change_records() {
    let dir = TempDir::new().unwrap();

    let mut ancestor = ModelFixture::new();
    let shape = ancestor.element_with_id("shape", &CLASS, 1);
    ancestor.store.set_attribute(shape, "name", "Shape").unwrap();

    let mut incoming = ModelFixture::new();
    let shape = incoming.element_with_id("shape", &CLASS, 1);
    incoming.store.set_attribute(shape, "name", "Figure").unwrap();
    let circle = incoming.element_with_id("circle", &CLASS, 2);
    incoming.store.set_attribute(circle, "name", "Circle").unwrap();

    let ancestor_path = write_snapshot(&dir, "ancestor.json", &ancestor.store);
    let current_path = write_snapshot(&dir, "current.json", &ancestor.store);
    let incoming_path = write_snapshot(&dir, "incoming.json", &incoming.store);
    let output_path = dir.path().join("merged.json");

    let changes = stdout_json(&plait(&[
        "compare",
        ancestor_path.to_str().unwrap(),
        current_path.to_str().unwrap(),
        incoming_path.to_str().unwrap(),
        "--output",
        output_path.to_str().unwrap(),
    ]));
    let changes = changes.as_array().unwrap();
    assert_eq!(changes.len(), 3);
    assert_eq!(changes[0]["change"]["kind"], "element");
    assert_eq!(changes[0]["change"]["element_id"], 2);

    let merged = read_store(&output_path);
    assert_eq!(merged.len(), 4);
    let pending = pending_changes(&merged).unwrap();
    assert_eq!(pending.len(), 3);
    assert!(pending.iter().any(|p| matches!(
        &p.change,
        Change::Value { element_id, property_value: Some(v), .. } if *element_id == NodeId(1) && v == "Figure"
    )));
}

#[test]
fn test_compare_rejects_mismatched_types() {
    let dir = TempDir::new().unwrap();

    let mut ancestor = ModelFixture::new();
    ancestor.element_with_id("element", &CLASS, 1);
    let mut incoming = ModelFixture::new();
    incoming.element_with_id("element", &plait_core::lang::structure::PACKAGE, 1);

    let ancestor_path = write_snapshot(&dir, "ancestor.json", &ancestor.store);
    let incoming_path = write_snapshot(&dir, "incoming.json", &incoming.store);

    let output = plait(&[
        "compare",
        ancestor_path.to_str().unwrap(),
        ancestor_path.to_str().unwrap(),
        incoming_path.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("incompatible types"));
}

/// Copy from one model, paste into another loaded from disk, then diff the two versions.
#[test]
fn test_paste_between_models_shows_up_in_compare() {
    let dir = TempDir::new().unwrap();
    let source = ModelFixture::two_classes_and_a_generalization();

    let mut target = ModelFixture::new();
    target.diagram("diagram");
    let path = write_snapshot(&dir, "target.json", &target.store);

    let before = read_store(&path);
    let mut after = before.clone();
    let diagram = target.id("diagram");
    let data = copy_full(&source.store, &[source.id("specific_item")], None).unwrap();
    let pasted = paste_link(&data, &mut after, diagram).unwrap();
    assert_eq!(pasted.len(), 1);

    let mut current = before.clone();
    let changes = compare(&mut current, &before, &after).unwrap();

    let added: Vec<&str> = changes
        .iter()
        .filter_map(|p| match &p.change {
            Change::Element { op: Op::Add, element_name, .. } => Some(element_name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(added.len(), 2);
    assert!(added.contains(&"Class"));
    assert!(added.contains(&"ClassItem"));
    assert_eq!(current.len(), before.len() + changes.len());
}

/// A full paste survives a save and reload with its internal references intact.
#[test]
fn test_full_paste_round_trips_through_snapshot() {
    let dir = TempDir::new().unwrap();
    let mut fixture = ModelFixture::two_classes_and_a_generalization();
    let diagram = fixture.id("diagram");
    let items = [
        fixture.id("general_item"),
        fixture.id("specific_item"),
        fixture.id("generalization_item"),
    ];
    let data = copy_full(&fixture.store, &items, None).unwrap();
    let pasted = paste_full(&data, &mut fixture.store, diagram).unwrap();
    assert_eq!(pasted.len(), 3);

    let path = write_snapshot(&dir, "model.json", &fixture.store);
    let reloaded = read_store(&path);

    assert_eq!(reloaded.len(), fixture.store.len());
    for id in &pasted {
        let original = fixture.store.lookup(*id).unwrap();
        let restored = reloaded.lookup(*id).unwrap();
        assert_eq!(original.save(), restored.save());
    }
}
