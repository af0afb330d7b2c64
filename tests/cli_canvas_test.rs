//! Integration tests for canvas cross-checking (`vck canvas`, `vck check --canvas`).

mod common;

use common::TestEnv;
use predicates::prelude::*;

const BOARD: &str = r#"{
    "nodes": [
        {"id": "n1", "type": "file", "file": "milestones/M-001.md", "x": 0, "y": 0, "width": 400, "height": 200},
        {"id": "n2", "type": "file", "file": "tasks/T-404.md", "x": 0, "y": 300, "width": 400, "height": 200},
        {"id": "n3", "type": "text", "text": "Mentions DEC-999 in prose"}
    ],
    "edges": [
        {"id": "e1", "fromNode": "n1", "toNode": "n2"}
    ]
}"#;

#[test]
fn test_canvas_command_reports_dangling_nodes() {
    let env = TestEnv::seeded();
    env.write("Board.canvas", BOARD);

    env.vck()
        .args(["canvas", "Board.canvas"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"entity_id\":\"T-404\""))
        .stdout(predicate::str::contains("\"field\":\"canvas_node\""))
        .stdout(predicate::str::contains("\"outcome\":\"passed_with_warnings\""))
        .stdout(predicate::str::contains("DEC-999").not());
}

#[test]
fn test_canvas_command_uses_configured_canvas() {
    let env = TestEnv::seeded();
    env.write("Board.canvas", BOARD);
    env.write(".vaultcheck.kdl", "canvas \"Board.canvas\"\n");

    env.vck()
        .args(["canvas", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Canvas references non-existent entity 'T-404'"))
        .stdout(predicate::str::contains("Validation passed with warnings"));
}

#[test]
fn test_canvas_command_without_canvas_is_error() {
    let env = TestEnv::seeded();

    env.vck()
        .arg("canvas")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no canvas configured"));
}

#[test]
fn test_unparsable_canvas_fails() {
    let env = TestEnv::seeded();
    env.write("Broken.canvas", "{\"nodes\": [");

    env.vck()
        .args(["canvas", "Broken.canvas"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"entity_id\":\"canvas\""))
        .stdout(predicate::str::contains("Failed to load canvas"));
}

#[test]
fn test_check_with_explicit_canvas() {
    let env = TestEnv::seeded();
    env.write("Board.canvas", BOARD);

    env.vck()
        .args(["check", "--canvas", "Board.canvas"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"checked\":true"))
        .stdout(predicate::str::contains("\"warnings\":1"));
}

#[test]
fn test_check_with_missing_explicit_canvas_fails() {
    let env = TestEnv::seeded();

    env.vck()
        .args(["check", "--canvas", "Nope.canvas"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to load canvas"));
}

#[test]
fn test_check_skips_missing_configured_canvas() {
    let env = TestEnv::seeded();
    env.write(".vaultcheck.kdl", "canvas \"Nope.canvas\"\n");

    env.vck()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"checked\":false"))
        .stdout(predicate::str::contains("canvas file not found"));
}

#[test]
fn test_check_no_canvas_flag() {
    let env = TestEnv::seeded();
    env.write("Board.canvas", BOARD);
    env.write(".vaultcheck.kdl", "canvas \"Board.canvas\"\n");

    env.vck()
        .args(["check", "--no-canvas"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\":\"passed\""))
        .stdout(predicate::str::contains("disabled with --no-canvas"));
}

#[test]
fn test_check_fails_on_malformed_configured_canvas() {
    let env = TestEnv::seeded();
    env.write("Board.canvas", "{\"nodes\": [");
    env.write(".vaultcheck.kdl", "canvas \"Board.canvas\"\n");

    env.vck()
        .arg("check")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("\"findings\":[]"))
        .stdout(predicate::str::contains("Failed to load canvas"))
        .stdout(predicate::str::contains("\"errors\":1"))
        .stdout(predicate::str::contains("\"outcome\":\"failed\""));
}
