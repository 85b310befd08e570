use std::{
    path::PathBuf,
    process::{Command, Output},
};

fn maps_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../maps")
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tactics-grid"))
        .arg("--maps")
        .arg(maps_dir())
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run tactics-grid")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn maps_lists_the_bundled_catalog() {
    let output = run(&["maps"]);

    assert!(output.status.success());
    let listed = stdout(&output);
    for name in ["causeway", "crossroads", "hex_garden", "open_field"] {
        assert!(listed.lines().any(|line| line == name), "{name} missing");
    }
}

#[test]
fn reach_prints_costs_around_the_actor() {
    let output = run(&["--map", "open_field", "reach", "--actor", "1"]);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "map open_field: actor #1 at (2, 2) reaches 12 tiles\n\
         ..2..\n.212.\n21@12\n.212.\n..2..\n"
    );
}

#[test]
fn move_walks_one_step_per_frame() {
    let output = run(&["--map", "open_field", "move", "--actor", "1", "--to", "2,4"]);

    assert!(output.status.success());
    let printed = stdout(&output);
    assert!(printed.contains("step 1: #1 -> (2, 3)"));
    assert!(printed.contains("step 2: #1 -> (2, 4)"));
    assert!(printed.ends_with("#1 arrived at (2, 4) after 2 steps\n"));
}

#[test]
fn json_frames_carry_highlights() {
    let output = run(&[
        "--map",
        "open_field",
        "--format",
        "json",
        "reach",
        "--actor",
        "1",
    ]);

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("stdout is json");
    assert_eq!(report["map"], "open_field");
    assert_eq!(report["highlights"].as_array().map(Vec::len), Some(13));
    assert_eq!(report["rows"][2], "21@12");
}

#[test]
fn unknown_map_fails_before_gameplay() {
    let output = run(&["--map", "nowhere", "reach", "--actor", "1"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let errors = String::from_utf8_lossy(&output.stderr);
    assert!(errors.contains("map `nowhere` not found"));
}

#[test]
fn destinations_outside_reach_are_rejected() {
    let output = run(&["--map", "open_field", "move", "--actor", "1", "--to", "0,0"]);

    assert!(!output.status.success());
    let errors = String::from_utf8_lossy(&output.stderr);
    assert!(errors.contains("not within the selected actor's reach"));
}

#[test]
fn scatter_is_reproducible() {
    let args = ["scatter", "--seed", "11", "--density", "0.2", "--at", "0,0"];
    let first = run(&args);
    let second = run(&args);

    if first.status.success() {
        assert_eq!(stdout(&first), stdout(&second));
    } else {
        assert!(!second.status.success());
    }
}
