//! Integration tests for the `fp` CLI.
//!
//! Each test creates a temp project directory, runs `fp` as a subprocess,
//! and verifies stdout and/or file contents.

use std::fs;
use std::path::Path;
use std::process::Command;

const SCHEDULE: &str = r#"[
  {"event": "Film A", "day": "Dilluns", "date": 12, "time": "10:00", "duration": "90'",
   "venue": "Hall 1", "movie": "Alpha", "sections": ["Oficial"]},
  {"event": "Film B", "day": "Dilluns", "date": "12", "time": "11:00", "duration": "60'",
   "venue": "Hall 2"},
  {"event": "Film C", "day": "Dimarts", "date": 13, "time": "18:00", "duration": "120'",
   "venue": "Hall 1", "movies": ["Short One", "Short Two"]}
]"#;

/// Create a minimal test project in the given directory.
fn create_test_project(root: &Path) {
    fs::write(
        root.join("planner.toml"),
        r#"[festival]
name = "Test Fest"
month = 10

[cache]
name = "test-planner"
version = "1.0.3" # synced by fp bump
manifest = ["/", "/data/schedule.json"]
"#,
    )
    .unwrap();
    fs::create_dir_all(root.join("data")).unwrap();
    fs::write(root.join("data/schedule.json"), SCHEDULE).unwrap();
    fs::write(root.join("index.html"), "<h1>planner</h1>").unwrap();
    fs::write(
        root.join("version.json"),
        "{\n  \"version\": \"1.0.3\",\n  \"buildDate\": \"2026-01-01\"\n}",
    )
    .unwrap();
}

/// Run `fp` with the given args in the given directory, returning (stdout, stderr, success).
fn run_fp(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_fp"))
        .args(args)
        .current_dir(dir)
        .env_remove("FESTPLAN_LOG")
        .output()
        .expect("failed to run fp");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `fp` expecting success, return stdout.
fn run_fp_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_fp(dir, args);
    if !success {
        panic!(
            "fp {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn statuses(dir: &Path) -> Vec<serde_json::Value> {
    let out = run_fp_ok(dir, &["--json", "list", "--filter", "hidden"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["status"].clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Project setup
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_project() {
    let tmp = tempfile::TempDir::new().unwrap();
    let dir = tmp.path().join("sitges-2026");
    fs::create_dir_all(&dir).unwrap();

    let out = run_fp_ok(&dir, &["init"]);
    assert!(out.contains("Initialized planner \"Sitges 2026\""));
    assert!(dir.join("planner.toml").is_file());
    assert_eq!(fs::read_to_string(dir.join("data/schedule.json")).unwrap(), "[]\n");
    assert!(dir.join(".festplan").is_dir());

    let (_, stderr, success) = run_fp(&dir, &["init"]);
    assert!(!success);
    assert!(stderr.contains("already exists"));

    run_fp_ok(&dir, &["init", "--force", "--name", "Renamed"]);
    let toml = fs::read_to_string(dir.join("planner.toml")).unwrap();
    assert!(toml.contains("name = \"Renamed\""));
}

#[test]
fn test_outside_project_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_, stderr, success) = run_fp(tmp.path(), &["days"]);
    assert!(!success);
    assert!(stderr.starts_with("error: not a planner project"));
}

#[test]
fn test_malformed_schedule_names_path() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());
    fs::write(tmp.path().join("data/schedule.json"), "{not json").unwrap();
    let (_, stderr, success) = run_fp(tmp.path(), &["list"]);
    assert!(!success);
    assert!(stderr.contains("schedule.json"));
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn test_days() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_fp_ok(tmp.path(), &["days"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Monday, 12"));
    assert!(lines[0].contains("10:00-12:15"));
    assert!(lines[1].starts_with("Tuesday, 13"));
}

#[test]
fn test_list_and_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_fp_ok(tmp.path(), &["list"]);
    assert!(out.contains("   1   Monday 12  10:00-11:30  Hall 1  Film A"));
    assert!(out.contains("Film C"));

    let out = run_fp_ok(tmp.path(), &["list", "--day", "Tuesday", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let arr = parsed.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["index"], 3);
    assert_eq!(arr[0]["duration_minutes"], 120);
    assert_eq!(arr[0]["id"], "Film C-18:00-Hall 1-Dimarts-13");
}

#[test]
fn test_show_event() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_fp_ok(tmp.path(), &["show", "3"]);
    assert!(out.starts_with("Film C\n"));
    assert!(out.contains("Time: 18:00 - 20:00"));
    assert!(out.contains("  \u{2022} Short Two"));

    let (_, stderr, success) = run_fp(tmp.path(), &["show", "42"]);
    assert!(!success);
    assert!(stderr.contains("event not found: 42"));
}

#[test]
fn test_grid() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_fp_ok(tmp.path(), &["grid"]);
    assert!(out.starts_with("Monday, 12\n"));
    assert!(out.contains("Hall 1"));
    assert!(out.contains("  Film A"));
    assert!(out.contains("12:15"));

    let out = run_fp_ok(tmp.path(), &["grid", "13"]);
    assert!(out.contains("2 movies"));
}

// ---------------------------------------------------------------------------
// Plan edits
// ---------------------------------------------------------------------------

#[test]
fn test_toggles_persist_and_stay_disjoint() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_fp_ok(tmp.path(), &["select", "1"]);
    assert_eq!(out.trim(), "selected: Film A");
    let out = run_fp_ok(tmp.path(), &["hide", "1"]);
    assert_eq!(out.trim(), "hidden: Film A");
    run_fp_ok(tmp.path(), &["interest", "Film B-11:00-Hall 2-Dilluns-12"]);

    assert_eq!(
        statuses(tmp.path()),
        vec![
            serde_json::json!("hidden"),
            serde_json::json!("interested"),
            serde_json::Value::Null
        ]
    );

    let storage = fs::read_to_string(tmp.path().join(".festplan/storage.json")).unwrap();
    assert!(storage.contains("festivalPlannerPrefs"));

    // Hidden events drop out of the default list
    let out = run_fp_ok(tmp.path(), &["list"]);
    assert!(!out.contains("Film A"));

    let out = run_fp_ok(tmp.path(), &["unhide-all"]);
    assert_eq!(out.trim(), "Unhid 1 event");
    let out = run_fp_ok(tmp.path(), &["list"]);
    assert!(out.contains("Film A"));

    let out = run_fp_ok(tmp.path(), &["interest", "2"]);
    assert_eq!(out.trim(), "cleared: Film B");
}

#[test]
fn test_stats_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());
    run_fp_ok(tmp.path(), &["select", "1"]);
    run_fp_ok(tmp.path(), &["interest", "3"]);

    let out = run_fp_ok(tmp.path(), &["--json", "stats"]);
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["total_events"], 3);
    assert_eq!(stats["plan_events"], 2);
    assert_eq!(stats["selected_events"], 1);
    assert_eq!(stats["plan_minutes"], 210);
    assert_eq!(stats["days"], 2);
}

// ---------------------------------------------------------------------------
// Export / import
// ---------------------------------------------------------------------------

#[test]
fn test_calendar_export_needs_selection() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let (_, stderr, success) = run_fp(tmp.path(), &["export", "-f", "ics"]);
    assert!(!success);
    assert!(stderr.contains("no selected events"));
    assert!(!tmp.path().join("my-festival-plan.ics").exists());

    run_fp_ok(tmp.path(), &["select", "2"]);
    let out = run_fp_ok(tmp.path(), &["export", "-f", "ics"]);
    assert_eq!(out.trim(), "Exported 1 event to my-festival-plan.ics");
    let ics = fs::read_to_string(tmp.path().join("my-festival-plan.ics")).unwrap();
    assert!(ics.contains("SUMMARY:Film B\r\n"));
    assert!(ics.contains("LOCATION:Hall 2\r\n"));
}

#[test]
fn test_json_export_import_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());
    run_fp_ok(tmp.path(), &["select", "1"]);
    run_fp_ok(tmp.path(), &["interest", "2"]);
    run_fp_ok(tmp.path(), &["hide", "3"]);
    let before = statuses(tmp.path());

    run_fp_ok(tmp.path(), &["export", "-f", "json", "-o", "plan.json"]);
    run_fp_ok(tmp.path(), &["select", "2"]);
    run_fp_ok(tmp.path(), &["unhide-all"]);
    assert_ne!(statuses(tmp.path()), before);

    let out = run_fp_ok(tmp.path(), &["import", "plan.json"]);
    assert_eq!(out.trim(), "Imported 1 interested, 1 selected, 1 hidden");
    assert_eq!(statuses(tmp.path()), before);
}

#[test]
fn test_text_export_import_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());
    run_fp_ok(tmp.path(), &["select", "3"]);
    run_fp_ok(tmp.path(), &["interest", "1"]);
    let before = statuses(tmp.path());

    let text = run_fp_ok(tmp.path(), &["export", "-o", "-"]);
    assert!(text.starts_with("=== INTERESTED EVENTS ==="));
    assert!(text.contains("=== SELECTED EVENTS ==="));
    fs::write(tmp.path().join("plan.txt"), &text).unwrap();

    run_fp_ok(tmp.path(), &["select", "1"]);
    run_fp_ok(tmp.path(), &["import", "plan.txt"]);
    assert_eq!(statuses(tmp.path()), before);
}

#[test]
fn test_bad_import_leaves_plan() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());
    run_fp_ok(tmp.path(), &["select", "1"]);
    fs::write(tmp.path().join("bad.json"), "{\"selected\": []}").unwrap();

    let (_, stderr, success) = run_fp(tmp.path(), &["import", "bad.json"]);
    assert!(!success);
    assert!(stderr.contains("version"));
    assert_eq!(statuses(tmp.path())[0], serde_json::json!("selected"));
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[test]
fn test_bump_syncs_versions() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());
    fs::write(
        tmp.path().join("sw.js"),
        "const CACHE_VERSION = '1.0.3';\nself.addEventListener('install', () => {});\n",
    )
    .unwrap();

    let out = run_fp_ok(tmp.path(), &["bump", "--worker", "sw.js"]);
    assert!(out.starts_with("1.0.3 -> 1.0.4"));
    assert!(out.contains("worker cache version updated"));

    let version: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("version.json")).unwrap()).unwrap();
    assert_eq!(version["version"], "1.0.4");
    let toml = fs::read_to_string(tmp.path().join("planner.toml")).unwrap();
    assert!(toml.contains("version = \"1.0.4\" # synced by fp bump"));
    let worker = fs::read_to_string(tmp.path().join("sw.js")).unwrap();
    assert!(worker.starts_with("const CACHE_VERSION = '1.0.4';"));
}

#[test]
fn test_cache_lifecycle() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_fp_ok(tmp.path(), &["cache", "install"]);
    assert_eq!(out.trim(), "test-planner-v1.0.3: installed and activated");

    let out = run_fp_ok(tmp.path(), &["--json", "cache", "status"]);
    let status: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(status["active"], "test-planner-v1.0.3");
    assert_eq!(status["active_entries"], 2);

    // Site goes away: served from the cache
    fs::remove_file(tmp.path().join("index.html")).unwrap();
    let (stdout, stderr, success) = run_fp(tmp.path(), &["cache", "fetch", "/"]);
    assert!(success);
    assert_eq!(stdout, "<h1>planner</h1>");
    assert!(stderr.contains("offline"));

    // A new version waits until told to skip waiting
    run_fp_ok(tmp.path(), &["bump"]);
    fs::write(tmp.path().join("index.html"), "<h1>v2</h1>").unwrap();
    let out = run_fp_ok(tmp.path(), &["cache", "install"]);
    assert_eq!(out.trim(), "test-planner-v1.0.4: installed, waiting for activation");
    let out = run_fp_ok(tmp.path(), &["cache", "skip-waiting"]);
    assert!(out.contains("test-planner-v1.0.4 active"));
    assert!(out.contains("deleted test-planner-v1.0.3"));
}

#[test]
fn test_project_dir_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    let project = tmp.path().join("fest");
    fs::create_dir_all(&project).unwrap();
    create_test_project(&project);

    let out = run_fp_ok(tmp.path(), &["-C", "fest", "days"]);
    assert!(out.contains("Monday, 12"));
}
