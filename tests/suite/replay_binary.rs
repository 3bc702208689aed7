//! `carelog replay` end to end

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

use crate::common::{ADMIN, CONFIRMATION, NOTES, PATIENT, THERAPIST, b64, log_step};

fn run_replay(script: &serde_json::Value, extra: &[&str], dir: &Path) -> Output {
    let script_path = dir.join("script.json");
    fs::write(&script_path, script.to_string()).unwrap();
    Command::new(env!("CARGO_BIN_EXE_carelog"))
        .arg("replay")
        .arg(&script_path)
        .args(extra)
        .env("HOME", dir)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn prints_one_line_per_call_and_transfers() {
    let dir = tempdir().unwrap();
    let script = serde_json::json!([
        {"op": "set_logging_fee", "caller": ADMIN, "fee": 200},
        log_step(PATIENT, THERAPIST, 2),
        {"op": "confirm_session", "caller": THERAPIST, "block_height": 3,
         "session_id": 0, "confirmation_hash": b64(&CONFIRMATION)},
        {"op": "verify_session", "session_id": 0, "provided_hash": b64(&NOTES)},
        log_step(PATIENT, PATIENT, 4),
        {"op": "get_session_count"},
    ]);

    let output = run_replay(&script, &["--admin", ADMIN], dir.path());
    assert!(output.status.success(), "{output:?}");

    let lines = lines(&output);
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], serde_json::json!({"ok": true, "value": true}));
    assert_eq!(lines[1], serde_json::json!({"ok": true, "value": 0}));
    assert_eq!(lines[3], serde_json::json!({"ok": true, "value": true}));
    assert_eq!(lines[4], serde_json::json!({"ok": false, "error": 100}));
    assert_eq!(lines[5], serde_json::json!({"ok": true, "value": 1}));
    assert_eq!(
        lines[6],
        serde_json::json!({"transfers": [{"amount": 200, "from": PATIENT, "to": ADMIN}]})
    );
}

#[test]
fn reads_admin_from_config_flag() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("ledger.toml");
    fs::write(&config, "[ledger]\nadmin = \"ST5ADMIN\"\nmax_sessions = 1\n").unwrap();
    let script = serde_json::json!([
        log_step(PATIENT, THERAPIST, 1),
        log_step(PATIENT, THERAPIST, 2),
    ]);

    let output = run_replay(
        &script,
        &["--config", config.to_str().unwrap()],
        dir.path(),
    );
    assert!(output.status.success(), "{output:?}");

    let lines = lines(&output);
    assert_eq!(lines[1], serde_json::json!({"ok": false, "error": 115}));
    assert_eq!(lines[2]["transfers"][0]["to"], "ST5ADMIN");
}

#[test]
fn fails_without_admin() {
    let dir = tempdir().unwrap();
    let output = run_replay(&serde_json::json!([]), &[], dir.path());
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
