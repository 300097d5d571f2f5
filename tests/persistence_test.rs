#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::{NamedTempFile, tempdir};
use uuid::Uuid;

fn run(db_path: &Path, args: &[&str]) -> Output {
    Command::new(cargo_bin!("vendor-payouts"))
        .arg("--db-path")
        .arg(db_path)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn json_stdout(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn request_file(value: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{value}").unwrap();
    file
}

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let user_id = Uuid::new_v4();

    // 1. Register in one process
    let registration = request_file(&common::registration_json(user_id, "Acme Books"));
    let vendor = json_stdout(&run(
        &db_path,
        &["register", registration.path().to_str().unwrap()],
    ));
    let vendor_id = vendor["id"].as_str().unwrap().to_string();
    assert_eq!(vendor["status"], "pending");

    // 2. Approve in another; the vendor must have survived
    let approved = json_stdout(&run(&db_path, &["approve", &vendor_id]));
    assert_eq!(approved["status"], "active");

    let by_user = json_stdout(&run(&db_path, &["get-by-user", &user_id.to_string()]));
    assert_eq!(by_user["id"], vendor_id.as_str());

    // 3. Create and settle a payout across invocations
    let request = request_file(&serde_json::json!({
        "vendor_id": vendor_id,
        "amount": "100.00",
        "currency": "usd",
        "payout_method": "paypal",
        "payout_details": {"email": "billing@acme.test"}
    }));
    let payout = json_stdout(&run(
        &db_path,
        &["create-payout", request.path().to_str().unwrap()],
    ));
    assert_eq!(payout["status"], "pending");
    assert_eq!(payout["currency"], "USD");
    let payout_id = payout["id"].as_str().unwrap().to_string();

    let pending = json_stdout(&run(&db_path, &["pending-amount", &vendor_id]));
    assert_eq!(pending["pending_amount"], "100.00");

    let settled = json_stdout(&run(&db_path, &["process-payout", &payout_id, "--wait"]));
    assert_eq!(settled["status"], "completed");
    assert!(settled["processed_at"].is_string());

    let reloaded = json_stdout(&run(&db_path, &["get-payout", &payout_id]));
    assert_eq!(reloaded["status"], "completed");

    let pending = json_stdout(&run(&db_path, &["pending-amount", &vendor_id]));
    assert_eq!(pending["pending_amount"], "0");
}

#[test]
fn test_rocksdb_user_uniqueness_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let user_id = Uuid::new_v4();

    let first = request_file(&common::registration_json(user_id, "Acme Books"));
    json_stdout(&run(&db_path, &["register", first.path().to_str().unwrap()]));

    let second = request_file(&common::registration_json(user_id, "Acme Again"));
    let output = run(&db_path, &["register", second.path().to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Conflict"));
}
