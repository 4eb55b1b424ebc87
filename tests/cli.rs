use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("specs")
        .join(name)
}

fn fixed_width() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fixed-width"))
}

#[test]
fn test_decode_then_encode_files() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("nested").join("payroll.json");
    let text = dir.path().join("payroll.txt");

    let status = fixed_width()
        .arg("decode")
        .arg("--schema")
        .arg(fixture("payroll.schema.json"))
        .arg(fixture("payroll.txt"))
        .arg("-o")
        .arg(&json)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(fs::read_to_string(&json).unwrap().contains("\"company_id\": \"ACME\""));

    let status = fixed_width()
        .arg("encode")
        .arg("--schema")
        .arg(fixture("payroll.schema.json"))
        .arg(&json)
        .arg("-o")
        .arg(&text)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(
        fs::read_to_string(&text).unwrap(),
        fs::read_to_string(fixture("payroll.txt")).unwrap()
    );
}

#[test]
fn test_decode_to_stdout() {
    let output = fixed_width()
        .args(["decode", "--schema"])
        .arg(fixture("payroll.schema.json"))
        .arg(fixture("payroll.txt"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["body"][0]["name"]["first"], "Ryan");
    assert_eq!(value["footer"]["record_count"], 2);
}

#[test]
fn test_failure_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.txt");
    fs::write(&bad, "HEAD        ACME20240131\n").unwrap();

    let output = fixed_width()
        .args(["decode", "--schema"])
        .arg(fixture("payroll.schema.json"))
        .arg(&bad)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Required section 'body' was not found"));
}
