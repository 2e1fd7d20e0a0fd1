//! Shared test helpers for integration tests
//!
//! Fixtures are written into a temp directory that also serves as the
//! working directory and config home, so no user config leaks in.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Five dry-film batches of DF-100 plus one adhesive batch
pub const RECORDS_CSV: &str = "\
product_code,batch_number,production_line,test_date,viscosity,solid_content
DF-100,DF240101-A,L1,2024-01-01,48,40.0
DF-100,DF240102-A,L1,2024-01-02,49,40.2
DF-100,DF240103-A,L1,2024-01-03,50,
DF-100,DF240104-A,L2,2024-01-04,52,40.4
DF-100,DF240105-A,L2,2024-01-05,51,40.1
AD-7,AD240101-B,L3,2024-01-01,70,55.0
";

pub const STANDARDS_YAML: &str = "\
- product_code: DF-100
  test_item: viscosity
  standard_type: internal_control
  lower_limit: 40.0
  upper_limit: 60.0
  target_value: 50.0
- product_code: DF-100
  test_item: viscosity
  standard_type: external_control
  lower_limit: 45.0
  upper_limit: 55.0
";

/// Helper to get a qcspc command isolated from the user's environment
pub fn qcspc(tmp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("qcspc"));
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env_remove("QCSPC_RECORDS")
        .env_remove("QCSPC_STANDARDS")
        .env_remove("QCSPC_STANDARD_TYPE")
        .env_remove("QCSPC_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

pub fn write_file(tmp: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = tmp.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Temp dir with `records.csv` and `standards.yaml` fixtures
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp, "records.csv", RECORDS_CSV);
    write_file(&tmp, "standards.yaml", STANDARDS_YAML);
    tmp
}

/// Run a command expected to succeed and parse its stdout as JSON
pub fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
