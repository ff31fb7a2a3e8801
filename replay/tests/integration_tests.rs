//! Integration tests for the replay binary
//!
//! These run the built binary against the checked-in replay config,
//! profiles and recorded samples.

use std::process::Command;

fn replay_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_confluence-replay"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

#[test]
fn test_replay_reports_every_instrument() {
    let output = replay_bin()
        .args(["--config", "replay.yaml"])
        .output()
        .expect("Failed to run replay binary");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for symbol in ["NIFTY", "BANKNIFTY", "SENSEX"] {
        assert!(
            stdout.lines().any(|line| line.starts_with(&format!("{symbol}: "))),
            "missing report for {symbol}"
        );
    }
    assert!(stdout.contains("30-sample window"));
}

#[test]
fn test_missing_config_fails() {
    let output = replay_bin()
        .args(["--config", "does-not-exist.yaml"])
        .output()
        .expect("Failed to run replay binary");
    assert!(!output.status.success());
}
