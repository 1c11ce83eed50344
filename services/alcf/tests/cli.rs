//! Command-line argument handling of the `alcf` binary.

use std::fs;
use std::process::Command;

fn alcf() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_alcf"));
    cmd.env_remove("ALCF_LIDAR_VARS")
        .env_remove("ALCF_LOG_LEVEL")
        .env_remove("ALCF_LOG_JSON")
        .env_remove("ALCF_CONTINUE_ON_ERROR");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let out = alcf().arg("--help").output().unwrap();
    assert!(out.status.success());
    let help = String::from_utf8_lossy(&out.stdout);
    for sub in ["lidar", "model", "calibrate"] {
        assert!(help.contains(sub), "missing {} in help", sub);
    }
}

#[test]
fn test_unknown_lidar_type_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = alcf()
        .args(["lidar", "cl99"])
        .arg(dir.path())
        .arg(dir.path().join("out"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("cl99"));
}

#[test]
fn test_model_requires_track() {
    let dir = tempfile::tempdir().unwrap();
    let out = alcf()
        .args(["model", "amps"])
        .arg(dir.path())
        .arg(dir.path().join("amps.nc"))
        .output()
        .unwrap();
    assert!(!out.status.success());
}

#[test]
fn test_calibrate_bad_periods_file() {
    let dir = tempfile::tempdir().unwrap();
    let periods = dir.path().join("periods.txt");
    fs::write(&periods, "2016-01-01\n").unwrap();

    let out = alcf()
        .args(["calibrate", "chm15k"])
        .arg(&periods)
        .arg(dir.path())
        .arg(dir.path().join("calibration.txt"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("line 1"));
}

#[test]
fn test_invalid_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("alcf.yaml");
    fs::write(&config, "lidar_variables: [nonsense]\n").unwrap();

    let out = alcf()
        .arg("--config")
        .arg(&config)
        .args(["lidar", "chm15k"])
        .arg(dir.path())
        .arg(dir.path().join("out"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("nonsense"));
}
