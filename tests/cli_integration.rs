use std::path::Path;
use std::process::Command;

fn nowplaying() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_nowplaying"));
    for key in ["PLEX_HOST", "PLEX_TOKEN", "HA_HOST", "HA_TOKEN", "PORT"] {
        command.env_remove(key);
    }
    command
}

/// Config pointing both upstreams at a port nothing listens on.
fn unreachable_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        r#"
[plex]
host = "http://127.0.0.1:9"
token = "t"

[hass]
host = "http://127.0.0.1:9"
token = "t"

[http]
request_timeout_secs = 1
"#,
    )
    .unwrap();
    path
}

#[test]
fn test_help_exits_zero() {
    let output = nowplaying().arg("--help").output().expect("failed to run");
    assert!(output.status.success(), "nowplaying --help should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Now-playing status"),
        "help should contain description"
    );
}

#[test]
fn test_version_exits_zero() {
    let output = nowplaying()
        .arg("--version")
        .output()
        .expect("failed to run");
    assert!(
        output.status.success(),
        "nowplaying --version should exit 0"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("nowplaying"),
        "version output should contain crate name"
    );
}

#[test]
fn test_config_path_honours_flag() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("custom.toml");

    let output = nowplaying()
        .args(["--config", path.to_str().unwrap(), "config", "path"])
        .output()
        .expect("failed to run");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        path.display().to_string()
    );
}

#[test]
fn test_config_init_writes_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");

    let output = nowplaying()
        .args(["--config", path.to_str().unwrap(), "config", "init"])
        .output()
        .expect("failed to run");
    assert!(output.status.success());
    assert!(path.is_file());

    let again = nowplaying()
        .args(["--config", path.to_str().unwrap(), "config", "init"])
        .output()
        .expect("failed to run");
    assert!(!again.status.success(), "init should not overwrite without --force");
}

#[test]
fn test_status_with_unreachable_upstreams() {
    let tmp = tempfile::tempdir().unwrap();
    let config = unreachable_config(tmp.path());

    let output = nowplaying()
        .args(["--config", config.to_str().unwrap(), "status"])
        .output()
        .expect("failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "status failed: {stderr}");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Nothing is currently playing"
    );
}

#[test]
fn test_check_reports_failures() {
    let tmp = tempfile::tempdir().unwrap();
    let config = unreachable_config(tmp.path());

    let output = nowplaying()
        .args(["--config", config.to_str().unwrap(), "check"])
        .output()
        .expect("failed to run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked"), "check should not panic");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✗ Plex"));
}
