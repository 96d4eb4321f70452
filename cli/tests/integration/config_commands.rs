//! Integration tests for the config-only commands: `plan`, `validate`, and
//! the validation gate in front of `run`.
//!
//! Every test points `LOADER_BOOTSTRAP_CONFIG` at a temp path so the host's
//! `/etc/loader-bootstrap/config.yaml` is never read.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG: &str = "\
storage:
  bucket: worker-artifacts
paths:
  install_root: /opt/loader
nfs:
  export: files.internal:/srv/source
";

fn loader_bootstrap() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("loader-bootstrap"));
    cmd.env("NO_COLOR", "1")
        .env_remove("LOADER_BOOTSTRAP_ACCESS_KEY")
        .env_remove("LOADER_BOOTSTRAP_SECRET_KEY");
    cmd
}

/// Returns a `TempDir` and the path of a config file written inside it.
fn write_config(contents: &str) -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, contents).expect("write config");
    (dir, path.to_string_lossy().into_owned())
}

// ---------------------------------------------------------------------------
// `plan`
// ---------------------------------------------------------------------------

#[test]
fn test_plan_json_lists_phases_in_order() {
    let (_dir, path) = write_config(CONFIG);
    let output = loader_bootstrap()
        .args(["plan", "--json"])
        .env("LOADER_BOOTSTRAP_CONFIG", &path)
        .output()
        .expect("binary runs");
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON plan");
    let names: Vec<&str> = plan["phases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        [
            "identity",
            "directories",
            "downloads",
            "permissions",
            "packages",
            "fuse-service",
            "nfs",
            "fuse-conf"
        ]
    );
    assert_eq!(plan["launch"]["program"], "java");
    assert_eq!(plan["launch"]["args"][0], "-DisMaster=false");
}

#[test]
fn test_plan_json_downloads_into_install_root() {
    let (_dir, path) = write_config(CONFIG);
    let output = loader_bootstrap()
        .args(["plan", "--json", "--config", &path])
        .output()
        .expect("binary runs");
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON plan");

    let downloads = plan["phases"][2]["actions"].as_array().unwrap();
    assert_eq!(downloads.len(), 4);
    for action in downloads {
        assert_eq!(action["kind"], "download");
        let dest = action["dest"].as_str().unwrap();
        let key = action["key"].as_str().unwrap();
        assert_eq!(dest, format!("/opt/loader/{key}"));
    }
}

#[test]
fn test_plan_does_not_require_credentials() {
    let (_dir, path) = write_config(CONFIG);
    loader_bootstrap()
        .arg("plan")
        .env("LOADER_BOOTSTRAP_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("worker-artifacts"))
        .stdout(predicate::str::contains(
            "mount files.internal:/srv/source /mydir/nfs",
        ))
        .stdout(predicate::str::contains("-DisMaster=false"));
}

#[test]
fn test_plan_rejects_malformed_config() {
    let (_dir, path) = write_config("identity:\n  uid: not-a-number\n");
    loader_bootstrap()
        .arg("plan")
        .env("LOADER_BOOTSTRAP_CONFIG", &path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}

// ---------------------------------------------------------------------------
// `validate`
// ---------------------------------------------------------------------------

#[test]
fn test_validate_without_credentials_fails() {
    let (_dir, path) = write_config(CONFIG);
    loader_bootstrap()
        .arg("validate")
        .env("LOADER_BOOTSTRAP_CONFIG", &path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("storage.access_key must not be empty"));
}

#[test]
fn test_validate_accepts_credentials_from_env() {
    let (_dir, path) = write_config(CONFIG);
    loader_bootstrap()
        .arg("validate")
        .env("LOADER_BOOTSTRAP_CONFIG", &path)
        .env("LOADER_BOOTSTRAP_ACCESS_KEY", "AKIDEXAMPLE")
        .env("LOADER_BOOTSTRAP_SECRET_KEY", "wJalrXUtnFEMI")
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("wJalrXUtnFEMI").not());
}

#[test]
fn test_validate_json_lists_every_error() {
    let (_dir, path) = write_config(
        "artifacts:\n  loader_jar: ../escape.jar\nnfs:\n  export: no-colon\n",
    );
    let output = loader_bootstrap()
        .args(["validate", "--json"])
        .env("LOADER_BOOTSTRAP_CONFIG", &path)
        .output()
        .expect("binary runs");
    assert_eq!(output.status.code(), Some(1));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON body");
    assert_eq!(body["valid"], false);
    let errors: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    assert!(errors.iter().any(|e| e.contains("artifacts.loader_jar")));
    assert!(errors.iter().any(|e| e.contains("nfs.export")));
    assert!(errors.iter().any(|e| e.contains("storage.secret_key")));
}

// ---------------------------------------------------------------------------
// `run`
// ---------------------------------------------------------------------------

#[test]
fn test_run_refuses_invalid_config_before_any_step() {
    let (dir, path) = write_config(CONFIG);
    let fuse_conf = dir.path().join("fuse.conf");
    std::fs::write(
        &path,
        format!("{CONFIG}system:\n  fuse_conf_path: {}\n", fuse_conf.display()),
    )
    .unwrap();

    loader_bootstrap()
        .arg("run")
        .env("LOADER_BOOTSTRAP_CONFIG", &path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid configuration"));
    assert!(!fuse_conf.exists());
}

#[test]
fn test_json_mode_reports_errors_as_json() {
    let (_dir, path) = write_config("identity:\n  uid: not-a-number\n");
    let output = loader_bootstrap()
        .args(["plan", "--json"])
        .env("LOADER_BOOTSTRAP_CONFIG", &path)
        .output()
        .expect("binary runs");
    assert_eq!(output.status.code(), Some(1));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON error");
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains("cannot parse"));
}
