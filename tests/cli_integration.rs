//! Integration tests for the `airflow-correlator` binary
//!
//! Each test runs the built binary with a scrubbed environment, a temporary
//! working directory and a temporary HOME, so only the configuration the
//! test provides is discovered.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const TRANSPORT_ENV: &str = "AIRFLOW__OPENLINEAGE__TRANSPORT";

// ============================================================================
// Helper Functions
// ============================================================================

struct Sandbox {
    cwd: TempDir,
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            cwd: TempDir::new().unwrap(),
            home: TempDir::new().unwrap(),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_airflow-correlator"));
        cmd.args(args)
            .current_dir(self.cwd.path())
            .env("HOME", self.home.path())
            .env("NO_COLOR", "1")
            .env_remove(TRANSPORT_ENV)
            .env_remove("OPENLINEAGE_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().unwrap()
    }

    fn run_with_transport(&self, transport: &str, args: &[&str]) -> Output {
        self.command(args).env(TRANSPORT_ENV, transport).output().unwrap()
    }

    fn write_config(&self, contents: &str) {
        write_file(&self.cwd.path().join("openlineage.yml"), contents);
    }
}

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const KEYED_TRANSPORT: &str =
    r#"{"type": "correlator", "url": "http://correlator.local:8080/", "api_key": "s3cr3t-key", "timeout": 5}"#;

// ============================================================================
// config show
// ============================================================================

#[test]
fn test_show_json_masks_api_key() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_transport(KEYED_TRANSPORT, &["config", "show", "-o", "json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(!out.contains("s3cr3t-key"));

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["type"], "correlator");
    assert_eq!(json["api_key"], "***");
    assert_eq!(json["timeout"], 5);
    assert_eq!(json["origin"], TRANSPORT_ENV);
    assert_eq!(json["endpoint"], "http://correlator.local:8080/api/v1/lineage/events");
}

#[test]
fn test_show_yaml_masks_api_key() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_transport(KEYED_TRANSPORT, &["config", "show", "-o", "yaml"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(!out.contains("s3cr3t-key"));

    let yaml: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
    assert_eq!(yaml["type"].as_str(), Some("correlator"));
    assert_eq!(yaml["api_key"].as_str(), Some("***"));
    assert_eq!(
        yaml["endpoint"].as_str(),
        Some("http://correlator.local:8080/api/v1/lineage/events")
    );
}

#[test]
fn test_show_text_masks_api_key() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_transport(KEYED_TRANSPORT, &["config", "show", "-o", "text"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("api_key: ***"));
    assert!(out.contains("endpoint: http://correlator.local:8080/api/v1/lineage/events"));
    assert!(!out.contains("s3cr3t-key"));
}

#[test]
fn test_show_text_without_transport() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["config", "show", "-o", "text"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("No OpenLineage transport configured"));
}

#[test]
fn test_show_json_without_transport_is_null() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["config", "show", "-o", "json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "null");
}

#[test]
fn test_show_text_warns_on_empty_url() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_transport(r#"{"type": "correlator"}"#, &["config", "show", "-o", "text"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("URL is empty, events will not be emitted"));
}

#[test]
fn test_show_reads_working_dir_file_with_env_expansion() {
    let sandbox = Sandbox::new();
    sandbox.write_config(
        "transport:\n  type: correlator\n  url: ${CORRELATOR_TEST_URL}\n  verify_ssl: false\n",
    );

    let output = sandbox
        .command(&["config", "show", "-o", "json"])
        .env("CORRELATOR_TEST_URL", "https://lineage.example.com")
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["url"], "https://lineage.example.com");
    assert_eq!(json["verify_ssl"], false);
    assert!(json["api_key"].is_null());
    assert!(json["origin"].as_str().unwrap().ends_with("openlineage.yml"));
}

#[test]
fn test_show_rejects_mistyped_config() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_transport(
        r#"{"type": "correlator", "url": "http://x", "timeout": "soon"}"#,
        &["config", "show", "-o", "json"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid transport configuration"));
}

// ============================================================================
// config get
// ============================================================================

#[test]
fn test_get_known_keys() {
    let sandbox = Sandbox::new();

    let url = sandbox.run_with_transport(KEYED_TRANSPORT, &["config", "get", "url"]);
    assert!(url.status.success(), "stderr: {}", stderr(&url));
    assert_eq!(stdout(&url).trim(), "http://correlator.local:8080/");

    let key = sandbox.run_with_transport(KEYED_TRANSPORT, &["config", "get", "api_key"]);
    assert_eq!(stdout(&key).trim(), "***");

    let timeout = sandbox.run_with_transport(KEYED_TRANSPORT, &["config", "get", "timeout"]);
    assert_eq!(stdout(&timeout).trim(), "5");
}

#[test]
fn test_get_unknown_key_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_transport(KEYED_TRANSPORT, &["config", "get", "password"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unknown config key: password"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_get_without_transport_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["config", "get", "url"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No OpenLineage transport configured"));
}

// ============================================================================
// version and completions
// ============================================================================

#[test]
fn test_version_flag() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--version"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_completions_use_binary_name() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["completions", "bash"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("airflow-correlator"));
}
