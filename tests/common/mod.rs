//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use initiative_bridge::schema::{Tier, FIELDS};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::MockServer;

/// Path of the REST resource on the mock server.
pub fn endpoint_path(name: &str) -> String {
    format!("/confluence/rest/jirarequest/1.0/{name}")
}

/// Site base URL pointing at the mock server.
pub fn base_url(server: &MockServer) -> String {
    format!("{}/confluence", server.uri())
}

/// A form with every schema field filled in as `<field> text`.
pub fn full_form(issue_key: &str, status: &str) -> Map<String, Value> {
    let mut form = Map::new();
    for spec in FIELDS {
        form.insert(
            spec.source.to_string(),
            Value::String(format!("{} text", spec.source)),
        );
    }
    form.insert("issuekey".to_string(), Value::String(issue_key.to_string()));
    form.insert("issuestatus".to_string(), Value::String(status.to_string()));
    form
}

pub fn write_form(dir: &Path, form: &Map<String, Value>) -> PathBuf {
    let path = dir.join("charter.json");
    std::fs::write(&path, serde_json::to_string_pretty(form).expect("encode form"))
        .expect("write form");
    path
}

pub fn read_form(path: &Path) -> Map<String, Value> {
    let text = std::fs::read_to_string(path).expect("read form");
    match serde_json::from_str(&text).expect("form is JSON") {
        Value::Object(map) => map,
        other => panic!("form is not an object: {other}"),
    }
}

pub fn payload_keys(tier: Tier) -> Vec<&'static str> {
    FIELDS
        .iter()
        .filter(|spec| spec.tier == tier)
        .map(|spec| spec.key)
        .collect()
}

/// The JSON body `update` should send for `form` at the given tier.
pub fn expected_payload(form: &Map<String, Value>, extended: bool) -> Value {
    let mut payload = Map::new();
    for spec in FIELDS {
        if spec.tier == Tier::Base || extended {
            payload.insert(spec.key.to_string(), form[spec.source].clone());
        }
    }
    Value::Object(payload)
}

fn run_in(home: PathBuf, args: Vec<String>) -> Output {
    Command::new(env!("CARGO_BIN_EXE_initiative"))
        .args(&args)
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("INITIATIVE_BASE_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("run initiative")
}

/// Run the `initiative` binary with an isolated home and no base URL in env.
pub fn run_initiative(home: &TempDir, args: &[&str]) -> Output {
    run_in(home.path().to_path_buf(), owned(args))
}

/// Same as [`run_initiative`], off the async runtime's worker threads.
pub async fn run_initiative_async(home: &TempDir, args: &[&str]) -> Output {
    let home = home.path().to_path_buf();
    let args = owned(args);
    tokio::task::spawn_blocking(move || run_in(home, args))
        .await
        .expect("join initiative run")
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
