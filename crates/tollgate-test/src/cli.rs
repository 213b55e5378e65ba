//! CLI regression tests for the `tollgate` binary.
//!
//! These tests invoke the binary as a subprocess to catch regressions in flag
//! names, exit codes, and output formats that the library tests can't catch.
//!
//! Run with: `cargo test -p tollgate-test`
//! Requires the `tollgate` binary to be built first (`cargo build -p tollgate`).

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

use crate::TestBundle;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns an assert_cmd Command wrapping the `tollgate` binary.
fn tollgate() -> Command {
    // cargo_bin is deprecated for custom build-dir setups; fine for standard workspace use.
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("tollgate")
        .expect("tollgate binary not found; run `cargo build -p tollgate` first");
    cmd.env_remove("TOLLGATE_BUNDLE")
        .env_remove("TOLLGATE_PROXY")
        .env_remove("RUST_LOG");
    cmd
}

/// Absolute path to the shared test fixtures directory.
fn fixtures() -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/tollgate-test
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crates/")
        .parent()
        .expect("workspace root")
        .join("tests/fixtures")
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let s = String::from_utf8(output.stdout.clone()).expect("stdout should be valid UTF-8");
    serde_json::from_str(&s).expect("stdout should be valid JSON")
}

// ---------------------------------------------------------------------------
// tollgate convert
// ---------------------------------------------------------------------------

#[test]
fn convert_petstore_outputs_swagger_json() {
    let output = tollgate()
        .args(["convert", "--bundle"])
        .arg(fixtures().join("petstore"))
        .assert()
        .success()
        .get_output()
        .clone();

    let doc = stdout_json(&output);
    assert_eq!(doc["swagger"], "2.0");
    assert_eq!(doc["basePath"], "/v1/petstore");
    assert_eq!(doc["info"]["title"], "Petstore");
    assert_eq!(doc["info"]["version"], "4.0");
    assert_eq!(doc["info"]["description"], "Sample pet store proxy");

    assert_eq!(doc["paths"]["/pets"]["get"]["operationId"], "ListPets");
    assert_eq!(doc["paths"]["/pets"]["post"]["operationId"], "AddPet");
    assert_eq!(doc["paths"]["/pets/{petsId}"]["get"]["operationId"], "GetPet");
    assert_eq!(
        doc["paths"]["/pets/{petsId}"]["get"]["summary"],
        "Find pet by ID"
    );
    assert_eq!(
        doc["paths"]["/pets/{petsId}"]["delete"]["parameters"][0]["name"],
        "petsId"
    );
}

#[test]
fn convert_omits_unsupported_methods_and_null_conditions() {
    let output = tollgate()
        .args(["convert", "--bundle"])
        .arg(fixtures().join("petstore"))
        .assert()
        .success()
        .get_output()
        .clone();

    let doc = stdout_json(&output);
    let paths = doc["paths"].as_object().expect("paths should be an object");
    assert_eq!(paths.len(), 2);
    assert!(doc["paths"]["/pets/{petsId}"].get("patch").is_none());
}

#[test]
fn convert_accepts_the_export_directory_itself() {
    tollgate()
        .args(["convert", "--bundle"])
        .arg(fixtures().join("petstore/apiproxy"))
        .assert()
        .success()
        .stdout(contains("\"/pets/{petsId}\""));
}

#[test]
fn convert_compact_is_single_line() {
    let output = tollgate()
        .args(["convert", "--compact", "--bundle"])
        .arg(fixtures().join("petstore"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let s = String::from_utf8(output).expect("stdout should be valid UTF-8");
    assert_eq!(s.trim_end().lines().count(), 1);
}

#[test]
fn convert_yaml_format() {
    tollgate()
        .args(["convert", "--format", "yaml", "--bundle"])
        .arg(fixtures().join("petstore"))
        .assert()
        .success()
        .stdout(contains("swagger: '2.0'"))
        .stdout(contains("operationId: GetPet"));
}

#[test]
fn convert_unknown_format_exits_one() {
    tollgate()
        .args(["convert", "--format", "xml", "--bundle"])
        .arg(fixtures().join("petstore"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E3010"));
}

#[test]
fn convert_writes_output_file() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("openapi.json");

    tollgate()
        .args(["convert", "--bundle"])
        .arg(fixtures().join("petstore"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(contains("Document written to"));

    let content = std::fs::read_to_string(&out).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["swagger"], "2.0");
}

#[test]
fn convert_reads_config_file() {
    tollgate()
        .args(["convert", "--config"])
        .arg(fixtures().join("tollgate.yaml"))
        .assert()
        .success()
        .stdout(contains("basePath: /v1/petstore"));
}

#[test]
fn convert_flags_override_config_file() {
    let output = tollgate()
        .args(["convert", "--format", "json", "--config"])
        .arg(fixtures().join("tollgate.yaml"))
        .assert()
        .success()
        .get_output()
        .clone();

    let doc = stdout_json(&output);
    assert_eq!(doc["basePath"], "/v1/petstore");
}

#[test]
fn convert_bundle_from_env() {
    tollgate()
        .arg("convert")
        .env("TOLLGATE_BUNDLE", fixtures().join("petstore"))
        .assert()
        .success()
        .stdout(contains("ListPets"));
}

#[test]
fn convert_missing_bundle_exits_one() {
    tollgate()
        .args(["convert", "--bundle", "this-directory-does-not-exist"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("error:"));
}

#[test]
fn convert_malformed_xml_exits_one() {
    tollgate()
        .args(["convert", "--bundle"])
        .arg(fixtures().join("malformed-xml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E3002"))
        .stderr(contains("default.xml"));
}

#[test]
fn convert_ambiguous_proxy_exits_one() {
    tollgate()
        .args(["convert", "--bundle"])
        .arg(fixtures().join("multi-proxy"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E3004"))
        .stderr(contains("Alpha"))
        .stderr(contains("Beta"));
}

#[test]
fn convert_selects_named_proxy() {
    let output = tollgate()
        .args(["convert", "--proxy", "Beta", "--bundle"])
        .arg(fixtures().join("multi-proxy"))
        .assert()
        .success()
        .get_output()
        .clone();

    let doc = stdout_json(&output);
    assert_eq!(doc["basePath"], "/beta");
    assert_eq!(
        doc["paths"]["/things/{thingsId}/parts/{partsId}"]["put"]["operationId"],
        "PutBeta"
    );
}

#[test]
fn convert_unknown_proxy_exits_one() {
    tollgate()
        .args(["convert", "--proxy", "Gamma", "--bundle"])
        .arg(fixtures().join("multi-proxy"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E3003"));
}

#[test]
fn convert_invalid_condition_still_succeeds_with_warning() {
    let output = tollgate()
        .args(["convert", "--bundle"])
        .arg(fixtures().join("invalid-condition"))
        .assert()
        .success()
        .stderr(contains("BrokenQuote"))
        .stderr(contains("/broken"))
        .get_output()
        .clone();

    let doc = stdout_json(&output);
    assert_eq!(doc["paths"]["/"]["get"]["operationId"], "ListOrders");
    assert_eq!(doc["info"]["version"], "1.2");
}

#[test]
fn convert_json_logs_are_json_lines_on_stderr() {
    let output = tollgate()
        .args(["--log-format", "json", "--log-level", "info", "convert", "--bundle"])
        .arg(fixtures().join("petstore"))
        .assert()
        .success()
        .get_output()
        .clone();

    let stderr = String::from_utf8(output.stderr.clone()).expect("stderr should be valid UTF-8");
    let events: Vec<serde_json::Value> = stderr
        .lines()
        .map(|line| serde_json::from_str(line).expect("every log line should be JSON"))
        .collect();
    assert!(events
        .iter()
        .any(|e| e["event"] == "conversion_completed"));

    // stdout still carries only the document
    stdout_json(&output);
}

#[test]
fn convert_logs_verbless_flow_as_unrouted_at_info() {
    let bundle = TestBundle::new("Petstore")
        .flow(
            "default",
            "NoVerb",
            "",
            Some(r#"(proxy.pathsuffix MatchesPath "/pets/*")"#),
        )
        .write()
        .unwrap();

    let output = tollgate()
        .args(["--log-format", "json", "--log-level", "info", "convert", "--bundle"])
        .arg(bundle.path())
        .assert()
        .success()
        .get_output()
        .clone();

    let stderr = String::from_utf8(output.stderr).expect("stderr should be valid UTF-8");
    let events: Vec<serde_json::Value> = stderr
        .lines()
        .map(|line| serde_json::from_str(line).expect("every log line should be JSON"))
        .collect();
    let unrouted: Vec<_> = events
        .iter()
        .filter(|e| e["event"] == "flow_unrouted")
        .collect();
    assert_eq!(unrouted.len(), 1);
    assert_eq!(unrouted[0]["level"], "INFO");
    assert_eq!(unrouted[0]["flow"], "NoVerb");
    assert_eq!(unrouted[0]["path"], "/pets/{petsId}");
    assert!(events.iter().all(|e| e["event"] != "flow_skipped"));
}

#[test]
fn unknown_log_format_exits_one() {
    tollgate()
        .args(["--log-format", "xml", "convert", "--bundle"])
        .arg(fixtures().join("petstore"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("unknown log format"));
}

#[test]
fn invalid_log_level_exits_one() {
    tollgate()
        .args(["--log-level", "tollgate=loud", "convert", "--bundle"])
        .arg(fixtures().join("petstore"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("invalid log filter"));
}

// ---------------------------------------------------------------------------
// tollgate inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_petstore_text() {
    tollgate()
        .args(["inspect", "--bundle"])
        .arg(fixtures().join("petstore"))
        .assert()
        .success()
        .stdout(contains("default/GetPet: GET /pets/{petsId}"))
        .stdout(contains("default/PatchPet: PATCH /pets/{petsId} (unsupported method)"))
        .stdout(contains("inspected 6 flow(s): 4 routed, 1 dropped, 1 skipped, 0 error(s)"));
}

#[test]
fn inspect_json_format_outputs_results_and_summary() {
    let output = tollgate()
        .args(["inspect", "--format", "json", "--bundle"])
        .arg(fixtures().join("petstore"))
        .assert()
        .success()
        .get_output()
        .clone();

    let v = stdout_json(&output);
    assert!(v.get("results").is_some(), "JSON output missing 'results' key");
    assert!(v.get("summary").is_some(), "JSON output missing 'summary' key");
    assert_eq!(v["summary"]["total"], 6);
    assert_eq!(v["summary"]["routed"], 4);

    let unknown = v["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["flow"] == "Unknown")
        .unwrap();
    assert_eq!(unknown["status"], "skipped");
    assert_eq!(unknown["reason"], "missing_path");
}

#[test]
fn inspect_invalid_condition_exits_one() {
    tollgate()
        .args(["inspect", "--bundle"])
        .arg(fixtures().join("invalid-condition"))
        .assert()
        .failure()
        .code(1)
        .stdout(contains("✗ default/BrokenQuote: E2001"))
        .stdout(contains("condition: (proxy.pathsuffix MatchesPath \"/broken)"));
}

#[test]
fn inspect_invalid_condition_json_reports_reason() {
    let output = tollgate()
        .args(["inspect", "--format", "json", "--bundle"])
        .arg(fixtures().join("invalid-condition"))
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();

    let v = stdout_json(&output);
    assert_eq!(v["summary"]["errors"], 1);
    let broken = v["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["flow"] == "BrokenQuote")
        .unwrap();
    assert_eq!(broken["reason"], "invalid_condition");
}

#[test]
fn inspect_untemplatable_path_exits_one() {
    let bundle = TestBundle::new("Files")
        .flow(
            "default",
            "Deep",
            "",
            Some(r#"(proxy.pathsuffix MatchesPath "/files/**") and (request.verb = "GET")"#),
        )
        .write()
        .unwrap();

    tollgate()
        .args(["inspect", "--bundle"])
        .arg(bundle.path())
        .assert()
        .failure()
        .code(1)
        .stdout(contains("E2002"));
}

#[test]
fn inspect_reports_replaced_route() {
    let condition = r#"(proxy.pathsuffix MatchesPath "/pets") and (request.verb = "POST")"#;
    let bundle = TestBundle::new("Petstore")
        .flow("default", "AddPet", "first", Some(condition))
        .flow("default", "AddPetV2", "second", Some(condition))
        .write()
        .unwrap();

    tollgate()
        .args(["inspect", "--bundle"])
        .arg(bundle.path())
        .assert()
        .success()
        .stdout(contains("default/AddPetV2: POST /pets (replaces AddPet)"));
}

#[test]
fn inspect_missing_bundle_flag_exits_two() {
    tollgate().arg("inspect").assert().failure().code(2);
}
