//! Integration tests for the `clinic` CLI binary.
//!
//! Argument parsing, configuration handling and error mapping are checked
//! without a server; command flows run against a wiremock backend.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{
    body_json, header, header_regex, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `clinic` binary with env isolation.
///
/// Clears all `CLINIC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn clinic_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("clinic");
    cmd.env("HOME", "/tmp/clinic-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/clinic-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/clinic-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("CLINIC_CONFIG")
        .env_remove("CLINIC_SESSION_DIR")
        .env_remove("CLINIC_PROFILE")
        .env_remove("CLINIC_SERVER")
        .env_remove("CLINIC_EMAIL")
        .env_remove("CLINIC_PASSWORD")
        .env_remove("CLINIC_OUTPUT")
        .env_remove("CLINIC_INSECURE")
        .env_remove("CLINIC_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A temporary config file plus session directory.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Config with a single `default` profile pointing at `server`.
    fn new(server: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            format!(
                "default_profile = \"default\"\n\n\
                 [profiles.default]\n\
                 server = \"{server}\"\n\
                 email = \"doc@clinic.test\"\n\
                 token_store = \"file\"\n"
            ),
        )
        .unwrap();
        Self { dir }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn session_dir(&self) -> PathBuf {
        self.dir.path().join("sessions")
    }

    fn session_file(&self) -> PathBuf {
        self.session_dir().join("default.json")
    }

    /// Pretend a previous `clinic login` succeeded.
    fn sign_in(&self, access: &str, refresh: &str) {
        std::fs::create_dir_all(self.session_dir()).unwrap();
        std::fs::write(
            self.session_file(),
            json!({ "access_token": access, "refresh_token": refresh }).to_string(),
        )
        .unwrap();
    }

    fn stored_session(&self) -> Option<serde_json::Value> {
        let text = std::fs::read_to_string(self.session_file()).ok()?;
        Some(serde_json::from_str(&text).unwrap())
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = clinic_cmd();
        cmd.env("CLINIC_CONFIG", self.config_path())
            .env("CLINIC_SESSION_DIR", self.session_dir());
        cmd
    }
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn page(results: serde_json::Value, count: u64) -> serde_json::Value {
    json!({ "results": results, "count": count, "next": null, "previous": null })
}

fn read_config(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = clinic_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    clinic_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("patients")
            .and(predicate::str::contains("appointments"))
            .and(predicate::str::contains("prescriptions"))
            .and(predicate::str::contains("stats")),
    );
}

#[test]
fn test_version_flag() {
    clinic_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("clinic"));
}

#[test]
fn test_subcommand_help() {
    clinic_cmd()
        .args(["appointments", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("queue")
                .and(predicate::str::contains("cancel"))
                .and(predicate::str::contains("complete")),
        );
}

#[test]
fn test_completions_bash() {
    clinic_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("clinic"));
}

#[test]
fn test_invalid_subcommand() {
    let output = clinic_cmd().arg("nonexistent-command").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_output_format() {
    let output = clinic_cmd()
        .args(["--output", "xml", "patients", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("xml"), "Expected the bad value in output:\n{text}");
}

#[test]
fn test_invalid_date_filter() {
    let output = clinic_cmd()
        .args(["reports", "appointments", "--when", "next_year"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("this_week"), "Got:\n{text}");
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_no_config_is_reported() {
    let output = clinic_cmd()
        .env("CLINIC_CONFIG", "/tmp/clinic-cli-test-nonexistent/config.toml")
        .args(["patients", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("No server configured"), "Got:\n{text}");
}

#[test]
fn test_unknown_profile_is_reported() {
    let ws = Workspace::new("http://127.0.0.1:9");
    let output = ws
        .cmd()
        .args(["--profile", "ward", "patients", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("Profile 'ward' not found"), "Got:\n{text}");
    assert!(text.contains("default"), "Expected available profiles:\n{text}");
}

#[test]
fn test_config_show_redacts_password() {
    let ws = Workspace::new("http://127.0.0.1:9");
    let mut cfg = read_config(&ws.config_path());
    cfg.push_str("password = \"hunter2\"\n");
    std::fs::write(ws.config_path(), cfg).unwrap();

    let output = ws.cmd().args(["config", "show"]).output().unwrap();
    assert!(output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("[profiles.default]"), "Got:\n{text}");
    assert!(text.contains("password = \"****\""), "Got:\n{text}");
    assert!(!text.contains("hunter2"), "Password leaked:\n{text}");
}

#[test]
fn test_config_set_persists_values() {
    let ws = Workspace::new("http://127.0.0.1:9");
    ws.cmd()
        .args(["config", "set", "timeout", "45"])
        .assert()
        .success();
    ws.cmd()
        .args(["config", "set", "stale_time", "120"])
        .assert()
        .success();

    let cfg = read_config(&ws.config_path());
    assert!(cfg.contains("timeout = 45"), "Got:\n{cfg}");
    assert!(cfg.contains("stale_time = 120"), "Got:\n{cfg}");
}

#[test]
fn test_config_set_rejects_invalid_server() {
    let ws = Workspace::new("http://127.0.0.1:9");
    let output = ws
        .cmd()
        .args(["config", "set", "server", "not a url"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(read_config(&ws.config_path()).contains("http://127.0.0.1:9"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let ws = Workspace::new("http://127.0.0.1:9");
    let output = ws
        .cmd()
        .args(["config", "set", "colour", "red"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("unknown config key"));
}

#[test]
fn test_config_use_switches_default_profile() {
    let ws = Workspace::new("http://127.0.0.1:9");
    let mut cfg = read_config(&ws.config_path());
    cfg.push_str("\n[profiles.ward]\nserver = \"http://127.0.0.1:10\"\n");
    std::fs::write(ws.config_path(), cfg).unwrap();

    ws.cmd().args(["config", "use", "ward"]).assert().success();
    ws.cmd()
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ward *"));

    let output = ws.cmd().args(["config", "use", "icu"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

// ── Session ─────────────────────────────────────────────────────────

#[test]
fn test_commands_require_a_session() {
    let ws = Workspace::new("http://127.0.0.1:9");
    let output = ws.cmd().args(["patients", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("Not signed in"), "Got:\n{text}");
    assert!(text.contains("clinic login --profile default"), "Got:\n{text}");
}

#[tokio::test]
async fn test_login_stores_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/create/"))
        .and(body_json(json!({ "email": "doc@clinic.test", "password": "s3cret" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access": "a1", "refresh": "r1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    let mut cmd = ws.cmd();
    cmd.env("CLINIC_PASSWORD", "s3cret").arg("login");
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Signed in as doc@clinic.test"));
    let session = ws.stored_session().unwrap();
    assert_eq!(session["access_token"], "a1");
    assert_eq!(session["refresh_token"], "r1");
}

#[tokio::test]
async fn test_login_with_bad_password_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/create/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    let mut cmd = ws.cmd();
    cmd.env("CLINIC_PASSWORD", "wrong").arg("login");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("No active account found"), "Got:\n{text}");
    assert!(ws.stored_session().is_none());
}

#[test]
fn test_logout_clears_the_session() {
    let ws = Workspace::new("http://127.0.0.1:9");
    ws.sign_in("a1", "r1");
    ws.cmd().arg("logout").assert().success();
    assert!(ws.stored_session().is_none());
}

#[tokio::test]
async fn test_expired_session_is_refreshed_and_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/specializations/"))
        .and(header("authorization", "JWT old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .and(body_json(json!({ "refresh": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/specializations/"))
        .and(header("authorization", "JWT new"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(json!([{ "id": 1, "name": "Cardiology" }]), 1)),
        )
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("old", "r1");
    let mut cmd = ws.cmd();
    cmd.args(["-o", "plain", "specializations", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1");
    assert_eq!(ws.stored_session().unwrap()["access_token"], "new");
}

#[tokio::test]
async fn test_failed_refresh_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/specializations/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "Token is invalid or expired" })),
        )
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("old", "stale");
    let mut cmd = ws.cmd();
    cmd.args(["specializations", "list"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Not signed in"));
    assert!(ws.stored_session().is_none());
}

// ── Resources ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_as_json_sends_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/specializations/"))
        .and(header("authorization", "JWT a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                { "id": 1, "name": "Cardiology" },
                { "id": 2, "name": "Dermatology" }
            ]),
            2,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let mut cmd = ws.cmd();
    cmd.args(["-o", "json", "specializations", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[1]["name"], "Dermatology");
}

#[tokio::test]
async fn test_table_output_has_page_footer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/patients/patients/"))
        .and(query_param("page", "2"))
        .and(query_param("search", "ann"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": 7, "first_name": "Ann", "last_name": "Lee" }],
            "count": 21,
            "next": "http://x/api/patients/patients/?page=3",
            "previous": "http://x/api/patients/patients/?page=1"
        })))
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let mut cmd = ws.cmd();
    cmd.args(["patients", "list", "--page", "2", "--search", "ann"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ann"), "Got:\n{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 of 21 shown, more available"), "Got:\n{stderr}");
}

#[tokio::test]
async fn test_missing_record_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/patients/patients/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let mut cmd = ws.cmd();
    cmd.args(["patients", "get", "99"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    let text = combined_output(&output);
    assert!(text.contains("patient '99' not found"), "Got:\n{text}");
    assert!(text.contains("clinic patients list"), "Got:\n{text}");
}

#[tokio::test]
async fn test_forbidden_exits_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/medications/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "You do not have permission to perform this action."
        })))
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let mut cmd = ws.cmd();
    cmd.args(["medications", "list"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(5));
    assert!(combined_output(&output).contains("do not have permission"));
}

#[test]
fn test_destructive_command_needs_confirmation() {
    let ws = Workspace::new("http://127.0.0.1:9");
    ws.sign_in("a1", "r1");
    let output = ws
        .cmd()
        .args(["appointments", "delete", "5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test]
async fn test_confirmed_cancel_posts_the_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/appointments/5/cancel/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 5, "status": "cancelled" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let mut cmd = ws.cmd();
    cmd.args(["--yes", "appointments", "cancel", "5"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test]
async fn test_create_from_file_posts_the_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/medications/"))
        .and(body_json(json!({ "name": "Amoxicillin", "dosage_form": "capsule" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": 3, "name": "Amoxicillin" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let payload = ws.dir.path().join("med.json");
    std::fs::write(&payload, r#"{ "name": "Amoxicillin", "dosage_form": "capsule" }"#).unwrap();

    let mut cmd = ws.cmd();
    cmd.args(["medications", "create", "--from-file"]).arg(&payload);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
}

#[test]
fn test_create_with_malformed_payload_fails_before_sending() {
    let ws = Workspace::new("http://127.0.0.1:9");
    ws.sign_in("a1", "r1");
    let payload = ws.dir.path().join("bad.json");
    std::fs::write(&payload, "{ not json").unwrap();

    let output = ws
        .cmd()
        .args(["medications", "create", "--from-file"])
        .arg(&payload)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("invalid JSON"));
}

// ── Dashboard ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_stats_aggregates_the_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/appointments/"))
        .and(query_param_is_missing("status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                { "id": 1, "doctor": { "id": 1 }, "patient": { "id": 10 } },
                { "id": 2, "doctor": { "id": 2 }, "patient": { "id": 11 } }
            ]),
            2,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/appointments/"))
        .and(query_param("status", "in_queue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([{ "id": 2 }]), 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/doctorsList/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/patients/patients/statistics/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let mut cmd = ws.cmd();
    cmd.args(["-o", "json", "stats"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        stats,
        json!({
            "today_check_ins": 2,
            "waiting_patients": 1,
            "available_doctors": 1,
            "new_registrations": 2
        })
    );
}

#[tokio::test]
async fn test_stats_surfaces_the_first_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/appointments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([]), 0)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/doctorsList/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "detail": "forbidden" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/patients/patients/statistics/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let mut cmd = ws.cmd();
    cmd.arg("stats");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(5));
}

// ── CSV ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_as_csv_uses_table_columns() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/specializations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": 1, "name": "Cardiology", "description": "Heart, vessels" }]),
            1,
        )))
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let mut cmd = ws.cmd();
    cmd.args(["-o", "csv", "specializations", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "ID,Name,Description\n1,Cardiology,\"Heart, vessels\"\n");
}

#[tokio::test]
async fn test_report_appointments_export_writes_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/appointments/"))
        .and(query_param("page_size", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{
                "appointment_id": "APT-7",
                "patient": { "first_name": "Ann", "last_name": "Lee" },
                "doctor": { "first_name": "Sam", "last_name": "Ng", "specialization": "ENT" },
                "status": "completed",
                "appointment_date": "2025-04-16",
                "appointment_time": "10:00:00"
            }]),
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let target = ws.dir.path().join("out").join("appointments_report.csv");
    let mut cmd = ws.cmd();
    cmd.args(["reports", "appointments", "--export"]).arg(&target);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(output.stdout.is_empty());
    let csv = std::fs::read_to_string(&target).unwrap();
    assert_eq!(
        csv,
        "Appointment ID,Patient Name,Doctor,Specialization,Status,Date,Time\n\
         APT-7,Ann Lee,Sam Ng,ENT,completed,2025-04-16,10:00:00\n"
    );
}

#[tokio::test]
async fn test_report_demographics_export_writes_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/patients-analysis/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ageDistribution": [{ "name": "21-30", "count": 5 }],
            "genderRatio": [{ "name": "Male", "value": 3 }, { "name": "Female", "value": 2 }],
            "topConditions": [],
            "patientGrowth": { "new": 0, "growthRate": 0, "total": 5 }
        })))
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let target = ws.dir.path().join("patient_demographics.csv");
    let mut cmd = ws.cmd();
    cmd.args(["reports", "patients", "--export"]).arg(&target);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let csv = std::fs::read_to_string(&target).unwrap();
    assert_eq!(csv, "Category,Label,Count\nAge,21-30,5\nGender,Male,3\nGender,Female,2\n");
}

// ── Account ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_avatar_sends_the_file() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/auth/users/me/"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "avatar": "/m/a.jpg" })))
        .expect(1)
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let image = ws.dir.path().join("portrait.jpg");
    std::fs::write(&image, b"jpeg bytes").unwrap();
    let mut cmd = ws.cmd();
    cmd.args(["account", "upload-avatar"]).arg(&image);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&received[0].body).to_string();
    assert!(body.contains(r#"name="avatar"; filename="portrait.jpg""#), "got: {body}");
    assert!(body.contains("jpeg bytes"), "got: {body}");
}

#[test]
fn test_profile_update_needs_fields_or_files() {
    let output = clinic_cmd().args(["account", "update"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let output = clinic_cmd()
        .args(["account", "update", "--attach", "avatar"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("FIELD=PATH"));
}

#[tokio::test]
async fn test_account_delete_sends_no_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/auth/users/me/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let ws = Workspace::new(&server.uri());
    ws.sign_in("a1", "r1");
    let mut cmd = ws.cmd();
    cmd.args(["--yes", "account", "delete"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let received = server.received_requests().await.unwrap();
    assert!(received[0].body.is_empty());
    assert!(ws.stored_session().is_none());
}
