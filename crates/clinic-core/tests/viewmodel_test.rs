#![allow(clippy::unwrap_used)]
// View-model tests against a wiremock backend.

use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clinic_api::{ApiClient, Attachment, ListParams, Session};
use clinic_core::{CacheConfig, Clinic, DashboardStats};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(stale_time: Duration) -> (MockServer, Clinic) {
    let server = MockServer::start().await;
    let api = ApiClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        Session::in_memory(),
    );
    let clinic = Clinic::with_api(
        api,
        CacheConfig {
            stale_time,
            ..CacheConfig::default()
        },
    );
    (server, clinic)
}

fn page(results: serde_json::Value, count: u64) -> serde_json::Value {
    json!({ "results": results, "count": count, "next": null, "previous": null })
}

fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 16).unwrap()
}

// ── Queries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_patient_list_is_fetched_once_for_identical_keys() {
    let (server, clinic) = setup(Duration::from_secs(60)).await;

    Mock::given(method("GET"))
        .and(path("/api/patients/patients/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([{ "id": 1 }]), 1)))
        .expect(1)
        .mount(&server)
        .await;

    let patients = clinic.patients();
    let a = patients.list(&ListParams::page(1));
    let b = patients.list(&ListParams::page(1));
    assert_eq!(a.key(), b.key());

    let (first, second) = tokio::join!(a.fetch(), b.fetch());
    assert_eq!(first.unwrap().count, 1);
    assert_eq!(second.unwrap().count, 1);

    // Fresh: served from cache.
    let again = a.fetch().await.unwrap();
    assert_eq!(again.results[0]["id"], 1);
}

#[tokio::test]
async fn test_empty_page_is_data_not_loading() {
    let (server, clinic) = setup(Duration::ZERO).await;

    Mock::given(method("GET"))
        .and(path("/api/lab-results/4/patient-results/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut observer = clinic.lab_results().list(4).observe();
    let state = observer.settled().await;
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert!(state.data.unwrap().is_empty());
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_medication_refreshes_observed_list() {
    let (server, clinic) = setup(Duration::from_secs(60)).await;

    Mock::given(method("GET"))
        .and(path("/api/medications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([{ "id": 1 }]), 1)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/medications/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(json!([{ "id": 1 }, { "id": 2 }]), 2)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/medications/"))
        .and(body_json(json!({ "name": "Amoxicillin" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": 2, "name": "Amoxicillin" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let medications = clinic.medications();
    let mut observer = medications.list(&ListParams::page(1)).observe();
    assert_eq!(observer.settled().await.data.unwrap().count, 1);

    let create = medications.create();
    let created = create
        .mutate(json!({ "name": "Amoxicillin" }))
        .await
        .unwrap();
    assert_eq!(created["id"], 2);
    assert!(!create.is_pending());

    let state = observer.settled().await;
    assert_eq!(state.data.unwrap().count, 2);
}

#[tokio::test]
async fn test_avatar_upload_refreshes_the_observed_account() {
    let (server, clinic) = setup(Duration::from_secs(60)).await;

    Mock::given(method("GET"))
        .and(path("/api/auth/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "avatar": null })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "avatar": "/m/a.png" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/auth/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "avatar": "/m/a.png" })))
        .expect(1)
        .mount(&server)
        .await;

    let account = clinic.account();
    let mut observer = account.current_user().observe();
    assert!(observer.settled().await.data.unwrap()["avatar"].is_null());

    let avatar = Attachment::new("a.png", vec![1, 2, 3]);
    account.upload_avatar().mutate(avatar).await.unwrap();

    let state = observer.settled().await;
    assert_eq!(state.data.unwrap()["avatar"], "/m/a.png");
}

#[tokio::test]
async fn test_failed_mutation_leaves_cache_untouched() {
    let (server, clinic) = setup(Duration::from_secs(60)).await;

    Mock::given(method("GET"))
        .and(path("/api/appointments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([{ "id": 5 }]), 1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/appointments/5/cancel/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "Already completed." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let appointments = clinic.appointments();
    let mut observer = appointments.list(&Default::default()).observe();
    observer.settled().await;

    let err = appointments.cancel().mutate(5).await.unwrap_err();
    assert_eq!(err.detail(), Some("Already completed."));

    let state = observer.settled().await;
    assert!(!state.is_fetching);
    assert_eq!(state.data.unwrap().count, 1);
}

// ── Dashboard ───────────────────────────────────────────────────────

async fn mount_dashboard(
    server: &MockServer,
    doctors: ResponseTemplate,
    statistics: ResponseTemplate,
) {
    Mock::given(method("GET"))
        .and(path("/api/appointments/"))
        .and(query_param("appointment_date", "2025-04-16"))
        .and(query_param_is_missing("status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                { "id": 1, "doctor": { "id": 1 }, "patient": { "id": 10 } },
                { "id": 2, "doctor": { "id": 2 }, "patient": { "id": 11 } },
                { "id": 3, "doctor": { "id": 2 }, "patient": { "id": 12 } }
            ]),
            3,
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/appointments/"))
        .and(query_param("appointment_date", "2025-04-16"))
        .and(query_param("status", "in_queue"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(json!([{ "id": 2 }]), 1)),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/doctorsList/"))
        .respond_with(doctors)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/patients/patients/statistics/"))
        .respond_with(statistics)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_dashboard_aggregates_four_queries() {
    let (server, clinic) = setup(Duration::ZERO).await;
    mount_dashboard(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }, { "id": 4 }])),
        ResponseTemplate::new(200).set_body_json(json!({})),
    )
    .await;

    let state = clinic.stats().dashboard_on(wednesday()).fetch().await;
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert_eq!(
        state.stats,
        DashboardStats {
            today_check_ins: 3,
            waiting_patients: 1,
            available_doctors: 2,
            new_registrations: 3,
        }
    );
}

#[tokio::test]
async fn test_dashboard_reports_first_error_in_order() {
    let (server, clinic) = setup(Duration::ZERO).await;
    mount_dashboard(
        &server,
        ResponseTemplate::new(403).set_body_json(json!({ "detail": "forbidden" })),
        ResponseTemplate::new(500),
    )
    .await;

    let mut observer = clinic.stats().dashboard_on(wednesday()).observe();
    let state = observer.settled().await;
    assert!(!state.is_loading);
    assert_eq!(state.error.unwrap().status(), Some(403));
    // Constituents that succeeded still contribute.
    assert_eq!(state.stats.today_check_ins, 3);
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_logout_clears_credentials_and_cache() {
    let (server, clinic) = setup(Duration::from_secs(60)).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/create/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access": "a1", "refresh": "r1" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users/me/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "email": "doc@clinic.test" })),
        )
        .mount(&server)
        .await;

    let password = secrecy::SecretString::from("hunter2".to_owned());
    clinic.login("doc@clinic.test", &password).await.unwrap();
    assert!(clinic.is_authenticated());

    clinic.account().current_user().fetch().await.unwrap();
    assert!(!clinic.cache().is_empty());

    clinic.logout();
    assert!(!clinic.is_authenticated());
    assert!(clinic.cache().is_empty());
}
