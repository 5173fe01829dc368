//! End-to-end behaviour of the users API over the in-memory repository.
//!
//! Requests flow through the real middleware, handlers, and domain service;
//! only storage and the clock are substituted.
use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use user_age_api::RequestId;
use user_age_api::domain::UserService;
use user_age_api::inbound::http::api_scope;
use user_age_api::inbound::http::state::HttpState;
use user_age_api::test_support::{FixedClock, InMemoryUserRepository};

#[fixture]
fn repository() -> Arc<InMemoryUserRepository> {
    Arc::new(InMemoryUserRepository::default())
}

/// Clock pinned the day before Alice's 35th birthday.
#[fixture]
fn clock() -> FixedClock {
    FixedClock(
        Utc.with_ymd_and_hms(2025, 5, 9, 23, 30, 0)
            .single()
            .expect("valid instant"),
    )
}

async fn app(
    repository: Arc<InMemoryUserRepository>,
    clock: FixedClock,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let service = Arc::new(UserService::new(repository, Arc::new(clock)));
    let state = HttpState::new(service.clone(), service);
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(RequestId)
            .service(api_scope()),
    )
    .await
}

async fn create(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    name: &str,
    dob: &str,
) -> Value {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({"name": name, "dob": dob}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    test::read_body_json(res).await
}

fn id_of(user: &Value) -> i64 {
    user.get("id").and_then(Value::as_i64).expect("numeric id")
}

#[rstest]
#[actix_web::test]
async fn created_user_round_trips_with_age(
    repository: Arc<InMemoryUserRepository>,
    clock: FixedClock,
) {
    let app = app(repository, clock).await;

    let created = create(&app, "Alice", "1990-05-10").await;
    let id = id_of(&created);

    let fetched: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/users/{id}"))
            .to_request(),
    )
    .await;

    assert_eq!(
        fetched,
        json!({"id": id, "name": "Alice", "dob": "1990-05-10", "age": 34})
    );
}

#[rstest]
#[case(json!({"name": "Alice", "dob": "not-a-date"}), "dob must be YYYY-MM-DD")]
#[case(json!({"dob": "1990-05-10"}), "missing required field: name")]
#[case(json!({"name": "Alice", "dob": "+1990-05-10"}), "dob must be YYYY-MM-DD")]
#[case(json!({"name": "Alice", "dob": "1990-05-1"}), "dob must be YYYY-MM-DD")]
#[actix_web::test]
async fn invalid_create_is_bad_request(
    repository: Arc<InMemoryUserRepository>,
    clock: FixedClock,
    #[case] body: Value,
    #[case] message: &str,
) {
    let app = app(repository, clock).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload: Value = test::read_body_json(res).await;
    assert_eq!(payload.get("message").and_then(Value::as_str), Some(message));
}

#[rstest]
#[actix_web::test]
async fn whitespace_only_name_is_stored_verbatim(
    repository: Arc<InMemoryUserRepository>,
    clock: FixedClock,
) {
    let app = app(repository, clock).await;

    let created = create(&app, "   ", "1990-05-10").await;
    let id = id_of(&created);

    let fetched: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/users/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(fetched.get("name").and_then(Value::as_str), Some("   "));
}

#[rstest]
#[actix_web::test]
async fn update_of_unknown_user_does_not_create_it(
    repository: Arc<InMemoryUserRepository>,
    clock: FixedClock,
) {
    let app = app(repository, clock).await;

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/users/41")
            .set_json(json!({"name": "Bob", "dob": "1980-01-01"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let listed: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/users").to_request())
            .await;
    assert_eq!(listed, json!([]));
}

#[rstest]
#[actix_web::test]
async fn update_replaces_name_and_dob(
    repository: Arc<InMemoryUserRepository>,
    clock: FixedClock,
) {
    let app = app(repository, clock).await;
    let id = id_of(&create(&app, "Alice", "1990-05-10").await);

    let updated: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/users/{id}"))
            .set_json(json!({"name": "Alicia", "dob": "1991-01-01"}))
            .to_request(),
    )
    .await;

    assert_eq!(
        updated,
        json!({"id": id, "name": "Alicia", "dob": "1991-01-01"})
    );
}

#[rstest]
#[actix_web::test]
async fn deleting_twice_yields_not_found(
    repository: Arc<InMemoryUserRepository>,
    clock: FixedClock,
) {
    let app = app(repository, clock).await;
    let id = id_of(&create(&app, "Alice", "1990-05-10").await);
    let uri = format!("/api/users/{id}");

    let first = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(first.status(), StatusCode::NO_CONTENT);

    for _ in 0..2 {
        let again =
            test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    let fetched = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(fetched.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case("/api/users?limit=0&offset=0", 0)]
#[case("/api/users?offset=3", 0)]
#[case("/api/users?offset=50", 0)]
#[case("/api/users?limit=2", 2)]
#[case("/api/users?limit=two&offset=1", 2)]
#[case("/api/users", 3)]
#[actix_web::test]
async fn list_paginates_in_id_order(
    repository: Arc<InMemoryUserRepository>,
    clock: FixedClock,
    #[case] uri: &str,
    #[case] expected_len: usize,
) {
    let app = app(repository, clock).await;
    for (name, dob) in [
        ("Alice", "1990-05-10"),
        ("Bob", "1985-12-31"),
        ("Carol", "2030-01-01"),
    ] {
        create(&app, name, dob).await;
    }

    let listed: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let rows = listed.as_array().expect("array");

    assert_eq!(rows.len(), expected_len);
    let ids: Vec<i64> = rows.iter().map(id_of).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[rstest]
#[actix_web::test]
async fn list_ages_every_row_against_the_same_day(
    repository: Arc<InMemoryUserRepository>,
    clock: FixedClock,
) {
    let app = app(repository, clock).await;
    create(&app, "Alice", "1990-05-10").await;
    create(&app, "Future", "2030-01-01").await;

    let listed: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/users").to_request())
            .await;
    let ages: Vec<u64> = listed
        .as_array()
        .expect("array")
        .iter()
        .map(|row| row.get("age").and_then(Value::as_u64).expect("age"))
        .collect();

    assert_eq!(ages, vec![34, 0]);
}

#[rstest]
#[actix_web::test]
async fn storage_failure_is_generic_internal_error(
    repository: Arc<InMemoryUserRepository>,
    clock: FixedClock,
) {
    let app = app(repository.clone(), clock).await;
    repository.set_unavailable(true);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/users")
            .insert_header(("x-request-id", "list-failure-1"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("list-failure-1")
    );
    let payload: Value = test::read_body_json(res).await;
    assert_eq!(
        payload,
        json!({
            "code": "internal_error",
            "message": "Failed to list users",
            "traceId": "list-failure-1"
        })
    );
}

#[rstest]
#[actix_web::test]
async fn negative_limit_surfaces_as_internal_error(
    repository: Arc<InMemoryUserRepository>,
    clock: FixedClock,
) {
    let app = app(repository, clock).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/users?limit=-1")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
