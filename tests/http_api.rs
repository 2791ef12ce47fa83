//! HTTP-level tests against the in-memory stores.

use std::net::SocketAddr;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};

use worklog::auth::jwt::generate_access_token;
use worklog::config::Config;
use worklog::models::Claims;
use worklog::routes::AppServices;
use worklog::store::{self, DEMO_COMPANY_ID, DEMO_COMPANY_NAME, DEMO_LOGIN_ID, DEMO_PASSWORD};

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn token_for(company_id: &str) -> String {
    let config = Config::default();
    generate_access_token(company_id, DEMO_COMPANY_NAME, &config.jwt_secret, 3600).unwrap()
}

fn authed(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.peer_addr(peer())
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
}

fn entry(name: &str, date: &str, start: &str, end: &str) -> Value {
    json!({
        "name": name,
        "date": date,
        "site_name": "品川現場",
        "work_description": "内装工事",
        "start_time": start,
        "end_time": end
    })
}

macro_rules! app {
    () => {{
        let (services, memory) = AppServices::in_memory(Config::default());
        store::seed_demo_account(memory.as_ref()).await.unwrap();
        test::init_service(App::new().configure(|cfg| services.configure(cfg))).await
    }};
}

macro_rules! create {
    ($app:expr, $token:expr, $body:expr) => {{
        let req = authed(test::TestRequest::post().uri("/entries"), $token)
            .set_json($body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

macro_rules! list {
    ($app:expr, $token:expr) => {{
        let req = authed(test::TestRequest::get().uri("/entries"), $token).to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body.as_array().unwrap().clone()
    }};
}

#[actix_web::test]
async fn create_derives_weekday_and_hours() {
    let app = app!();
    let token = token_for(DEMO_COMPANY_ID);

    let created = create!(app, &token, entry(" サトウ ", "2024-06-05", "9:00", "18:00"));

    assert_eq!(created["name"], "サトウ");
    assert_eq!(created["day_of_week"], "水");
    assert_eq!(created["start_time"], "09:00");
    assert_eq!(created["total_hours"], "7時間00分");
    assert_eq!(created["company_id"], DEMO_COMPANY_ID);
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[actix_web::test]
async fn create_names_every_missing_field() {
    let app = app!();
    let token = token_for(DEMO_COMPANY_ID);

    let req = authed(test::TestRequest::post().uri("/entries"), &token)
        .set_json(json!({ "name": "", "date": "2024-06-05", "site_name": "  ",
                          "work_description": "x", "start_time": "09:00", "end_time": "18:00" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "validation");
    assert_eq!(body["error"], "missing required fields: name, site_name");
    assert!(list!(app, &token).is_empty());
}

#[actix_web::test]
async fn create_rejects_end_not_after_start() {
    let app = app!();
    let token = token_for(DEMO_COMPANY_ID);

    for (start, end) in [("18:00", "09:00"), ("09:00", "09:00")] {
        let req = authed(test::TestRequest::post().uri("/entries"), &token)
            .set_json(entry("サトウ", "2024-06-05", start, end))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
    assert!(list!(app, &token).is_empty());
}

#[actix_web::test]
async fn list_is_date_ordered_and_account_scoped() {
    let app = app!();
    let token = token_for(DEMO_COMPANY_ID);

    create!(app, &token, entry("A", "2024-06-07", "09:00", "18:00"));
    create!(app, &token, entry("B", "2024-06-03", "13:00", "18:00"));
    create!(app, &token, entry("C", "2024-06-03", "08:00", "12:00"));

    let names: Vec<_> = list!(app, &token)
        .iter()
        .map(|e| e["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["C", "B", "A"]);

    let other = token_for("other-company");
    assert!(list!(app, &other).is_empty());
}

#[actix_web::test]
async fn update_changes_only_supplied_fields() {
    let app = app!();
    let token = token_for(DEMO_COMPANY_ID);
    let created = create!(app, &token, entry("サトウ", "2024-06-05", "09:00", "18:00"));
    let id = created["id"].as_str().unwrap();

    let req = authed(test::TestRequest::put().uri(&format!("/entries/{id}")), &token)
        .set_json(json!({ "site_name": "新宿現場", "date": "2024-06-09", "end_time": null }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(updated["site_name"], "新宿現場");
    assert_eq!(updated["date"], "2024-06-09");
    assert_eq!(updated["end_time"], "18:00");
    // derived labels are not recomputed
    assert_eq!(updated["day_of_week"], "水");
    assert_eq!(updated["total_hours"], "7時間00分");
}

#[actix_web::test]
async fn update_keeps_entry_invariants() {
    let app = app!();
    let token = token_for(DEMO_COMPANY_ID);
    let created = create!(app, &token, entry("サトウ", "2024-06-05", "09:00", "18:00"));
    let id = created["id"].as_str().unwrap();

    let rejected = [
        json!({ "name": "   ", "site_name": "" }),
        json!({ "work_description": "" }),
        json!({ "start_time": "18:00", "end_time": "09:00" }),
        json!({ "end_time": "08:30" }),
        json!({ "start_time": "18:00" }),
    ];
    for body in rejected {
        let req = authed(test::TestRequest::put().uri(&format!("/entries/{id}")), &token)
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "validation");
    }

    let stored = list!(app, &token);
    assert_eq!(stored[0]["name"], "サトウ");
    assert_eq!(stored[0]["site_name"], "品川現場");
    assert_eq!(stored[0]["start_time"], "09:00");
    assert_eq!(stored[0]["end_time"], "18:00");

    let req = authed(test::TestRequest::get().uri("/entries/names"), &token).to_request();
    let names: Vec<String> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names, ["サトウ"]);

    // free text is trimmed like on create
    let req = authed(test::TestRequest::put().uri(&format!("/entries/{id}")), &token)
        .set_json(json!({ "name": " スズキ " }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["name"], "スズキ");
}

#[actix_web::test]
async fn update_reports_not_found_before_empty() {
    let app = app!();
    let token = token_for(DEMO_COMPANY_ID);
    let created = create!(app, &token, entry("サトウ", "2024-06-05", "09:00", "18:00"));
    let id = created["id"].as_str().unwrap();

    let cases = [
        ("missing-id".to_string(), json!({ "name": "X" }), StatusCode::NOT_FOUND, "not_found"),
        ("missing-id".to_string(), json!({}), StatusCode::NOT_FOUND, "not_found"),
        ("missing-id".to_string(), json!({ "company_id": "x" }), StatusCode::NOT_FOUND, "not_found"),
        ("missing-id".to_string(), json!({ "name": " " }), StatusCode::NOT_FOUND, "not_found"),
        (id.to_string(), json!({}), StatusCode::BAD_REQUEST, "empty_update"),
        (id.to_string(), json!({ "company_id": "x" }), StatusCode::BAD_REQUEST, "validation"),
    ];

    for (target, body, status, code) in cases {
        let req = authed(test::TestRequest::put().uri(&format!("/entries/{target}")), &token)
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], code);
    }

    // foreign accounts cannot see the entry
    let other = token_for("other-company");
    let req = authed(test::TestRequest::put().uri(&format!("/entries/{id}")), &other)
        .set_json(json!({ "name": "X" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_missing_entry_leaves_list_unchanged() {
    let app = app!();
    let token = token_for(DEMO_COMPANY_ID);
    let created = create!(app, &token, entry("サトウ", "2024-06-05", "09:00", "18:00"));

    let req = authed(test::TestRequest::delete().uri("/entries/missing-id"), &token).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(list!(app, &token).len(), 1);

    let id = created["id"].as_str().unwrap();
    let req = authed(test::TestRequest::delete().uri(&format!("/entries/{id}")), &token).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Successfully deleted");
    assert!(list!(app, &token).is_empty());
}

#[actix_web::test]
async fn names_are_distinct_and_sorted() {
    let app = app!();
    let token = token_for(DEMO_COMPANY_ID);

    create!(app, &token, entry("サトウ", "2024-06-05", "09:00", "18:00"));
    create!(app, &token, entry("アオキ", "2024-06-06", "09:00", "18:00"));
    create!(app, &token, entry("サトウ", "2024-06-07", "09:00", "18:00"));

    let req = authed(test::TestRequest::get().uri("/entries/names"), &token).to_request();
    let names: Vec<String> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names, ["アオキ", "サトウ"]);

    // cache is dropped when a new name arrives
    create!(app, &token, entry("イトウ", "2024-06-08", "09:00", "18:00"));
    let req = authed(test::TestRequest::get().uri("/entries/names"), &token).to_request();
    let names: Vec<String> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(names, ["アオキ", "イトウ", "サトウ"]);
}

#[actix_web::test]
async fn monthly_export_groups_by_name_then_date() {
    let app = app!();
    let token = token_for(DEMO_COMPANY_ID);

    create!(app, &token, entry("サトウ", "2024-06-02", "09:00", "18:00"));
    create!(app, &token, entry("アオキ", "2024-06-05", "09:00", "18:00"));
    create!(app, &token, entry("アオキ", "2024-06-01", "09:00", "18:00"));
    create!(app, &token, entry("アオキ", "2024-05-31", "09:00", "18:00"));

    let req = authed(
        test::TestRequest::get().uri("/entries/export?scope=monthly&month=2024-06"),
        &token,
    )
    .to_request();
    let sheet: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(sheet["filename"], "出勤記録_月別_2024-06.xlsx");
    assert_eq!(sheet["sheet_name"], "出勤記録");
    let rows: Vec<(String, String)> = sheet["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| (r["名前"].as_str().unwrap().into(), r["日付"].as_str().unwrap().into()))
        .collect();
    assert_eq!(
        rows,
        [
            ("アオキ".to_string(), "2024-06-01".to_string()),
            ("アオキ".to_string(), "2024-06-05".to_string()),
            ("サトウ".to_string(), "2024-06-02".to_string()),
        ]
    );

    let req = authed(test::TestRequest::get().uri("/entries/export?scope=monthly"), &token)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = authed(
        test::TestRequest::get().uri("/entries/export?scope=yearly&year=2023"),
        &token,
    )
    .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn periods_list_newest_first() {
    let app = app!();
    let token = token_for(DEMO_COMPANY_ID);

    create!(app, &token, entry("A", "2023-12-20", "09:00", "18:00"));
    create!(app, &token, entry("A", "2024-06-02", "09:00", "18:00"));
    create!(app, &token, entry("A", "2024-06-20", "09:00", "18:00"));

    let req = authed(test::TestRequest::get().uri("/entries/periods"), &token).to_request();
    let periods: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(periods["months"], json!(["2024-06", "2023-12"]));
    assert_eq!(periods["years"], json!(["2024", "2023"]));
}

#[actix_web::test]
async fn token_failures_are_reported_by_cause() {
    let app = app!();
    let secret = Config::default().jwt_secret;

    let expired = encode(
        &Header::default(),
        &Claims {
            sub: DEMO_COMPANY_ID.into(),
            company_name: DEMO_COMPANY_NAME.into(),
            exp: 1_000_000,
            iat: 999_000,
            jti: "expired".into(),
        },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    let cases = [
        (None, "token_missing"),
        (Some("Token abc".to_string()), "token_not_bearer"),
        (Some(format!("Bearer {expired}")), "token_expired"),
        (Some("Bearer not.a.jwt".to_string()), "token_invalid"),
    ];

    for (value, code) in cases {
        let mut req = test::TestRequest::get().uri("/entries").peer_addr(peer());
        if let Some(value) = value {
            req = req.insert_header((header::AUTHORIZATION, value));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], code);
    }
}

#[actix_web::test]
async fn login_issues_a_usable_token() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "id": DEMO_LOGIN_ID, "pass": DEMO_PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["token"].as_str().unwrap();

    let req = authed(test::TestRequest::get().uri("/auth/account"), token).to_request();
    let account: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(account["company_id"], DEMO_COMPANY_ID);
    assert_eq!(account["company_name"], DEMO_COMPANY_NAME);
    assert!(account.get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "id": DEMO_LOGIN_ID, "pass": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "invalid_credentials");

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "id": " ", "pass": "" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn worktime_helpers() {
    let app = app!();

    let req = test::TestRequest::get().uri("/worktime/options?interval=30").to_request();
    let options: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(options.len(), 48);
    assert_eq!(options[1]["value"], "00:30");

    let req = test::TestRequest::get().uri("/worktime/options?interval=7").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/worktime/duration?start_time=08:30&end_time=17:45")
        .to_request();
    let preview: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(preview["valid"], true);
    assert_eq!(preview["total_hours"], "7時間15分");

    let req = test::TestRequest::get().uri("/health").to_request();
    let health: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["store"], "memory");
}
