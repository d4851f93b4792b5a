//! Router tests against in-memory databases.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use pressline_db::{Database, DbConfig};

use crate::config::ApiConfig;
use crate::routes;
use crate::state::AppState;

fn test_config() -> ApiConfig {
    ApiConfig {
        port: 0,
        database_path: ":memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_access_lifetime_secs: 3600,
        jwt_refresh_lifetime_secs: 86400,
        // Unroutable: no test below should reach the processor
        processor_base_url: "http://127.0.0.1:9".to_string(),
        processor_secret_key: "sk_test".to_string(),
        delivery_fee_cents: 500,
        tax_rate_bps: 1000,
    }
}

async fn test_app() -> (Router, AppState) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let state = AppState::new(test_config(), db);
    (routes::app().with_state(state.clone()), state)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers and logs in an employee, returning the access token.
async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/register",
            None,
            json!({
                "employee_name": "maria",
                "password": "hunter2hunter2",
                "display_name": "Maria",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            json!({ "employee_name": "maria", "password": "hunter2hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(get_request("/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_bad_password() {
    let (app, _state) = test_app().await;
    login(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            json!({ "employee_name": "maria", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(get_request("/api/customers", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_rejects_short_password() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/register",
            None,
            json!({
                "employee_name": "joe",
                "password": "short",
                "display_name": "Joe",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customer_crud_flow() {
    let (app, _state) = test_app().await;
    let token = login(&app).await;

    // Create
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/customers",
            Some(&token),
            json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "phone_number": "512-555-0134",
                "email": "ada@example.com",
                "notes": null,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let customer = body_json(response).await;
    let customer_id = customer["id"].as_i64().unwrap();

    // Search
    let response = app
        .clone()
        .oneshot(get_request("/api/customers/search?q=love", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let hits = body_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);

    // Get
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/customers/{customer_id}"),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/customers/{customer_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["outstanding_tickets"], 0);
}

#[tokio::test]
async fn ticket_composition_and_cash_payment_flow() {
    let (app, state) = test_app().await;
    let token = login(&app).await;

    // Seed catalog directly (catalog management is not an API surface)
    let garment = state.db.catalog().create_garment("Shirt").await.unwrap();
    let variant = state
        .db
        .catalog()
        .create_variant(garment.id, "Long Sleeve", 299)
        .await
        .unwrap();
    let ticket_type = state
        .db
        .catalog()
        .create_ticket_type("Dry Clean", &Default::default())
        .await
        .unwrap();
    let customer = state
        .db
        .customers()
        .create(&pressline_db::repository::customer::NewCustomer {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone_number: "512-555-0134".into(),
            email: None,
            notes: None,
        })
        .await
        .unwrap();

    // Compose a ticket: 3 shirts at $2.99 → $8.97 + 10% tax = $9.87
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tickets",
            Some(&token),
            json!({
                "customer_id": customer.id,
                "tabs": [{
                    "ticket_type_id": ticket_type.id,
                    "pieces": 3,
                    "due_date": "2026-08-15T12:00:00Z",
                    "lines": [{ "garment_variant_id": variant.id, "quantity": 3 }],
                }],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let tickets = body_json(response).await;
    assert_eq!(tickets[0]["total_price_cents"], 987);

    // Balance reflects the new ticket
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/balance?customer_id={}", customer.id),
            Some(&token),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["outstanding_balance_cents"], 987);

    // Cash payment with change
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/payments",
            Some(&token),
            json!({
                "customer_id": customer.id,
                "amount_cents": 987,
                "method": "cash",
                "tendered_cents": 1000,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["applied_cents"], 987);
    assert_eq!(body["change_cents"], 13);
    assert_eq!(body["remainder_cents"], 0);

    // Balance is now clear; a second payment is rejected
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/balance?customer_id={}", customer.id),
            Some(&token),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["outstanding_balance_cents"], 0);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/payments",
            Some(&token),
            json!({
                "customer_id": customer.id,
                "amount_cents": 100,
                "method": "check",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cash_short_tender_rejected() {
    let (app, state) = test_app().await;
    let token = login(&app).await;

    let customer = state
        .db
        .customers()
        .create(&pressline_db::repository::customer::NewCustomer {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone_number: "512-555-0134".into(),
            email: None,
            notes: None,
        })
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/payments",
            Some(&token),
            json!({
                "customer_id": customer.id,
                "amount_cents": 1000,
                "method": "cash",
                "tendered_cents": 500,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_ticket_rejected() {
    let (app, state) = test_app().await;
    let token = login(&app).await;

    let ticket_type = state
        .db
        .catalog()
        .create_ticket_type("Dry Clean", &Default::default())
        .await
        .unwrap();
    let customer = state
        .db
        .customers()
        .create(&pressline_db::repository::customer::NewCustomer {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone_number: "512-555-0134".into(),
            email: None,
            notes: None,
        })
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tickets",
            Some(&token),
            json!({
                "customer_id": customer.id,
                "tabs": [{
                    "ticket_type_id": ticket_type.id,
                    "due_date": "2026-08-15T12:00:00Z",
                    "lines": [],
                }],
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quick_ticket_convert_is_one_shot() {
    let (app, state) = test_app().await;
    let token = login(&app).await;

    let ticket_type = state
        .db
        .catalog()
        .create_ticket_type("Wash & Fold", &Default::default())
        .await
        .unwrap();
    let customer = state
        .db
        .customers()
        .create(&pressline_db::repository::customer::NewCustomer {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone_number: "512-555-0134".into(),
            email: None,
            notes: None,
        })
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/quick-tickets",
            Some(&token),
            json!({
                "customer_id": customer.id,
                "all_notes": "rush",
                "slots": [
                    { "ticket_type_id": ticket_type.id, "pieces": 5,
                      "due_date": "2026-08-15T12:00:00Z", "notes": null },
                    { "ticket_type_id": ticket_type.id, "pieces": 2,
                      "due_date": "2026-08-16T12:00:00Z", "notes": "delicates" },
                ],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let quick_id = created["id"].as_i64().unwrap();

    // Listed as outstanding
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/quick-tickets?customer_id={}", customer.id),
            Some(&token),
        ))
        .await
        .unwrap();
    let outstanding = body_json(response).await;
    assert_eq!(outstanding.as_array().unwrap().len(), 1);

    // Convert once
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/quick-tickets/{quick_id}/convert"),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["slots"].as_array().unwrap().len(), 2);

    // Gone from outstanding, second conversion conflicts
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/quick-tickets?customer_id={}", customer.id),
            Some(&token),
        ))
        .await
        .unwrap();
    let outstanding = body_json(response).await;
    assert!(outstanding.as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/quick-tickets/{quick_id}/convert"),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn card_default_invariant_over_http() {
    let (app, state) = test_app().await;
    let token = login(&app).await;

    let customer = state
        .db
        .customers()
        .create(&pressline_db::repository::customer::NewCustomer {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone_number: "512-555-0134".into(),
            email: None,
            notes: None,
        })
        .await
        .unwrap();

    for (last4, default) in [("1111", true), ("2222", true)] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/credit-cards",
                Some(&token),
                json!({
                    "customer_id": customer.id,
                    "processor_token": format!("pm_{last4}"),
                    "brand": "visa",
                    "card_last_4": last4,
                    "exp_month": 12,
                    "exp_year": 2030,
                    "set_as_default": default,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/credit-cards?customer_id={}", customer.id),
            Some(&token),
        ))
        .await
        .unwrap();
    let cards = body_json(response).await;
    let defaults: Vec<_> = cards
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["is_default"] == true)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0]["card_last_4"], "2222");
    // Processor tokens never serialize out
    assert!(defaults[0].get("processor_token").is_none());
}

#[tokio::test]
async fn employee_delete_requires_permission() {
    let (app, state) = test_app().await;
    let token = login(&app).await;

    let other = state
        .db
        .employees()
        .create(&pressline_db::repository::employee::NewEmployee {
            employee_name: "joe".into(),
            password_hash: "hash".into(),
            display_name: "Joe".into(),
            phone_number: None,
            email: None,
        })
        .await
        .unwrap();

    // No permission yet
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/api/account",
            Some(&token),
            json!({ "employee_id": other.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Grant the manager role to the caller and retry
    let maria = state
        .db
        .employees()
        .get_by_name("maria")
        .await
        .unwrap()
        .unwrap();
    state
        .db
        .employees()
        .set_roles(maria.id, &["manager".to_string()])
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/api/account",
            Some(&token),
            json!({ "employee_id": other.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Self-deletion is always rejected
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/api/account",
            Some(&token),
            json!({ "employee_id": maria.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
