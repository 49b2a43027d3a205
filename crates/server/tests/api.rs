use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use migration::MigratorTrait;
use server::{ServerState, router};

async fn test_router() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    router(ServerState {
        engine: Arc::new(engine),
        db,
    })
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer alice@example.com")
        .header(header::CONTENT_TYPE, "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn requests_without_a_valid_bearer_email_are_rejected() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/budgets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/budgets")
                .header(header::AUTHORIZATION, "Bearer not-an-email")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn budget_and_transaction_round_trip() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/budgets",
            Some(json!({"name": "Main", "currency_code": "eur"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let budget = json_body(response).await;
    assert_eq!(budget["currency_code"], "EUR");
    let budget_id = budget["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/budgets/{budget_id}/accounts"),
            Some(json!({"name": "Checking", "account_type": "checking"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let account = json_body(response).await;
    let account_id = account["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/budgets/{budget_id}/transactions"),
            Some(json!({
                "notes": "coffee",
                "line": {"account_id": account_id, "amount_minor": -350}
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let tx = json_body(response).await;
    assert_eq!(tx["status"], "posted");
    let tx_id = tx["id"].as_str().unwrap().to_string();

    // Explicit null clears notes; leaving posted_at out keeps it.
    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/budgets/{budget_id}/transactions/{tx_id}"),
            Some(json!({"notes": null})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tx = json_body(response).await;
    assert_eq!(tx["notes"], Value::Null);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/budgets/{budget_id}/transactions"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    assert_eq!(listed["transactions"].as_array().unwrap().len(), 1);

    let response = app
        .oneshot(request(
            "DELETE",
            &format!("/budgets/{budget_id}/transactions/{tx_id}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn currencies_are_listed_for_any_authenticated_caller() {
    let app = test_router().await;

    let response = app
        .oneshot(request("GET", "/currencies", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    let codes: Vec<_> = listed["currencies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["CHF", "EUR", "GBP", "JPY", "USD"]);
}

#[tokio::test]
async fn deleting_a_budget_removes_it_and_its_contents() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(request("POST", "/budgets", Some(json!({"name": "Main"}))))
        .await
        .unwrap();
    let budget_id = json_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/budgets/{budget_id}/accounts"),
            Some(json!({"name": "Checking", "account_type": "checking"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/budgets/{budget_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("GET", &format!("/budgets/{budget_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn engine_errors_map_to_http_statuses() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/budgets",
            Some(json!({"name": "Main", "currency_code": "XXX"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/budgets",
            Some(json!({"name": "Main"})),
        ))
        .await
        .unwrap();
    let budget_id = json_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/budgets/{budget_id}/accounts"),
            Some(json!({"name": "Checking", "account_type": "checking"})),
        ))
        .await
        .unwrap();
    let account_id = json_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/budgets/{budget_id}/transactions"),
            Some(json!({"line": {"account_id": account_id, "amount_minor": 0}})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .oneshot(request(
            "POST",
            &format!("/budgets/{budget_id}/accounts"),
            Some(json!({"name": "checking", "account_type": "cash"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn bulk_import_reports_created_then_existing() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(request("POST", "/budgets", Some(json!({"name": "Main"}))))
        .await
        .unwrap();
    let budget_id = json_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/budgets/{budget_id}/accounts"),
            Some(json!({"name": "Checking", "account_type": "checking"})),
        ))
        .await
        .unwrap();
    let account_id = json_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let batch = json!({"transactions": [
        {"import_id": "bank-1", "line": {"account_id": account_id, "amount_minor": -100}},
        {"import_id": "bank-2", "line": {"account_id": account_id, "amount_minor": -200}}
    ]});

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/budgets/{budget_id}/transactions/bulk"),
            Some(batch.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let outcome = json_body(response).await;
    assert_eq!(outcome["created"], 2);
    assert_eq!(outcome["existing"], 0);

    let response = app
        .oneshot(request(
            "POST",
            &format!("/budgets/{budget_id}/transactions/bulk"),
            Some(batch),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = json_body(response).await;
    assert_eq!(outcome["created"], 0);
    assert_eq!(outcome["existing"], 2);
}
