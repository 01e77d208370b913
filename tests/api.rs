//! End-to-end tests of the contact API: router + store + SQLite on a
//! temporary database, driven through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::util::ServiceExt;

use rolodex::config::DbConfig;
use rolodex::db;
use rolodex::server::router;
use rolodex::store::ContactStore;

async fn test_router(tmp: &TempDir) -> Router {
    let db = DbConfig {
        path: tmp.path().join("contacts.db"),
    };
    let pool = db::connect(&db).await.unwrap();
    let store = ContactStore::open(pool).await.unwrap();
    router(Arc::new(Mutex::new(store)))
}

async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn juan() -> Value {
    json!({
        "name": "Juan",
        "email": "juan@example.com",
        "phone": "+56911111111",
        "tags": ["tech", "client"]
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let tmp = TempDir::new().unwrap();
    let app = test_router(&tmp).await;

    let (status, body) = request(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn empty_list_is_an_empty_array() {
    let tmp = TempDir::new().unwrap();
    let app = test_router(&tmp).await;

    let (status, body) = request(&app, Method::GET, "/api/contacts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn crud_scenario() {
    let tmp = TempDir::new().unwrap();
    let app = test_router(&tmp).await;

    // Create → 201 with a generated id and lifecycle defaults.
    let (status, created) = request(&app, Method::POST, "/api/contacts", Some(juan())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();
    assert!(!id.is_empty());
    assert_eq!(created["relationship_status"], "active");
    assert_eq!(created["last_contact_date"], Value::Null);
    assert_eq!(created["tags"], json!(["tech", "client"]));

    // Same email again → 400 with a detail field.
    let (status, body) = request(&app, Method::POST, "/api/contacts", Some(juan())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("already exists"));

    // Unknown id → 404.
    let (status, body) = request(&app, Method::GET, "/api/contacts/bad-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());

    // Partial update: only notes and tags change.
    let (status, updated) = request(
        &app,
        Method::PUT,
        &format!("/api/contacts/{}", id),
        Some(json!({"notes": "x", "tags": ["vip"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notes"], "x");
    assert_eq!(updated["tags"], json!(["vip"]));
    assert_eq!(updated["name"], "Juan");
    assert_eq!(updated["email"], "juan@example.com");
    assert_eq!(updated["phone"], "+56911111111");

    // Delete → 200 with a confirmation message, then the id is gone.
    let (status, body) = request(&app, Method::DELETE, &format!("/api/contacts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("deleted"));

    let (status, _) = request(&app, Method::GET, &format!("/api/contacts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = request(&app, Method::DELETE, &format!("/api/contacts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn update_of_unknown_contact_is_404() {
    let tmp = TempDir::new().unwrap();
    let app = test_router(&tmp).await;

    let (status, body) = request(
        &app,
        Method::PUT,
        "/api/contacts/bad-id",
        Some(json!({"notes": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn malformed_email_is_400() {
    let tmp = TempDir::new().unwrap();
    let app = test_router(&tmp).await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/contacts",
        Some(json!({"name": "X", "email": "nope", "phone": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("Invalid email"));
}

#[tokio::test]
async fn search_and_tag_filters() {
    let tmp = TempDir::new().unwrap();
    let app = test_router(&tmp).await;

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/contacts",
        Some(json!({
            "name": "María García",
            "email": "maria@example.com",
            "phone": "+111",
            "tags": ["tech"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/contacts",
        Some(json!({"name": "Pedro", "email": "pedro@example.com", "phone": "+222"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Case-insensitive substring over the name.
    let (status, body) = request(
        &app,
        Method::GET,
        "/api/contacts?search=mar%C3%ADa",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "María García");

    // Substring inside a tag element.
    let (status, body) = request(&app, Method::GET, "/api/contacts?search=tech", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Tag filter.
    let (status, body) = request(&app, Method::GET, "/api/contacts?tag=tech", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // No matches → empty array, not an error.
    let (status, body) = request(&app, Method::GET, "/api/contacts?search=nadie", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn explicit_null_clears_a_nullable_field() {
    let tmp = TempDir::new().unwrap();
    let app = test_router(&tmp).await;

    let (_, created) = request(
        &app,
        Method::POST,
        "/api/contacts",
        Some(json!({
            "name": "Ana",
            "email": "ana@example.com",
            "phone": "+333",
            "company": "Acme"
        })),
    )
    .await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["company"], "Acme");

    let (status, updated) = request(
        &app,
        Method::PUT,
        &format!("/api/contacts/{}", id),
        Some(json!({"company": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["company"], Value::Null);
    assert_eq!(updated["name"], "Ana");
}
