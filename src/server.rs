//! Contact HTTP API.
//!
//! Maps each route 1:1 onto a [`ContactStore`] operation and translates
//! domain errors into client statuses.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/contacts` | Create a contact (201) |
//! | `GET`  | `/api/contacts?search=&tag=` | List contacts, optionally narrowed |
//! | `GET`  | `/api/contacts/{id}` | Fetch one contact |
//! | `PUT`  | `/api/contacts/{id}` | Partially update a contact |
//! | `DELETE` | `/api/contacts/{id}` | Delete a contact |
//! | `GET`  | `/` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Error responses carry a single human-readable field:
//!
//! ```json
//! { "detail": "Contact not found" }
//! ```
//!
//! Duplicate email and malformed email → 400; unknown id → 404; a
//! durable-store fault surfaces as a generic 500.
//!
//! # Concurrency
//!
//! The store assumes serialized access, so every handler locks one
//! `tokio::sync::Mutex` around the store instance. The instance is owned by
//! the composition root and handed to [`router`]; tests construct their own
//! store on a private database instead of sharing process state.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::models::{Contact, ContactDraft, ContactPatch};
use crate::store::{ContactStore, ListFilter, StoreError};

/// Store handle shared across request handlers.
pub type SharedStore = Arc<Mutex<ContactStore>>;

#[derive(Clone)]
struct AppState {
    store: SharedStore,
}

/// Build the API router around a store handle.
pub fn router(store: SharedStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_health))
        .route("/api/contacts", get(handle_list).post(handle_create))
        .route(
            "/api/contacts/{id}",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .layer(cors)
        .with_state(AppState { store })
}

/// Start the contact API server.
///
/// Binds to the address configured in `[server].bind` and serves until the
/// process is terminated.
pub async fn run_server(config: &Config, store: ContactStore) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(Arc::new(Mutex::new(store)));

    println!("contact API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error body: `{"detail": "..."}`.
#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

struct ApiError {
    status: StatusCode,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate | StoreError::InvalidEmail(_) => ApiError {
                status: StatusCode::BAD_REQUEST,
                detail: err.to_string(),
            },
            StoreError::NotFound => ApiError {
                status: StatusCode::NOT_FOUND,
                detail: err.to_string(),
            },
            StoreError::Db(e) => {
                tracing::error!(error = %e, "durable store failure");
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: "Internal server error".to_string(),
                }
            }
        }
    }
}

// ============ Handlers ============

/// JSON response body for `GET /`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "rolodex".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handle_create(
    State(state): State<AppState>,
    Json(draft): Json<ContactDraft>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let mut store = state.store.lock().await;
    let contact = store.add(draft).await?;
    tracing::info!(id = %contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

#[derive(Deserialize)]
struct ListParams {
    search: Option<String>,
    tag: Option<String>,
}

async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Contact>> {
    let store = state.store.lock().await;
    Json(store.list(&ListFilter {
        search: params.search,
        tag: params.tag,
    }))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    let store = state.store.lock().await;
    Ok(Json(store.get(&id)?.clone()))
}

async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ContactPatch>,
) -> Result<Json<Contact>, ApiError> {
    let mut store = state.store.lock().await;
    let contact = store.update(&id, patch).await?;
    tracing::info!(id = %id, "contact updated");
    Ok(Json(contact))
}

/// JSON response body for `DELETE /api/contacts/{id}`.
#[derive(Serialize)]
struct DeleteResponse {
    message: String,
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut store = state.store.lock().await;
    store.delete(&id).await?;
    tracing::info!(id = %id, "contact deleted");
    Ok(Json(DeleteResponse {
        message: "Contact deleted successfully".to_string(),
    }))
}
