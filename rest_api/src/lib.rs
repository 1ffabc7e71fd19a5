use std::sync::Arc;

use axum::{
    Json, Router,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use anyhow::Context;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use models::{FieldErrors, ModelError};
use storage::{RecordStore, StoreError};

mod config;
mod filters;
mod handlers;
mod payload;

pub use crate::config::{RestApiConfig, load_rest_api_config};

// Define the REST API error enum
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("record not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("malformed request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// A 400 with one message scoped to one field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        ApiError::Validation(errors)
    }
}

/// Body for non-field failures: `{"detail": "..."}`.
#[derive(Serialize)]
struct Detail {
    detail: String,
}

fn detail(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(Detail {
            detail: message.to_string(),
        }),
    )
        .into_response()
}

// Convert errors into the HTTP responses the API contract defines:
// 404 with a detail body, 400 with a field->messages map, 500 otherwise.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => detail(StatusCode::NOT_FOUND, "Not found."),
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::BadRequest(message) => detail(StatusCode::BAD_REQUEST, &message),
            ApiError::Store(err) => store_error_response(err),
        }
    }
}

// The store re-checks references and the date rule, so its failures map
// onto the same field-scoped bodies the handlers produce.
fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound { .. } => detail(StatusCode::NOT_FOUND, "Not found."),
        StoreError::MissingPatient(_) => {
            ApiError::field("patient", "Patient does not exist.").into_response()
        }
        StoreError::MissingMedication(_) => {
            ApiError::field("medication", "Medication does not exist.").into_response()
        }
        StoreError::Model(ModelError::EndBeforeStart) => {
            ApiError::field("end_date", "End date cannot be before start date").into_response()
        }
        StoreError::DuplicateCode(code) => {
            ApiError::field("code", format!("medication with code '{code}' already exists"))
                .into_response()
        }
        err => {
            tracing::error!(error = %err, "storage failure");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
        }
    }
}

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
}

/// Build the application router. Read-only resources register GET only,
/// so axum answers writes to them with 405 method-not-allowed.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/Patient", get(handlers::list_patients))
        .route("/Patient/:id", get(handlers::retrieve_patient))
        .route("/Medication", get(handlers::list_medications))
        .route("/Medication/:id", get(handlers::retrieve_medication))
        .route(
            "/Prescription",
            get(handlers::list_prescriptions).post(handlers::create_prescription),
        )
        .route(
            "/Prescription/:id",
            get(handlers::retrieve_prescription)
                .put(handlers::replace_prescription)
                .patch(handlers::patch_prescription)
                .delete(handlers::delete_prescription),
        )
        .with_state(state)
        .layer(cors)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("received shutdown signal");
}

/// Open the store and run the HTTP server until interrupted.
pub async fn serve(config: RestApiConfig) -> Result<(), anyhow::Error> {
    let store = RecordStore::open(&config.data_directory).with_context(|| {
        format!(
            "failed to open record store at {}",
            config.data_directory.display()
        )
    })?;
    let state = AppState {
        store: Arc::new(store),
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to address: {addr}"))?;
    tracing::info!(%addr, "REST API server listening");

    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("REST API server failed")?;

    tracing::info!("REST API server stopped");
    Ok(())
}
