use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, config, health, models, sessions, settings, upload, vector_dbs};
use crate::state::AppState;

const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Creates the application router with all routes and middleware.
///
/// Per-session panel routes live under `/api/sessions/:session_id`.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state);
    Router::new()
        .route("/health", get(health::health))
        .route("/api/status", get(health::get_status))
        .route(
            "/api/config",
            get(config::get_config)
                .post(config::update_config)
                .patch(config::patch_config),
        )
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/api/sessions/:session_id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/api/sessions/:session_id/chat", post(chat::send_message))
        .route(
            "/api/sessions/:session_id/transcript",
            get(chat::get_transcript),
        )
        .route(
            "/api/sessions/:session_id/reset",
            post(chat::reset_conversation),
        )
        .route(
            "/api/sessions/:session_id/vector-dbs/selection",
            put(vector_dbs::select_vector_dbs),
        )
        .route(
            "/api/sessions/:session_id/settings/endpoint",
            post(settings::edit_endpoint),
        )
        .route(
            "/api/sessions/:session_id/settings/endpoint/test",
            post(settings::test_endpoint),
        )
        .route(
            "/api/sessions/:session_id/settings/endpoint/reset",
            post(settings::reset_endpoint),
        )
        .route(
            "/api/sessions/:session_id/settings/test/dismiss",
            post(settings::dismiss_test),
        )
        .route(
            "/api/sessions/:session_id/settings/models/refresh",
            post(settings::refresh_models),
        )
        .route(
            "/api/sessions/:session_id/settings/model",
            post(settings::pick_model),
        )
        .route(
            "/api/sessions/:session_id/settings/debug",
            post(settings::set_debug_mode),
        )
        .route("/api/sessions/:session_id/models", get(models::list_models))
        .route(
            "/api/sessions/:session_id/vector-dbs",
            get(vector_dbs::list_vector_dbs).post(vector_dbs::create_vector_db),
        )
        .route(
            "/api/sessions/:session_id/vector-dbs/:name",
            get(vector_dbs::get_vector_db),
        )
        .route(
            "/api/sessions/:session_id/vector-dbs/:name/documents",
            get(vector_dbs::probe_documents).post(vector_dbs::upload_documents),
        )
        .route("/api/sessions/:session_id/upload", post(upload::ingest_files))
        .route("/api/upload/status", get(upload::upload_status))
        .route("/api/upload/test-connection", post(upload::test_connection))
        .with_state(state)
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(state: &Arc<AppState>) -> CorsLayer {
    let config = match state.config.load_config() {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                "Failed to load config while building CORS layer: {}; using local defaults",
                err
            );
            Value::Null
        }
    };
    let allowed_origins = resolve_allowed_origins(&config)
        .into_iter()
        .filter_map(|origin| HeaderValue::from_str(&origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn resolve_allowed_origins(config: &Value) -> Vec<String> {
    let origins = config
        .get("server")
        .and_then(|server| server.get("cors_allowed_origins"))
        .and_then(|value| value.as_array())
        .map(|list| {
            list.iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| item.to_string())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if origins.is_empty() {
        return default_local_origins();
    }

    origins
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://localhost:8501".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://127.0.0.1:8501".to_string(),
    ]
}
