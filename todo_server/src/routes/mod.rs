use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};

use crate::state::AppState;

pub mod auth;
pub mod rpc;
pub mod todos;

/// All API routes, without CORS or static file serving.
pub fn api(state: AppState) -> Router {
    Router::new()
        .route("/api/todos", get(todos::list).post(todos::create))
        .route("/api/todos/:id", patch(todos::toggle).delete(todos::delete))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/google", post(auth::google))
        .route("/rpc/:procedure", post(rpc::call))
        .route("/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            log::error!("Health check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
