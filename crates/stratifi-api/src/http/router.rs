//! Axum router configuration with middleware.
//!
//! Agent endpoints live at the root and under `/api/`; the session API is
//! under `/api/v1/`. Middleware: CORS, request tracing.

use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let agent_routes = Router::new()
        .route("/create_agent", post(handlers::agent::create_agent))
        .route("/chat_with_agent", post(handlers::agent::chat_with_agent));

    let api_routes = Router::new()
        // Users
        .route("/users/resolve", post(handlers::user::resolve_user))
        .route(
            "/wallets/{address}/activities",
            get(handlers::user::list_activities),
        )
        .route(
            "/users/{id}/sessions",
            get(handlers::session::list_sessions).post(handlers::session::open_session),
        )
        // Sessions
        .route(
            "/sessions/{id}/messages",
            get(handlers::session::get_messages).post(handlers::session::append_message),
        )
        .route("/sessions/{id}", delete(handlers::session::deactivate_session))
        .route("/health", get(health_check));

    Router::new()
        .merge(agent_routes.clone())
        .nest("/api", agent_routes)
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness plus a database round trip.
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db_ok = sqlx::query("SELECT 1")
        .execute(&state.db_pool.reader)
        .await
        .is_ok();

    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
