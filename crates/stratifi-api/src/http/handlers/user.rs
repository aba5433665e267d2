//! User HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/users/resolve               - Find or create the user for a wallet address
//! - GET  /api/v1/wallets/{address}/activities - Wallet actions proposed to a user

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use stratifi_types::activity::UserActivity;
use stratifi_types::user::{User, UserPreferences};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveUserRequest {
    pub wallet_address: String,
    /// Only applied when the user is created.
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
}

/// POST /api/v1/users/resolve
pub async fn resolve_user(
    State(state): State<AppState>,
    body: Result<Json<ResolveUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let timer = RequestTimer::start();
    let Json(req) =
        body.map_err(|e| AppError::Validation(format!("Invalid request body: {}", e.body_text())))?;

    let user = match req.preferences {
        Some(prefs) => {
            state
                .identity
                .resolve_with_preferences(&req.wallet_address, prefs)
                .await?
        }
        None => state.identity.resolve(&req.wallet_address).await?,
    };

    let link = format!("/api/v1/users/{}/sessions", user.id);
    Ok(Json(timer.finish(user).with_link("sessions", &link)))
}

/// GET /api/v1/wallets/{address}/activities
pub async fn list_activities(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<Vec<UserActivity>>>, AppError> {
    let timer = RequestTimer::start();

    let activities = state.agent_service.activities(&address).await?;

    Ok(Json(timer.finish(activities)))
}
