//! Session introspection and sign-out

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use crate::application::auth::{AuthError, Principal};

use super::repo_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::middleware::extract_token;
use crate::infra::http::api::state::ApiState;

pub async fn current_session(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(json!({ "userId": principal.user_id }))
}

/// Revoke the bearer token. Open landing-page gates for this session are
/// notified through the session hub.
pub async fn sign_out(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_token(&headers).ok_or_else(ApiError::unauthorized)?;
    match state.sessions.sign_out(&token).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(AuthError::Repo(err)) => Err(repo_to_api(err)),
        Err(_) => Err(ApiError::unauthorized()),
    }
}
