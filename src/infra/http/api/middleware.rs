use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use time::OffsetDateTime;
use tracing::{error, warn};

use crate::application::auth::{AuthError, Principal};

use super::error::ApiError;
use super::state::ApiState;

/// Resolve the bearer session token into a [`Principal`].
pub async fn api_auth(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers()) else {
        return ApiError::unauthorized().into_response();
    };

    let principal = match state
        .sessions
        .authenticate(&token, OffsetDateTime::now_utc())
        .await
    {
        Ok(principal) => principal,
        Err(AuthError::Missing | AuthError::Invalid) => {
            return ApiError::unauthorized().into_response();
        }
        Err(AuthError::Expired) => return ApiError::session_expired().into_response(),
        Err(AuthError::Repo(err)) => {
            error!(
                target = "brandpage::api::auth",
                error = %err,
                "session lookup failed"
            );
            return super::handlers::repo_to_api(err).into_response();
        }
    };

    request.extensions_mut().insert(principal);

    let mut response = next.run(request).await;
    response.extensions_mut().insert(principal);
    response
}

pub async fn api_rate_limit(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let Some(principal) = request.extensions().get::<Principal>() else {
        warn!(
            target = "brandpage::api::ratelimit",
            "missing principal in rate limit middleware"
        );
        return ApiError::unauthorized().into_response();
    };

    let key = principal.user_id.to_string();
    let (allowed, remaining) = state.rate_limiter.allow(&key, &path);
    if !allowed {
        return ApiError::rate_limited(state.rate_limiter.retry_after_secs());
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(state.rate_limiter.limit()));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
    response
}

pub(crate) fn extract_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
