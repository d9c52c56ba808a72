pub mod api;
mod middleware;
mod public;

pub use api::rate_limit::ApiRateLimiter;
pub use api::{ApiState, build_api_router};
pub use public::{GateSettings, HttpState, build_public_router};

use crate::application::error::ErrorReport;
use crate::application::error::HttpError;
use crate::application::repos::RepoError;
use axum::Router;
use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::middleware as axum_middleware;
use axum::response::{IntoResponse, Response};

use middleware::{log_responses, set_request_context};

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Map a repository error to a consistent HTTP error response for the public surface.
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    match err {
        RepoError::Duplicate { constraint } => {
            HttpError::new(source, StatusCode::CONFLICT, "Duplicate record", constraint)
        }
        RepoError::NotFound => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Resource not found",
            "resource not found",
        ),
        RepoError::InvalidInput { message } => {
            HttpError::new(source, StatusCode::BAD_REQUEST, "Invalid input", message)
        }
        RepoError::Integrity { message } => HttpError::new(
            source,
            StatusCode::CONFLICT,
            "Integrity constraint violated",
            message,
        ),
        RepoError::Timeout => HttpError::new(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Database timeout",
            "Database timeout",
        ),
        RepoError::Persistence(message) => HttpError::new(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Persistence error",
            message,
        ),
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub http: HttpState,
    pub api: ApiState,
}

impl FromRef<RouterState> for HttpState {
    fn from_ref(state: &RouterState) -> Self {
        state.http.clone()
    }
}

impl FromRef<RouterState> for ApiState {
    fn from_ref(state: &RouterState) -> Self {
        state.api.clone()
    }
}

/// Full application router: the bearer-authenticated `/api` surface merged
/// with the public pages. Every request gets a request id.
pub fn build_router(state: RouterState) -> Router {
    let api = build_api_router(state.clone());
    let public = build_public_router(state.clone());

    api.merge(public)
        .with_state(state)
        .layer(axum_middleware::from_fn(set_request_context))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_map_to_expected_statuses() {
        let cases = [
            (
                RepoError::Duplicate {
                    constraint: "brands_slug_key".into(),
                },
                StatusCode::CONFLICT,
            ),
            (RepoError::NotFound, StatusCode::NOT_FOUND),
            (
                RepoError::InvalidInput {
                    message: "bad".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (RepoError::Timeout, StatusCode::SERVICE_UNAVAILABLE),
            (
                RepoError::Persistence("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let response = repo_error_to_http("test", err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn failed_health_check_attaches_report() {
        let response = db_health_response(Err(RepoError::Timeout));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.extensions().get::<ErrorReport>().is_some());
    }
}
