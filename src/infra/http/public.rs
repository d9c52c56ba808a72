use std::{convert::Infallible, io::ErrorKind, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT},
    },
    middleware,
    response::{
        IntoResponse, Redirect, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    application::{
        contact::{ContactCommand, ContactService},
        error::HttpError,
        landing_pages::{LandingPageError, LandingPageService},
        product_designs::{ProductDesignError, ProductDesignService},
        qr_codes::{QrCodeError, QrCodeService},
        repos::HealthRepo,
        session_watch::SessionWatcher,
        visits::{GateInputs, VisitTracker},
    },
    config::SessionSettings,
    domain::visit::{
        CachedSession, GateState, SESSION_COOKIE, SKIP_COOKIE, VisitOrigin, parse_skip_until,
        skip_deadline,
    },
    infra::uploads::{UploadStorage, UploadStorageError},
    presentation::views::{
        DesignPageTemplate, DesignPageView, GateView, LandingPageTemplate, LandingPageView,
        render_not_found_response, render_template_response,
    },
};

use super::{
    RouterState,
    api::{handlers::contact_to_api, models::ContactRequest},
    db_health_response,
    middleware::log_responses,
    repo_error_to_http,
};

/// How the visitor gate behaves on published pages.
#[derive(Debug, Clone)]
pub struct GateSettings {
    pub skip_window: time::Duration,
    pub poll_interval: Duration,
    pub sign_in_path: String,
}

impl From<&SessionSettings> for GateSettings {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            skip_window: time::Duration::try_from(settings.skip_window)
                .unwrap_or(time::Duration::MAX),
            poll_interval: settings.poll_interval,
            sign_in_path: settings.sign_in_path.clone(),
        }
    }
}

#[derive(Clone)]
pub struct HttpState {
    pub landing_pages: Arc<LandingPageService>,
    pub designs: Arc<ProductDesignService>,
    pub qr_codes: Arc<QrCodeService>,
    pub contact: Arc<ContactService>,
    pub tracker: VisitTracker,
    pub upload_storage: Arc<UploadStorage>,
    pub health: Arc<dyn HealthRepo>,
    pub gate: GateSettings,
}

/// Published pages, QR redirects, uploads and the contact endpoint.
pub fn build_public_router(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route("/_health/db", get(public_health))
        .route("/uploads/{*path}", get(serve_upload))
        .route("/qr/{id}", get(qr_redirect))
        .route("/qr/{id}/image", get(qr_image))
        .route("/designs/{id}", get(design_page))
        .route("/api/contact", post(submit_contact))
        .route("/{slug}", get(landing_page))
        .route("/{slug}/skip", post(skip_gate))
        .route("/{slug}/gate", get(gate_stream))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VisitQuery {
    src: Option<String>,
    qr: Option<String>,
}

impl VisitQuery {
    fn origin(&self) -> VisitOrigin {
        VisitOrigin::from_query(self.src.as_deref(), self.qr.as_deref())
    }
}

fn gate_inputs(jar: &CookieJar, origin: VisitOrigin) -> GateInputs {
    GateInputs {
        cached: jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| CachedSession::parse(cookie.value())),
        skip_until: jar
            .get(SKIP_COOKIE)
            .and_then(|cookie| parse_skip_until(cookie.value())),
        origin,
    }
}

async fn not_found() -> Response {
    render_not_found_response()
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.health.ping().await)
}

async fn landing_page(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<VisitQuery>,
    jar: CookieJar,
) -> Response {
    let page = match state.landing_pages.find_published(&slug).await {
        Ok(Some(page)) => page,
        Ok(None) => return render_not_found_response(),
        Err(err) => return landing_page_error(err),
    };

    let inputs = gate_inputs(&jar, query.origin());
    let gate_state = state
        .tracker
        .on_page_load(page.page.id, &inputs, OffsetDateTime::now_utc())
        .await;

    let gate = GateView::new(&page.page.slug, &gate_state, &state.gate.sign_in_path);
    let view = LandingPageView::new(&page, gate);
    let mut response = render_template_response(LandingPageTemplate { view }, StatusCode::OK);
    set_no_store(&mut response);
    response
}

/// Start the skip countdown and send the visitor back to the page.
async fn skip_gate(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> Response {
    match state.landing_pages.find_published(&slug).await {
        Ok(Some(_)) => {}
        Ok(None) => return render_not_found_response(),
        Err(err) => return landing_page_error(err),
    }

    let until = skip_deadline(OffsetDateTime::now_utc(), state.gate.skip_window);
    let cookie = Cookie::build((SKIP_COOKIE, until.unix_timestamp().to_string()))
        .path("/")
        .max_age(state.gate.skip_window)
        .same_site(SameSite::Lax)
        .http_only(true);

    (jar.add(cookie), Redirect::to(&format!("/{slug}"))).into_response()
}

/// Server-sent gate states for one open page.
async fn gate_stream(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<VisitQuery>,
    jar: CookieJar,
) -> Response {
    let page = match state.landing_pages.find_published(&slug).await {
        Ok(Some(page)) => page,
        Ok(None) => return render_not_found_response(),
        Err(err) => return landing_page_error(err),
    };

    let inputs = gate_inputs(&jar, query.origin());
    let watcher = SessionWatcher::spawn(
        state.tracker.clone(),
        page.page.id,
        inputs,
        state.gate.poll_interval,
    );

    Sse::new(gate_events(watcher.into_stream()))
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn gate_events(
    states: impl Stream<Item = GateState>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    states.filter_map(|state| async move {
        match Event::default().event("gate").json_data(state) {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                warn!(
                    target = "brandpage::http::gate",
                    error = %err,
                    "failed to encode gate state"
                );
                None
            }
        }
    })
}

async fn qr_redirect(
    State(state): State<HttpState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let now = OffsetDateTime::now_utc();
    let user_id = scanning_user(&state.tracker, &jar, now).await;
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match state.qr_codes.scan(id, user_id, user_agent, now).await {
        Ok(redirect) => Redirect::to(&redirect.location).into_response(),
        Err(err) => qr_error(err),
    }
}

/// The scanning visitor, if their session cookie checks out against the store.
async fn scanning_user(
    tracker: &VisitTracker,
    jar: &CookieJar,
    now: OffsetDateTime,
) -> Option<Uuid> {
    let cached = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| CachedSession::parse(cookie.value()))
        .filter(|cached| cached.is_fresh_at(now))?;

    match tracker.sessions().verify(&cached.token, now).await {
        Ok(user_id) => user_id,
        Err(err) => {
            warn!(
                target = "brandpage::http::qr",
                error = %err,
                "session check failed, recording anonymous scan"
            );
            None
        }
    }
}

async fn qr_image(State(state): State<HttpState>, Path(id): Path<Uuid>) -> Response {
    match state.qr_codes.image_url(id).await {
        Ok(url) => Redirect::to(url.as_str()).into_response(),
        Err(err) => qr_error(err),
    }
}

async fn design_page(State(state): State<HttpState>, Path(id): Path<Uuid>) -> Response {
    match state.designs.find_published(id).await {
        Ok(Some(design)) => {
            let view = DesignPageView::new(&design);
            render_template_response(DesignPageTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(),
        Err(ProductDesignError::Repo(err)) => {
            repo_error_to_http("infra::http::public::design_page", err).into_response()
        }
        Err(err) => HttpError::from_error(
            "infra::http::public::design_page",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Design could not be loaded",
            &err,
        )
        .into_response(),
    }
}

/// Contact form submissions only check that every field is present.
async fn submit_contact(
    State(state): State<HttpState>,
    Json(payload): Json<ContactRequest>,
) -> Response {
    let command = ContactCommand {
        landing_page_id: payload.landing_page_id,
        name: payload.name,
        email: payload.email,
        message: payload.message,
    };

    match state.contact.submit(command).await {
        Ok(submission) => (StatusCode::CREATED, Json(submission)).into_response(),
        Err(err) => contact_to_api(err).into_response(),
    }
}

async fn serve_upload(State(state): State<HttpState>, Path(path): Path<String>) -> Response {
    const SOURCE: &str = "infra::http::public::serve_upload";

    match state.upload_storage.read(&path).await {
        Ok(bytes) => build_upload_response(&path, bytes),
        Err(UploadStorageError::InvalidPath) => render_not_found_response(),
        Err(UploadStorageError::Io(err)) if err.kind() == ErrorKind::NotFound => {
            render_not_found_response()
        }
        Err(err) => {
            error!(
                target = SOURCE,
                path = %path,
                error = %err,
                "failed to read stored upload"
            );
            HttpError::new(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read uploaded file",
                err.to_string(),
            )
            .into_response()
        }
    }
}

fn build_upload_response(path: &str, bytes: Bytes) -> Response {
    let length = bytes.len();
    let mut response = Response::new(Body::from(bytes));

    let headers = response.headers_mut();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(CONTENT_TYPE, value);
    }
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    // Stored paths embed a random id, so the bytes never change.
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );

    response
}

fn set_no_store(response: &mut Response) {
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
}

fn landing_page_error(err: LandingPageError) -> Response {
    const SOURCE: &str = "infra::http::public::landing_page";
    match err {
        LandingPageError::NotFound => render_not_found_response(),
        LandingPageError::Repo(repo) => repo_error_to_http(SOURCE, repo).into_response(),
        other => HttpError::from_error(
            SOURCE,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Page could not be loaded",
            &other,
        )
        .into_response(),
    }
}

fn qr_error(err: QrCodeError) -> Response {
    const SOURCE: &str = "infra::http::public::qr";
    match err {
        QrCodeError::NotFound | QrCodeError::TargetMissing => render_not_found_response(),
        QrCodeError::Repo(repo) => repo_error_to_http(SOURCE, repo).into_response(),
        other => HttpError::from_error(
            SOURCE,
            StatusCode::INTERNAL_SERVER_ERROR,
            "QR code could not be resolved",
            &other,
        )
        .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::COOKIE;

    use super::*;

    #[test]
    fn gate_inputs_read_both_cookies() {
        let mut headers = HeaderMap::new();
        let user = Uuid::from_u128(9);
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!(
                "{SESSION_COOKIE}=tok.{user}.4102444800; {SKIP_COOKIE}=1700000000"
            ))
            .expect("cookie header"),
        );
        let jar = CookieJar::from_headers(&headers);

        let inputs = gate_inputs(&jar, VisitOrigin::direct());
        let cached = inputs.cached.expect("cached session");
        assert_eq!(cached.user_id, user);
        assert_eq!(
            inputs.skip_until.map(|until| until.unix_timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn malformed_cookies_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("bp_session=garbage; bp_skip_until=soon"),
        );
        let jar = CookieJar::from_headers(&headers);

        let inputs = gate_inputs(&jar, VisitOrigin::direct());
        assert!(inputs.cached.is_none());
        assert!(inputs.skip_until.is_none());
    }

    #[test]
    fn qr_query_sets_visit_origin() {
        let qr = Uuid::from_u128(3);
        let query = VisitQuery {
            src: Some("qr".into()),
            qr: Some(qr.to_string()),
        };
        let origin = query.origin();
        assert_eq!(origin.qr_code_id, Some(qr));
    }

    #[test]
    fn uploads_are_served_immutable() {
        let response = build_upload_response("public/a/logo.png", Bytes::from_static(b"png"));
        assert_eq!(
            response.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("image/png")
        );
        assert_eq!(
            response.headers().get(CONTENT_LENGTH).and_then(|v| v.to_str().ok()),
            Some("3")
        );
    }
}
