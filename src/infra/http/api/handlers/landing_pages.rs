//! Landing page handlers, including component saves and visit analytics.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::landing_pages::{CreateLandingPageCommand, UpdateLandingPageCommand};

use super::{contact_to_api, landing_page_to_api, visit_to_api};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{
    ComponentsRequest, LandingPageCreateRequest, LandingPageResponse, LandingPageUpdateRequest,
    ViewsResponse,
};
use crate::infra::http::api::state::ApiState;

pub async fn list_landing_pages(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pages = state
        .landing_pages
        .list(&principal, brand_id)
        .await
        .map_err(landing_page_to_api)?;
    Ok(Json(pages))
}

pub async fn get_landing_page(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let loaded = state
        .landing_pages
        .get(&principal, id)
        .await
        .map_err(landing_page_to_api)?;
    Ok(Json(LandingPageResponse {
        page: loaded.page,
        components: loaded.components,
    }))
}

pub async fn create_landing_page(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<LandingPageCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreateLandingPageCommand {
        brand_id: payload.brand_id,
        title: payload.title,
        slug: payload.slug,
        background_color: payload.background_color,
        font_family: payload.font_family,
        published: payload.published,
    };

    let page = state
        .landing_pages
        .create(&principal, command)
        .await
        .map_err(landing_page_to_api)?;
    Ok((StatusCode::CREATED, Json(page)))
}

pub async fn update_landing_page(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LandingPageUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateLandingPageCommand {
        title: payload.title,
        slug: payload.slug,
        background_color: payload.background_color,
        font_family: payload.font_family,
        published: payload.published,
    };

    let page = state
        .landing_pages
        .update(&principal, id, command)
        .await
        .map_err(landing_page_to_api)?;
    Ok(Json(page))
}

pub async fn delete_landing_page(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .landing_pages
        .delete(&principal, id)
        .await
        .map_err(landing_page_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the page's component rows with the editor's current list.
pub async fn save_landing_page_components(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ComponentsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let components = state
        .landing_pages
        .save_components(&principal, id, payload.components)
        .await
        .map_err(landing_page_to_api)?;
    Ok(Json(components))
}

pub async fn list_landing_page_views(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .landing_pages
        .owned_page(&principal, id)
        .await
        .map_err(landing_page_to_api)?;

    let views = state.visits.list_views(id).await.map_err(visit_to_api)?;
    Ok(Json(ViewsResponse::from(views)))
}

pub async fn list_contact_submissions(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let submissions = state
        .contact
        .list_for_page(&principal, id)
        .await
        .map_err(contact_to_api)?;
    Ok(Json(submissions))
}
