//! Product design handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::product_designs::SaveDesignCommand;

use super::design_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::DesignRequest;
use crate::infra::http::api::state::ApiState;

pub async fn list_designs(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let designs = state.designs.list(&principal).await.map_err(design_to_api)?;
    Ok(Json(designs))
}

pub async fn get_design(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let design = state
        .designs
        .get(&principal, id)
        .await
        .map_err(design_to_api)?;
    Ok(Json(design))
}

pub async fn create_design(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<DesignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let design = state
        .designs
        .create(&principal, design_command(payload))
        .await
        .map_err(design_to_api)?;
    Ok((StatusCode::CREATED, Json(design)))
}

/// Overwrite the whole design document.
pub async fn save_design(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DesignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let design = state
        .designs
        .update(&principal, id, design_command(payload))
        .await
        .map_err(design_to_api)?;
    Ok(Json(design))
}

pub async fn delete_design(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .designs
        .delete(&principal, id)
        .await
        .map_err(design_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

fn design_command(payload: DesignRequest) -> SaveDesignCommand {
    SaveDesignCommand {
        title: payload.title,
        product_id: payload.product_id,
        components: payload.components,
        page_settings: payload.page_settings,
        published: payload.published,
    }
}
