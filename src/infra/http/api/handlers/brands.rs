//! Brand handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::brands::{CreateBrandCommand, UpdateBrandCommand};

use super::brand_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{BrandCreateRequest, BrandUpdateRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_brands(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let brands = state.brands.list(&principal).await.map_err(brand_to_api)?;
    Ok(Json(brands))
}

pub async fn get_brand(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let brand = state
        .brands
        .get(&principal, brand_id)
        .await
        .map_err(brand_to_api)?;
    Ok(Json(brand))
}

pub async fn create_brand(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<BrandCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreateBrandCommand {
        name: payload.name,
        logo_url: payload.logo_url,
        website: payload.website,
        description: payload.description,
    };

    let brand = state
        .brands
        .create(&principal, command)
        .await
        .map_err(brand_to_api)?;
    Ok((StatusCode::CREATED, Json(brand)))
}

pub async fn update_brand(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
    Json(payload): Json<BrandUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateBrandCommand {
        name: payload.name,
        logo_url: payload.logo_url,
        website: payload.website,
        description: payload.description,
    };

    let brand = state
        .brands
        .update(&principal, brand_id, command)
        .await
        .map_err(brand_to_api)?;
    Ok(Json(brand))
}

pub async fn delete_brand(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .brands
        .delete(&principal, brand_id)
        .await
        .map_err(brand_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
