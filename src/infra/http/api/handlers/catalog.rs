//! Categories, subcategories and products

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::catalog::ProductCommand;

use super::catalog_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{NameRequest, ProductRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_categories(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .catalog
        .list_categories(&principal, brand_id)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
    Json(payload): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .catalog
        .create_category(&principal, brand_id, &payload.name)
        .await
        .map_err(catalog_to_api)?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn rename_category(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .catalog
        .rename_category(&principal, id, &payload.name)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .catalog
        .delete_category(&principal, id)
        .await
        .map_err(catalog_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_subcategories(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let subcategories = state
        .catalog
        .list_subcategories(&principal, category_id)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(subcategories))
}

pub async fn create_subcategory(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let subcategory = state
        .catalog
        .create_subcategory(&principal, category_id, &payload.name)
        .await
        .map_err(catalog_to_api)?;
    Ok((StatusCode::CREATED, Json(subcategory)))
}

pub async fn rename_subcategory(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let subcategory = state
        .catalog
        .rename_subcategory(&principal, id, &payload.name)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(subcategory))
}

pub async fn delete_subcategory(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .catalog
        .delete_subcategory(&principal, id)
        .await
        .map_err(catalog_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_products(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .catalog
        .list_products(&principal, brand_id)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog
        .get_product(&principal, id)
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
    Json(payload): Json<ProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog
        .create_product(&principal, brand_id, product_command(payload))
        .await
        .map_err(catalog_to_api)?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Full replacement: omitted optional fields are cleared.
pub async fn update_product(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog
        .update_product(&principal, id, product_command(payload))
        .await
        .map_err(catalog_to_api)?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .catalog
        .delete_product(&principal, id)
        .await
        .map_err(catalog_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

fn product_command(payload: ProductRequest) -> ProductCommand {
    ProductCommand {
        category_id: payload.category_id,
        subcategory_id: payload.subcategory_id,
        name: payload.name,
        description: payload.description,
        price_cents: payload.price_cents,
        image_url: payload.image_url,
        sku: payload.sku,
    }
}
