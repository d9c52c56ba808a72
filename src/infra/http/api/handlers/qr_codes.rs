//! QR code handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::qr_codes::QrCodeCommand;
use crate::domain::entities::QrCodeRecord;

use super::qr_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{QrCodeRequest, QrCodeResponse};
use crate::infra::http::api::state::ApiState;

pub async fn list_qr_codes(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let codes = state
        .qr_codes
        .list(&principal, brand_id)
        .await
        .map_err(qr_to_api)?;

    let response = codes
        .into_iter()
        .map(|code| qr_response(&state, code))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(response))
}

pub async fn get_qr_code(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let code = state
        .qr_codes
        .get(&principal, id)
        .await
        .map_err(qr_to_api)?;
    Ok(Json(qr_response(&state, code)?))
}

pub async fn create_qr_code(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
    Json(payload): Json<QrCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = state
        .qr_codes
        .create(&principal, brand_id, qr_command(payload))
        .await
        .map_err(qr_to_api)?;
    Ok((StatusCode::CREATED, Json(qr_response(&state, code)?)))
}

pub async fn update_qr_code(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QrCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = state
        .qr_codes
        .update(&principal, id, qr_command(payload))
        .await
        .map_err(qr_to_api)?;
    Ok(Json(qr_response(&state, code)?))
}

pub async fn delete_qr_code(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .qr_codes
        .delete(&principal, id)
        .await
        .map_err(qr_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

fn qr_response(state: &ApiState, code: QrCodeRecord) -> Result<QrCodeResponse, ApiError> {
    let image_url = state.qr_codes.image_url_for(&code).map_err(qr_to_api)?;
    Ok(QrCodeResponse {
        redirect_path: format!("/qr/{}", code.id),
        image_url: image_url.to_string(),
        code,
    })
}

fn qr_command(payload: QrCodeRequest) -> QrCodeCommand {
    QrCodeCommand {
        name: payload.name,
        target_kind: payload.target_kind,
        landing_page_id: payload.landing_page_id,
        external_url: payload.external_url,
        foreground_color: payload.foreground_color,
        background_color: payload.background_color,
        size: payload.size,
    }
}
