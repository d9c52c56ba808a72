//! File library and upload handlers

use axum::Json;
use axum::extract::{Extension, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::files::RegisterFileCommand;
use crate::domain::types::FileBucket;

use super::{file_to_api, upload_storage_to_api};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{FileListQuery, FileResponse};
use crate::infra::http::api::state::ApiState;

const OCTET_STREAM: &str = "application/octet-stream";

pub async fn list_files(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<FileListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let files = state
        .files
        .list(&principal, query.brand_id)
        .await
        .map_err(file_to_api)?;
    Ok(Json(
        files.into_iter().map(FileResponse::from).collect::<Vec<_>>(),
    ))
}

pub async fn list_brand_files(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let files = state
        .files
        .list(&principal, Some(brand_id))
        .await
        .map_err(file_to_api)?;
    Ok(Json(
        files.into_iter().map(FileResponse::from).collect::<Vec<_>>(),
    ))
}

/// Multipart upload into a brand's public file library.
pub async fn upload_brand_file(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(brand_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = read_upload_form(multipart).await?;
    form.brand_id = Some(brand_id);
    form.bucket.get_or_insert(FileBucket::Public);
    store_upload(&state, &principal, form).await
}

/// Generic multipart upload. Optional text fields: `bucket` (defaults to
/// `product-images`) and `brandId`.
pub async fn upload_file(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_upload_form(multipart).await?;
    store_upload(&state, &principal, form).await
}

pub async fn delete_file(
    State(state): State<ApiState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .files
        .delete(&principal, id)
        .await
        .map_err(file_to_api)?;

    let _ = state.upload_storage.delete(&record.stored_path).await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Default)]
struct UploadForm {
    filename: Option<String>,
    content_type: Option<String>,
    data: Option<Bytes>,
    bucket: Option<FileBucket>,
    brand_id: Option<Uuid>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request("invalid multipart payload", Some(err.to_string())))?
    {
        match field.name() {
            Some("file") => {
                form.filename = field.file_name().map(|s| s.to_string());
                form.content_type = field.content_type().map(|s| s.to_string());
                form.data = Some(field.bytes().await.map_err(|err| {
                    ApiError::bad_request("failed to read upload", Some(err.to_string()))
                })?);
            }
            Some("bucket") => {
                let raw = field_text(field).await?;
                let bucket = FileBucket::try_from(raw.trim())
                    .map_err(|_| ApiError::bad_request("unknown bucket", Some(raw.clone())))?;
                form.bucket = Some(bucket);
            }
            Some("brandId") => {
                let raw = field_text(field).await?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    let brand_id = Uuid::parse_str(raw).map_err(|err| {
                        ApiError::bad_request("invalid brandId", Some(err.to_string()))
                    })?;
                    form.brand_id = Some(brand_id);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|err| ApiError::bad_request("invalid multipart field", Some(err.to_string())))
}

async fn store_upload(
    state: &ApiState,
    principal: &Principal,
    form: UploadForm,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    let filename = form
        .filename
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("missing file", None))?;
    let data = form
        .data
        .ok_or_else(|| ApiError::bad_request("missing file", None))?;
    let bucket = form.bucket.unwrap_or(FileBucket::ProductImages);

    // Ownership is checked before any bytes reach disk.
    if let Some(brand_id) = form.brand_id {
        state
            .files
            .authorize_brand(principal, brand_id)
            .await
            .map_err(file_to_api)?;
    }

    let scope = form.brand_id.unwrap_or(principal.user_id);
    let stored = state
        .upload_storage
        .store(bucket, scope, &filename, data)
        .await
        .map_err(upload_storage_to_api)?;

    let content_type = match form.content_type {
        Some(declared) if stored.content_type == OCTET_STREAM && !declared.is_empty() => declared,
        _ => stored.content_type.clone(),
    };

    let command = RegisterFileCommand {
        brand_id: form.brand_id,
        bucket: stored.bucket,
        filename,
        content_type,
        size_bytes: stored.size_bytes,
        checksum: stored.checksum,
        stored_path: stored.stored_path.clone(),
        width: stored.width,
        height: stored.height,
    };

    match state.files.register(principal, command).await {
        Ok(record) => Ok((StatusCode::CREATED, Json(FileResponse::from(record)))),
        Err(err) => {
            let _ = state.upload_storage.delete(&stored.stored_path).await;
            Err(file_to_api(err))
        }
    }
}
