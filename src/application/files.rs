//! Uploaded file records. Bytes live in [`crate::infra::uploads::UploadStorage`].

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::brands::{AccessError, owned_brand};
use crate::application::repos::{BrandsRepo, CreateFileParams, FilesRepo, RepoError};
use crate::domain::entities::FileRecord;
use crate::domain::types::FileBucket;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found")]
    NotFound,
    #[error("file belongs to another user")]
    Forbidden,
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct RegisterFileCommand {
    pub brand_id: Option<Uuid>,
    pub bucket: FileBucket,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub stored_path: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

#[derive(Clone)]
pub struct FileService {
    files: Arc<dyn FilesRepo>,
    brands: Arc<dyn BrandsRepo>,
}

impl FileService {
    pub fn new(files: Arc<dyn FilesRepo>, brands: Arc<dyn BrandsRepo>) -> Self {
        Self { files, brands }
    }

    /// Files uploaded by the caller, optionally narrowed to one brand.
    pub async fn list(
        &self,
        principal: &Principal,
        brand_id: Option<Uuid>,
    ) -> Result<Vec<FileRecord>, FileError> {
        if let Some(brand_id) = brand_id {
            owned_brand(self.brands.as_ref(), principal, brand_id).await?;
        }
        Ok(self.files.list_files(principal.user_id, brand_id).await?)
    }

    /// Check that the caller may attach uploads to `brand_id`.
    pub async fn authorize_brand(
        &self,
        principal: &Principal,
        brand_id: Uuid,
    ) -> Result<(), FileError> {
        owned_brand(self.brands.as_ref(), principal, brand_id).await?;
        Ok(())
    }

    pub async fn register(
        &self,
        principal: &Principal,
        command: RegisterFileCommand,
    ) -> Result<FileRecord, FileError> {
        if let Some(brand_id) = command.brand_id {
            owned_brand(self.brands.as_ref(), principal, brand_id).await?;
        }

        let record = self
            .files
            .create_file(CreateFileParams {
                brand_id: command.brand_id,
                owner_id: principal.user_id,
                bucket: command.bucket,
                filename: command.filename,
                content_type: command.content_type,
                size_bytes: command.size_bytes,
                checksum: command.checksum,
                stored_path: command.stored_path,
                width: command.width,
                height: command.height,
            })
            .await?;
        Ok(record)
    }

    /// Delete the record and return it so the caller can drop the bytes.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<FileRecord, FileError> {
        let record = self.files.find_file(id).await?.ok_or(FileError::NotFound)?;
        if record.owner_id != principal.user_id {
            return Err(FileError::Forbidden);
        }
        self.files.delete_file(id).await?;
        Ok(record)
    }
}
