use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreateFileParams, FilesRepo, RepoError};
use crate::domain::entities::FileRecord;
use crate::domain::types::FileBucket;

use super::{PostgresRepositories, map_sqlx_error};

const FILE_COLUMNS: &str = "id, brand_id, owner_id, bucket, filename, content_type, size_bytes, \
     checksum, stored_path, width, height, created_at";

#[derive(sqlx::FromRow)]
struct FileRow {
    id: Uuid,
    brand_id: Option<Uuid>,
    owner_id: Uuid,
    bucket: String,
    filename: String,
    content_type: String,
    size_bytes: i64,
    checksum: String,
    stored_path: String,
    width: Option<i32>,
    height: Option<i32>,
    created_at: OffsetDateTime,
}

impl TryFrom<FileRow> for FileRecord {
    type Error = RepoError;

    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        let bucket = FileBucket::try_from(row.bucket.as_str()).map_err(|_| {
            RepoError::from_persistence(format!("unknown file bucket `{}`", row.bucket))
        })?;

        Ok(Self {
            id: row.id,
            brand_id: row.brand_id,
            owner_id: row.owner_id,
            bucket,
            filename: row.filename,
            content_type: row.content_type,
            size_bytes: row.size_bytes,
            checksum: row.checksum,
            stored_path: row.stored_path,
            width: row.width,
            height: row.height,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl FilesRepo for PostgresRepositories {
    async fn list_files(
        &self,
        owner_id: Uuid,
        brand_id: Option<Uuid>,
    ) -> Result<Vec<FileRecord>, RepoError> {
        let rows = sqlx::query_as::<_, FileRow>(&format!(
            r#"
            SELECT {FILE_COLUMNS}
            FROM files
            WHERE owner_id = $1 AND ($2::uuid IS NULL OR brand_id = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .bind(brand_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(FileRecord::try_from).collect()
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<FileRecord>, RepoError> {
        let row = sqlx::query_as::<_, FileRow>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(FileRecord::try_from).transpose()
    }

    async fn create_file(&self, params: CreateFileParams) -> Result<FileRecord, RepoError> {
        let row = sqlx::query_as::<_, FileRow>(&format!(
            r#"
            INSERT INTO files (id, brand_id, owner_id, bucket, filename, content_type, size_bytes,
                               checksum, stored_path, width, height, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {FILE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(params.brand_id)
        .bind(params.owner_id)
        .bind(params.bucket.as_str())
        .bind(params.filename)
        .bind(params.content_type)
        .bind(params.size_bytes)
        .bind(params.checksum)
        .bind(params.stored_path)
        .bind(params.width)
        .bind(params.height)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        FileRecord::try_from(row)
    }

    async fn delete_file(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
