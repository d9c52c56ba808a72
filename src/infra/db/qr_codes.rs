use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{QrCodeParams, QrCodesRepo, RecordScanParams, RepoError};
use crate::domain::entities::{QrCodeRecord, QrScanRecord};
use crate::domain::types::QrTargetKind;

use super::{PostgresRepositories, map_sqlx_error};

const QR_COLUMNS: &str = "id, brand_id, name, target_kind, landing_page_id, external_url, \
     foreground_color, background_color, size, scan_count, view_count, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct QrCodeRow {
    id: Uuid,
    brand_id: Uuid,
    name: String,
    target_kind: QrTargetKind,
    landing_page_id: Option<Uuid>,
    external_url: Option<String>,
    foreground_color: String,
    background_color: String,
    size: i32,
    scan_count: i64,
    view_count: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<QrCodeRow> for QrCodeRecord {
    fn from(row: QrCodeRow) -> Self {
        Self {
            id: row.id,
            brand_id: row.brand_id,
            name: row.name,
            target_kind: row.target_kind,
            landing_page_id: row.landing_page_id,
            external_url: row.external_url,
            foreground_color: row.foreground_color,
            background_color: row.background_color,
            size: row.size,
            scan_count: row.scan_count,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct QrScanRow {
    id: Uuid,
    qr_code_id: Uuid,
    user_id: Option<Uuid>,
    user_agent: Option<String>,
    scanned_at: OffsetDateTime,
}

impl From<QrScanRow> for QrScanRecord {
    fn from(row: QrScanRow) -> Self {
        Self {
            id: row.id,
            qr_code_id: row.qr_code_id,
            user_id: row.user_id,
            user_agent: row.user_agent,
            scanned_at: row.scanned_at,
        }
    }
}

#[async_trait]
impl QrCodesRepo for PostgresRepositories {
    async fn list_qr_codes(&self, brand_id: Uuid) -> Result<Vec<QrCodeRecord>, RepoError> {
        let rows = sqlx::query_as::<_, QrCodeRow>(&format!(
            "SELECT {QR_COLUMNS} FROM qr_codes WHERE brand_id = $1 ORDER BY created_at DESC"
        ))
        .bind(brand_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(QrCodeRecord::from).collect())
    }

    async fn find_qr_code(&self, id: Uuid) -> Result<Option<QrCodeRecord>, RepoError> {
        let row = sqlx::query_as::<_, QrCodeRow>(&format!(
            "SELECT {QR_COLUMNS} FROM qr_codes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(QrCodeRecord::from))
    }

    async fn create_qr_code(&self, params: QrCodeParams) -> Result<QrCodeRecord, RepoError> {
        let row = sqlx::query_as::<_, QrCodeRow>(&format!(
            r#"
            INSERT INTO qr_codes (id, brand_id, name, target_kind, landing_page_id, external_url,
                                  foreground_color, background_color, size,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING {QR_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(params.brand_id)
        .bind(params.name)
        .bind(params.target_kind)
        .bind(params.landing_page_id)
        .bind(params.external_url)
        .bind(params.foreground_color)
        .bind(params.background_color)
        .bind(params.size)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_qr_code(
        &self,
        id: Uuid,
        params: QrCodeParams,
    ) -> Result<QrCodeRecord, RepoError> {
        let row = sqlx::query_as::<_, QrCodeRow>(&format!(
            r#"
            UPDATE qr_codes
            SET name = $2, target_kind = $3, landing_page_id = $4, external_url = $5,
                foreground_color = $6, background_color = $7, size = $8, updated_at = $9
            WHERE id = $1
            RETURNING {QR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(params.name)
        .bind(params.target_kind)
        .bind(params.landing_page_id)
        .bind(params.external_url)
        .bind(params.foreground_color)
        .bind(params.background_color)
        .bind(params.size)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_qr_code(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM qr_codes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn record_scan(&self, params: RecordScanParams) -> Result<QrScanRecord, RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, QrScanRow>(
            r#"
            INSERT INTO qr_scans (id, qr_code_id, user_id, user_agent, scanned_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, qr_code_id, user_id, user_agent, scanned_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.qr_code_id)
        .bind(params.user_id)
        .bind(params.user_agent)
        .bind(params.scanned_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query("UPDATE qr_codes SET scan_count = scan_count + 1 WHERE id = $1")
            .bind(params.qr_code_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("UPDATE qr_codes SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
