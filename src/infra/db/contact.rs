use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{ContactRepo, CreateContactParams, RepoError};
use crate::domain::entities::ContactSubmissionRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    landing_page_id: Option<Uuid>,
    name: String,
    email: String,
    message: String,
    created_at: OffsetDateTime,
}

impl From<SubmissionRow> for ContactSubmissionRecord {
    fn from(row: SubmissionRow) -> Self {
        Self {
            id: row.id,
            landing_page_id: row.landing_page_id,
            name: row.name,
            email: row.email,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ContactRepo for PostgresRepositories {
    async fn create_submission(
        &self,
        params: CreateContactParams,
    ) -> Result<ContactSubmissionRecord, RepoError> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            INSERT INTO contact_submissions (id, landing_page_id, name, email, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, landing_page_id, name, email, message, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.landing_page_id)
        .bind(params.name)
        .bind(params.email)
        .bind(params.message)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_submissions(
        &self,
        landing_page_id: Uuid,
    ) -> Result<Vec<ContactSubmissionRecord>, RepoError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, landing_page_id, name, email, message, created_at
            FROM contact_submissions
            WHERE landing_page_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(landing_page_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ContactSubmissionRecord::from).collect())
    }
}
