use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{RecordVisitParams, RepoError, VisitsRepo};
use crate::domain::entities::LandingPageViewRecord;
use crate::domain::types::VisitSource;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ViewRow {
    id: Uuid,
    user_id: Uuid,
    landing_page_id: Uuid,
    source: VisitSource,
    qr_code_id: Option<Uuid>,
    visit_count: i32,
    first_visited_at: OffsetDateTime,
    last_visited_at: OffsetDateTime,
}

impl From<ViewRow> for LandingPageViewRecord {
    fn from(row: ViewRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            landing_page_id: row.landing_page_id,
            source: row.source,
            qr_code_id: row.qr_code_id,
            visit_count: row.visit_count,
            first_visited_at: row.first_visited_at,
            last_visited_at: row.last_visited_at,
        }
    }
}

#[async_trait]
impl VisitsRepo for PostgresRepositories {
    async fn upsert_visit(
        &self,
        params: RecordVisitParams,
    ) -> Result<LandingPageViewRecord, RepoError> {
        // The first visit fixes `source` and `qr_code_id`; repeats only count.
        let row = sqlx::query_as::<_, ViewRow>(
            r#"
            INSERT INTO landing_page_views (id, user_id, landing_page_id, source, qr_code_id,
                                            visit_count, first_visited_at, last_visited_at)
            VALUES ($1, $2, $3, $4, $5, 1, $6, $6)
            ON CONFLICT ON CONSTRAINT landing_page_views_user_page_key
            DO UPDATE SET visit_count = landing_page_views.visit_count + 1,
                          last_visited_at = EXCLUDED.last_visited_at
            RETURNING id, user_id, landing_page_id, source, qr_code_id, visit_count,
                      first_visited_at, last_visited_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.user_id)
        .bind(params.landing_page_id)
        .bind(params.source)
        .bind(params.qr_code_id)
        .bind(params.visited_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_views(
        &self,
        landing_page_id: Uuid,
    ) -> Result<Vec<LandingPageViewRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ViewRow>(
            r#"
            SELECT id, user_id, landing_page_id, source, qr_code_id, visit_count,
                   first_visited_at, last_visited_at
            FROM landing_page_views
            WHERE landing_page_id = $1
            ORDER BY last_visited_at DESC
            "#,
        )
        .bind(landing_page_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(LandingPageViewRecord::from).collect())
    }
}
