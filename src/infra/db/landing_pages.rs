use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateLandingPageParams, LandingPagesRepo, RepoError, UpdateLandingPageParams,
};
use crate::domain::entities::{LandingPageRecord, PageComponentRecord};

use super::{PostgresRepositories, map_sqlx_error};

const PAGE_COLUMNS: &str =
    "id, brand_id, title, slug, background_color, font_family, published, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct LandingPageRow {
    id: Uuid,
    brand_id: Uuid,
    title: String,
    slug: String,
    background_color: String,
    font_family: String,
    published: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<LandingPageRow> for LandingPageRecord {
    fn from(row: LandingPageRow) -> Self {
        Self {
            id: row.id,
            brand_id: row.brand_id,
            title: row.title,
            slug: row.slug,
            background_color: row.background_color,
            font_family: row.font_family,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ComponentRow {
    id: Uuid,
    page_id: Uuid,
    component_type: String,
    content: sqlx::types::Json<Value>,
    styles: sqlx::types::Json<Value>,
    position: i32,
    is_active: bool,
}

impl From<ComponentRow> for PageComponentRecord {
    fn from(row: ComponentRow) -> Self {
        Self {
            id: row.id,
            page_id: row.page_id,
            component_type: row.component_type,
            content: row.content.0,
            styles: row.styles.0,
            position: row.position,
            is_active: row.is_active,
        }
    }
}

#[async_trait]
impl LandingPagesRepo for PostgresRepositories {
    async fn list_pages(&self, brand_id: Uuid) -> Result<Vec<LandingPageRecord>, RepoError> {
        let rows = sqlx::query_as::<_, LandingPageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM landing_pages WHERE brand_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(brand_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(LandingPageRecord::from).collect())
    }

    async fn find_page(&self, id: Uuid) -> Result<Option<LandingPageRecord>, RepoError> {
        let row = sqlx::query_as::<_, LandingPageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM landing_pages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(LandingPageRecord::from))
    }

    async fn find_page_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<LandingPageRecord>, RepoError> {
        let row = sqlx::query_as::<_, LandingPageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM landing_pages WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(LandingPageRecord::from))
    }

    async fn create_page(
        &self,
        params: CreateLandingPageParams,
    ) -> Result<LandingPageRecord, RepoError> {
        let row = sqlx::query_as::<_, LandingPageRow>(&format!(
            r#"
            INSERT INTO landing_pages (id, brand_id, title, slug, background_color, font_family,
                                       published, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(params.brand_id)
        .bind(params.title)
        .bind(params.slug)
        .bind(params.background_color)
        .bind(params.font_family)
        .bind(params.published)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_page(
        &self,
        params: UpdateLandingPageParams,
    ) -> Result<LandingPageRecord, RepoError> {
        let row = sqlx::query_as::<_, LandingPageRow>(&format!(
            r#"
            UPDATE landing_pages
            SET title = $2, slug = $3, background_color = $4, font_family = $5,
                published = $6, updated_at = $7
            WHERE id = $1
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(params.id)
        .bind(params.title)
        .bind(params.slug)
        .bind(params.background_color)
        .bind(params.font_family)
        .bind(params.published)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_page(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM landing_pages WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_components(
        &self,
        page_id: Uuid,
    ) -> Result<Vec<PageComponentRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ComponentRow>(
            r#"
            SELECT id, page_id, component_type, content, styles, position, is_active
            FROM page_components
            WHERE page_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(page_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PageComponentRecord::from).collect())
    }

    async fn replace_components(
        &self,
        page_id: Uuid,
        components: &[PageComponentRecord],
    ) -> Result<(), RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM page_components WHERE page_id = $1")
            .bind(page_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        for component in components {
            sqlx::query(
                r#"
                INSERT INTO page_components (id, page_id, component_type, content, styles,
                                             position, is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(component.id)
            .bind(page_id)
            .bind(&component.component_type)
            .bind(sqlx::types::Json(&component.content))
            .bind(sqlx::types::Json(&component.styles))
            .bind(component.position)
            .bind(component.is_active)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        sqlx::query("UPDATE landing_pages SET updated_at = $2 WHERE id = $1")
            .bind(page_id)
            .bind(OffsetDateTime::now_utc())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}
