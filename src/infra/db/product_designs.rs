use async_trait::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{ProductDesignsRepo, RepoError, SaveDesignParams};
use crate::domain::entities::{DesignDocument, ProductDesignRecord};

use super::{PostgresRepositories, map_sqlx_error};

const DESIGN_COLUMNS: &str =
    "id, user_id, product_id, title, content, published, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct DesignRow {
    id: Uuid,
    user_id: Uuid,
    product_id: Option<Uuid>,
    title: String,
    content: Json<DesignDocument>,
    published: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<DesignRow> for ProductDesignRecord {
    fn from(row: DesignRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            title: row.title,
            content: row.content.0,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ProductDesignsRepo for PostgresRepositories {
    async fn list_designs(&self, user_id: Uuid) -> Result<Vec<ProductDesignRecord>, RepoError> {
        let rows = sqlx::query_as::<_, DesignRow>(&format!(
            "SELECT {DESIGN_COLUMNS} FROM product_designs WHERE user_id = $1 \
             ORDER BY updated_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProductDesignRecord::from).collect())
    }

    async fn find_design(&self, id: Uuid) -> Result<Option<ProductDesignRecord>, RepoError> {
        let row = sqlx::query_as::<_, DesignRow>(&format!(
            "SELECT {DESIGN_COLUMNS} FROM product_designs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProductDesignRecord::from))
    }

    async fn create_design(
        &self,
        params: SaveDesignParams,
    ) -> Result<ProductDesignRecord, RepoError> {
        let row = sqlx::query_as::<_, DesignRow>(&format!(
            r#"
            INSERT INTO product_designs (id, user_id, product_id, title, content, published,
                                         created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {DESIGN_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(params.user_id)
        .bind(params.product_id)
        .bind(params.title)
        .bind(Json(params.content))
        .bind(params.published)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_design(
        &self,
        id: Uuid,
        params: SaveDesignParams,
    ) -> Result<ProductDesignRecord, RepoError> {
        let row = sqlx::query_as::<_, DesignRow>(&format!(
            r#"
            UPDATE product_designs
            SET product_id = $2, title = $3, content = $4, published = $5, updated_at = $6
            WHERE id = $1
            RETURNING {DESIGN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(params.product_id)
        .bind(params.title)
        .bind(Json(params.content))
        .bind(params.published)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_design(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM product_designs WHERE id = $1")
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
