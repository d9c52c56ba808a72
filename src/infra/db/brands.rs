use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{BrandsRepo, CreateBrandParams, RepoError, UpdateBrandParams};
use crate::domain::entities::BrandRecord;

use super::{PostgresRepositories, map_sqlx_error};

const BRAND_COLUMNS: &str =
    "id, owner_id, name, slug, logo_url, website, description, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BrandRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    slug: String,
    logo_url: Option<String>,
    website: Option<String>,
    description: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<BrandRow> for BrandRecord {
    fn from(row: BrandRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            slug: row.slug,
            logo_url: row.logo_url,
            website: row.website,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl BrandsRepo for PostgresRepositories {
    async fn list_brands(&self, owner_id: Uuid) -> Result<Vec<BrandRecord>, RepoError> {
        let rows = sqlx::query_as::<_, BrandRow>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BrandRecord::from).collect())
    }

    async fn find_brand(&self, id: Uuid) -> Result<Option<BrandRecord>, RepoError> {
        let row = sqlx::query_as::<_, BrandRow>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(BrandRecord::from))
    }

    async fn brand_slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM brands WHERE slug = $1)")
            .bind(slug)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_brand(&self, params: CreateBrandParams) -> Result<BrandRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, BrandRow>(&format!(
            r#"
            INSERT INTO brands (id, owner_id, name, slug, logo_url, website, description,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {BRAND_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(params.owner_id)
        .bind(params.name)
        .bind(params.slug)
        .bind(params.logo_url)
        .bind(params.website)
        .bind(params.description)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_brand(&self, params: UpdateBrandParams) -> Result<BrandRecord, RepoError> {
        let row = sqlx::query_as::<_, BrandRow>(&format!(
            r#"
            UPDATE brands
            SET name = $2, logo_url = $3, website = $4, description = $5, updated_at = $6
            WHERE id = $1
            RETURNING {BRAND_COLUMNS}
            "#
        ))
        .bind(params.id)
        .bind(params.name)
        .bind(params.logo_url)
        .bind(params.website)
        .bind(params.description)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_brand(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
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
