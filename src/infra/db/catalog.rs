use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CatalogRepo, ProductParams, RepoError};
use crate::domain::entities::{CategoryRecord, ProductRecord, SubcategoryRecord};

use super::{PostgresRepositories, map_sqlx_error};

const PRODUCT_COLUMNS: &str = "id, brand_id, category_id, subcategory_id, name, description, \
     price_cents, image_url, sku, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    brand_id: Uuid,
    name: String,
    created_at: OffsetDateTime,
}

impl From<CategoryRow> for CategoryRecord {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            brand_id: row.brand_id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubcategoryRow {
    id: Uuid,
    category_id: Uuid,
    name: String,
    created_at: OffsetDateTime,
}

impl From<SubcategoryRow> for SubcategoryRecord {
    fn from(row: SubcategoryRow) -> Self {
        Self {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    brand_id: Uuid,
    category_id: Option<Uuid>,
    subcategory_id: Option<Uuid>,
    name: String,
    description: String,
    price_cents: Option<i64>,
    image_url: Option<String>,
    sku: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            brand_id: row.brand_id,
            category_id: row.category_id,
            subcategory_id: row.subcategory_id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            image_url: row.image_url,
            sku: row.sku,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

async fn delete_by_id(
    repos: &PostgresRepositories,
    statement: &'static str,
    id: Uuid,
) -> Result<(), RepoError> {
    let result = sqlx::query(statement)
        .bind(id)
        .execute(repos.pool())
        .await
        .map_err(map_sqlx_error)?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound);
    }
    Ok(())
}

#[async_trait]
impl CatalogRepo for PostgresRepositories {
    async fn list_categories(&self, brand_id: Uuid) -> Result<Vec<CategoryRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, brand_id, name, created_at
            FROM product_categories
            WHERE brand_id = $1
            ORDER BY name
            "#,
        )
        .bind(brand_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CategoryRecord::from).collect())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, brand_id, name, created_at FROM product_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CategoryRecord::from))
    }

    async fn create_category(
        &self,
        brand_id: Uuid,
        name: &str,
    ) -> Result<CategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO product_categories (id, brand_id, name, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, brand_id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(brand_id)
        .bind(name)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn rename_category(&self, id: Uuid, name: &str) -> Result<CategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE product_categories SET name = $2
            WHERE id = $1
            RETURNING id, brand_id, name, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError> {
        delete_by_id(self, "DELETE FROM product_categories WHERE id = $1", id).await
    }

    async fn list_subcategories(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<SubcategoryRecord>, RepoError> {
        let rows = sqlx::query_as::<_, SubcategoryRow>(
            r#"
            SELECT id, category_id, name, created_at
            FROM product_subcategories
            WHERE category_id = $1
            ORDER BY name
            "#,
        )
        .bind(category_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(SubcategoryRecord::from).collect())
    }

    async fn find_subcategory(&self, id: Uuid) -> Result<Option<SubcategoryRecord>, RepoError> {
        let row = sqlx::query_as::<_, SubcategoryRow>(
            "SELECT id, category_id, name, created_at FROM product_subcategories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(SubcategoryRecord::from))
    }

    async fn create_subcategory(
        &self,
        category_id: Uuid,
        name: &str,
    ) -> Result<SubcategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, SubcategoryRow>(
            r#"
            INSERT INTO product_subcategories (id, category_id, name, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, category_id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category_id)
        .bind(name)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn rename_subcategory(
        &self,
        id: Uuid,
        name: &str,
    ) -> Result<SubcategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, SubcategoryRow>(
            r#"
            UPDATE product_subcategories SET name = $2
            WHERE id = $1
            RETURNING id, category_id, name, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_subcategory(&self, id: Uuid) -> Result<(), RepoError> {
        delete_by_id(self, "DELETE FROM product_subcategories WHERE id = $1", id).await
    }

    async fn list_products(&self, brand_id: Uuid) -> Result<Vec<ProductRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE brand_id = $1 ORDER BY name"
        ))
        .bind(brand_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProductRecord::from))
    }

    async fn create_product(&self, params: ProductParams) -> Result<ProductRecord, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (id, brand_id, category_id, subcategory_id, name, description,
                                  price_cents, image_url, sku, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(params.brand_id)
        .bind(params.category_id)
        .bind(params.subcategory_id)
        .bind(params.name)
        .bind(params.description)
        .bind(params.price_cents)
        .bind(params.image_url)
        .bind(params.sku)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_product(
        &self,
        id: Uuid,
        params: ProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET category_id = $2, subcategory_id = $3, name = $4, description = $5,
                price_cents = $6, image_url = $7, sku = $8, updated_at = $9
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(params.category_id)
        .bind(params.subcategory_id)
        .bind(params.name)
        .bind(params.description)
        .bind(params.price_cents)
        .bind(params.image_url)
        .bind(params.sku)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError> {
        delete_by_id(self, "DELETE FROM products WHERE id = $1", id).await
    }
}
