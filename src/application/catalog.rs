//! Products, categories and subcategories of a brand.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::brands::{AccessError, owned_brand};
use crate::application::repos::{BrandsRepo, CatalogRepo, ProductParams, RepoError};
use crate::domain::entities::{CategoryRecord, ProductRecord, SubcategoryRecord};
use crate::domain::error::{optional_text, require_text};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct ProductCommand {
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub image_url: Option<String>,
    pub sku: Option<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepo>,
    brands: Arc<dyn BrandsRepo>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogRepo>, brands: Arc<dyn BrandsRepo>) -> Self {
        Self { catalog, brands }
    }

    pub async fn list_categories(
        &self,
        principal: &Principal,
        brand_id: Uuid,
    ) -> Result<Vec<CategoryRecord>, CatalogError> {
        owned_brand(self.brands.as_ref(), principal, brand_id).await?;
        Ok(self.catalog.list_categories(brand_id).await?)
    }

    pub async fn create_category(
        &self,
        principal: &Principal,
        brand_id: Uuid,
        name: &str,
    ) -> Result<CategoryRecord, CatalogError> {
        let name = category_name(name)?;
        owned_brand(self.brands.as_ref(), principal, brand_id).await?;
        Ok(self.catalog.create_category(brand_id, &name).await?)
    }

    pub async fn rename_category(
        &self,
        principal: &Principal,
        id: Uuid,
        name: &str,
    ) -> Result<CategoryRecord, CatalogError> {
        let name = category_name(name)?;
        self.owned_category(principal, id).await?;
        Ok(self.catalog.rename_category(id, &name).await?)
    }

    pub async fn delete_category(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<(), CatalogError> {
        self.owned_category(principal, id).await?;
        Ok(self.catalog.delete_category(id).await?)
    }

    pub async fn list_subcategories(
        &self,
        principal: &Principal,
        category_id: Uuid,
    ) -> Result<Vec<SubcategoryRecord>, CatalogError> {
        self.owned_category(principal, category_id).await?;
        Ok(self.catalog.list_subcategories(category_id).await?)
    }

    pub async fn create_subcategory(
        &self,
        principal: &Principal,
        category_id: Uuid,
        name: &str,
    ) -> Result<SubcategoryRecord, CatalogError> {
        let name = category_name(name)?;
        self.owned_category(principal, category_id).await?;
        Ok(self.catalog.create_subcategory(category_id, &name).await?)
    }

    pub async fn rename_subcategory(
        &self,
        principal: &Principal,
        id: Uuid,
        name: &str,
    ) -> Result<SubcategoryRecord, CatalogError> {
        let name = category_name(name)?;
        self.owned_subcategory(principal, id).await?;
        Ok(self.catalog.rename_subcategory(id, &name).await?)
    }

    pub async fn delete_subcategory(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<(), CatalogError> {
        self.owned_subcategory(principal, id).await?;
        Ok(self.catalog.delete_subcategory(id).await?)
    }

    pub async fn list_products(
        &self,
        principal: &Principal,
        brand_id: Uuid,
    ) -> Result<Vec<ProductRecord>, CatalogError> {
        owned_brand(self.brands.as_ref(), principal, brand_id).await?;
        Ok(self.catalog.list_products(brand_id).await?)
    }

    pub async fn get_product(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<ProductRecord, CatalogError> {
        self.owned_product(principal, id).await
    }

    pub async fn create_product(
        &self,
        principal: &Principal,
        brand_id: Uuid,
        command: ProductCommand,
    ) -> Result<ProductRecord, CatalogError> {
        owned_brand(self.brands.as_ref(), principal, brand_id).await?;
        let params = self.product_params(brand_id, command).await?;
        Ok(self.catalog.create_product(params).await?)
    }

    pub async fn update_product(
        &self,
        principal: &Principal,
        id: Uuid,
        command: ProductCommand,
    ) -> Result<ProductRecord, CatalogError> {
        let current = self.owned_product(principal, id).await?;
        let params = self.product_params(current.brand_id, command).await?;
        Ok(self.catalog.update_product(id, params).await?)
    }

    pub async fn delete_product(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<(), CatalogError> {
        self.owned_product(principal, id).await?;
        Ok(self.catalog.delete_product(id).await?)
    }

    async fn product_params(
        &self,
        brand_id: Uuid,
        command: ProductCommand,
    ) -> Result<ProductParams, CatalogError> {
        let name = require_text("name", &command.name)
            .map_err(|_| CatalogError::ConstraintViolation("name"))?;
        if command.price_cents.is_some_and(|price| price < 0) {
            return Err(CatalogError::ConstraintViolation("price"));
        }

        if let Some(category_id) = command.category_id {
            let category = self
                .catalog
                .find_category(category_id)
                .await?
                .ok_or(CatalogError::NotFound("category"))?;
            if category.brand_id != brand_id {
                return Err(CatalogError::ConstraintViolation("category"));
            }
        }

        if let Some(subcategory_id) = command.subcategory_id {
            let subcategory = self
                .catalog
                .find_subcategory(subcategory_id)
                .await?
                .ok_or(CatalogError::NotFound("subcategory"))?;
            if Some(subcategory.category_id) != command.category_id {
                return Err(CatalogError::ConstraintViolation("subcategory"));
            }
        }

        Ok(ProductParams {
            brand_id,
            category_id: command.category_id,
            subcategory_id: command.subcategory_id,
            name,
            description: optional_text(command.description).unwrap_or_default(),
            price_cents: command.price_cents,
            image_url: optional_text(command.image_url),
            sku: optional_text(command.sku),
        })
    }

    async fn owned_category(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<CategoryRecord, CatalogError> {
        let category = self
            .catalog
            .find_category(id)
            .await?
            .ok_or(CatalogError::NotFound("category"))?;
        owned_brand(self.brands.as_ref(), principal, category.brand_id).await?;
        Ok(category)
    }

    async fn owned_subcategory(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<SubcategoryRecord, CatalogError> {
        let subcategory = self
            .catalog
            .find_subcategory(id)
            .await?
            .ok_or(CatalogError::NotFound("subcategory"))?;
        self.owned_category(principal, subcategory.category_id)
            .await?;
        Ok(subcategory)
    }

    async fn owned_product(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<ProductRecord, CatalogError> {
        let product = self
            .catalog
            .find_product(id)
            .await?
            .ok_or(CatalogError::NotFound("product"))?;
        owned_brand(self.brands.as_ref(), principal, product.brand_id).await?;
        Ok(product)
    }
}

fn category_name(name: &str) -> Result<String, CatalogError> {
    require_text("name", name).map_err(|_| CatalogError::ConstraintViolation("name"))
}
