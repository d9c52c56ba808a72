//! Product designs: the whole block list is persisted as one JSON document.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::brands::{AccessError, owned_brand};
use crate::application::repos::{
    BrandsRepo, CatalogRepo, ProductDesignsRepo, RepoError, SaveDesignParams,
};
use crate::domain::editor::{
    BlockEditor, ComponentInput, EditorError, blocks_from_product_components,
};
use crate::domain::entities::{DesignDocument, PageSettings, ProductDesignRecord};
use crate::domain::error::require_text;
use crate::domain::qr::normalize_color;

#[derive(Debug, Error)]
pub enum ProductDesignError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("product design not found")]
    NotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("design belongs to another user")]
    Forbidden,
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("failed to encode components: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct SaveDesignCommand {
    pub title: String,
    pub product_id: Option<Uuid>,
    pub components: Vec<ComponentInput>,
    pub page_settings: Option<PageSettings>,
    pub published: bool,
}

#[derive(Clone)]
pub struct ProductDesignService {
    designs: Arc<dyn ProductDesignsRepo>,
    catalog: Arc<dyn CatalogRepo>,
    brands: Arc<dyn BrandsRepo>,
}

impl ProductDesignService {
    pub fn new(
        designs: Arc<dyn ProductDesignsRepo>,
        catalog: Arc<dyn CatalogRepo>,
        brands: Arc<dyn BrandsRepo>,
    ) -> Self {
        Self {
            designs,
            catalog,
            brands,
        }
    }

    pub async fn list(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ProductDesignRecord>, ProductDesignError> {
        Ok(self.designs.list_designs(principal.user_id).await?)
    }

    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<ProductDesignRecord, ProductDesignError> {
        self.owned_design(principal, id).await
    }

    pub async fn create(
        &self,
        principal: &Principal,
        command: SaveDesignCommand,
    ) -> Result<ProductDesignRecord, ProductDesignError> {
        let params = self.save_params(principal, command).await?;
        Ok(self.designs.create_design(params).await?)
    }

    /// Replace a design's document with the submitted components.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        command: SaveDesignCommand,
    ) -> Result<ProductDesignRecord, ProductDesignError> {
        self.owned_design(principal, id).await?;
        let params = self.save_params(principal, command).await?;
        Ok(self.designs.update_design(id, params).await?)
    }

    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), ProductDesignError> {
        self.owned_design(principal, id).await?;
        self.designs.delete_design(id).await?;
        Ok(())
    }

    pub async fn load_editor(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<(BlockEditor, PageSettings), ProductDesignError> {
        let design = self.owned_design(principal, id).await?;
        let blocks = blocks_from_product_components(&design.content.components);
        Ok((BlockEditor::from_blocks(blocks), design.content.page_settings))
    }

    /// Persist an editor's blocks as the design document.
    pub async fn save_editor(
        &self,
        principal: &Principal,
        id: Uuid,
        editor: &BlockEditor,
        page_settings: PageSettings,
    ) -> Result<ProductDesignRecord, ProductDesignError> {
        let current = self.owned_design(principal, id).await?;
        let content = DesignDocument {
            components: editor.to_product_components()?,
            page_settings,
        };
        Ok(self
            .designs
            .update_design(
                id,
                SaveDesignParams {
                    user_id: current.user_id,
                    product_id: current.product_id,
                    title: current.title,
                    content,
                    published: current.published,
                },
            )
            .await?)
    }

    /// A published design, for public rendering.
    pub async fn find_published(
        &self,
        id: Uuid,
    ) -> Result<Option<ProductDesignRecord>, ProductDesignError> {
        Ok(self
            .designs
            .find_design(id)
            .await?
            .filter(|design| design.published))
    }

    async fn owned_design(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<ProductDesignRecord, ProductDesignError> {
        let design = self
            .designs
            .find_design(id)
            .await?
            .ok_or(ProductDesignError::NotFound)?;
        if design.user_id != principal.user_id {
            return Err(ProductDesignError::Forbidden);
        }
        Ok(design)
    }

    async fn save_params(
        &self,
        principal: &Principal,
        command: SaveDesignCommand,
    ) -> Result<SaveDesignParams, ProductDesignError> {
        let title = require_text("title", &command.title)
            .map_err(|_| ProductDesignError::ConstraintViolation("title"))?;

        if let Some(product_id) = command.product_id {
            let product = self
                .catalog
                .find_product(product_id)
                .await?
                .ok_or(ProductDesignError::ProductNotFound)?;
            owned_brand(self.brands.as_ref(), principal, product.brand_id).await?;
        }

        let mut page_settings = command.page_settings.unwrap_or_default();
        page_settings.background_color = normalize_color(&page_settings.background_color)
            .map_err(|_| ProductDesignError::ConstraintViolation("backgroundColor"))?;

        let editor = BlockEditor::from_inputs(command.components, None)?;
        let content = DesignDocument {
            components: editor.to_product_components()?,
            page_settings,
        };

        Ok(SaveDesignParams {
            user_id: principal.user_id,
            product_id: command.product_id,
            title,
            content,
            published: command.published,
        })
    }
}
