//! Landing pages: metadata CRUD plus row-per-component persistence.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::brands::{AccessError, owned_brand};
use crate::application::repos::{
    BrandsRepo, CreateLandingPageParams, LandingPagesRepo, RepoError, UpdateLandingPageParams,
};
use crate::domain::editor::{BlockEditor, ComponentInput, EditorError, blocks_from_page_components};
use crate::domain::entities::{LandingPageRecord, PageComponentRecord};
use crate::domain::error::require_text;
use crate::domain::qr::normalize_color;
use crate::domain::slug::{SlugAsyncError, SlugError, generate_unique_slug_async, validate_slug};

const DEFAULT_BACKGROUND: &str = "#ffffff";
const DEFAULT_FONT: &str = "Inter, sans-serif";

#[derive(Debug, Error)]
pub enum LandingPageError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("landing page not found")]
    NotFound,
    #[error(transparent)]
    Slug(#[from] SlugError),
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
pub struct CreateLandingPageCommand {
    pub brand_id: Uuid,
    pub title: String,
    pub slug: Option<String>,
    pub background_color: Option<String>,
    pub font_family: Option<String>,
    pub published: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateLandingPageCommand {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub background_color: Option<String>,
    pub font_family: Option<String>,
    pub published: Option<bool>,
}

/// A page with its components, ordered by position.
#[derive(Debug, Clone)]
pub struct LandingPageWithComponents {
    pub page: LandingPageRecord,
    pub components: Vec<PageComponentRecord>,
}

#[derive(Clone)]
pub struct LandingPageService {
    pages: Arc<dyn LandingPagesRepo>,
    brands: Arc<dyn BrandsRepo>,
}

impl LandingPageService {
    pub fn new(pages: Arc<dyn LandingPagesRepo>, brands: Arc<dyn BrandsRepo>) -> Self {
        Self { pages, brands }
    }

    pub async fn list(
        &self,
        principal: &Principal,
        brand_id: Uuid,
    ) -> Result<Vec<LandingPageRecord>, LandingPageError> {
        owned_brand(self.brands.as_ref(), principal, brand_id).await?;
        Ok(self.pages.list_pages(brand_id).await?)
    }

    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<LandingPageWithComponents, LandingPageError> {
        let page = self.owned_page(principal, id).await?;
        let components = self.pages.list_components(id).await?;
        Ok(LandingPageWithComponents { page, components })
    }

    pub async fn create(
        &self,
        principal: &Principal,
        command: CreateLandingPageCommand,
    ) -> Result<LandingPageRecord, LandingPageError> {
        let title = require_text("title", &command.title)
            .map_err(|_| LandingPageError::ConstraintViolation("title"))?;
        owned_brand(self.brands.as_ref(), principal, command.brand_id).await?;

        let slug = match command.slug.filter(|slug| !slug.trim().is_empty()) {
            Some(slug) => self.claim_slug(slug.trim(), None).await?,
            None => self.unique_slug(&title).await?,
        };

        let page = self
            .pages
            .create_page(CreateLandingPageParams {
                brand_id: command.brand_id,
                title,
                slug,
                background_color: page_color(command.background_color)?,
                font_family: page_font(command.font_family),
                published: command.published,
            })
            .await?;
        Ok(page)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        command: UpdateLandingPageCommand,
    ) -> Result<LandingPageRecord, LandingPageError> {
        let current = self.owned_page(principal, id).await?;

        let title = match command.title {
            Some(title) => require_text("title", &title)
                .map_err(|_| LandingPageError::ConstraintViolation("title"))?,
            None => current.title,
        };
        let slug = match command.slug {
            Some(slug) if slug.trim() != current.slug => {
                self.claim_slug(slug.trim(), Some(id)).await?
            }
            _ => current.slug,
        };
        let background_color = match command.background_color {
            Some(color) => page_color(Some(color))?,
            None => current.background_color,
        };
        let font_family = match command.font_family {
            Some(font) => page_font(Some(font)),
            None => current.font_family,
        };

        let page = self
            .pages
            .update_page(UpdateLandingPageParams {
                id,
                title,
                slug,
                background_color,
                font_family,
                published: command.published.unwrap_or(current.published),
            })
            .await?;
        Ok(page)
    }

    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), LandingPageError> {
        self.owned_page(principal, id).await?;
        self.pages.delete_page(id).await?;
        Ok(())
    }

    /// Load the stored components into an editor.
    pub async fn load_editor(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<BlockEditor, LandingPageError> {
        let page = self.owned_page(principal, id).await?;
        let rows = self.pages.list_components(id).await?;
        Ok(BlockEditor::from_blocks(blocks_from_page_components(
            &rows,
            page.brand_id,
        )))
    }

    /// Replace the page's components with the editor's blocks.
    ///
    /// Positions are written densely in editor order. The repository swaps the
    /// rows in one transaction, so a failure leaves the stored page unchanged.
    pub async fn save_editor(
        &self,
        principal: &Principal,
        id: Uuid,
        editor: &BlockEditor,
    ) -> Result<Vec<PageComponentRecord>, LandingPageError> {
        self.owned_page(principal, id).await?;
        let rows = editor.to_page_components(id)?;
        self.pages.replace_components(id, &rows).await?;
        Ok(rows)
    }

    /// Decode submitted components and save them.
    pub async fn save_components(
        &self,
        principal: &Principal,
        id: Uuid,
        inputs: Vec<ComponentInput>,
    ) -> Result<Vec<PageComponentRecord>, LandingPageError> {
        let page = self.owned_page(principal, id).await?;
        let editor = BlockEditor::from_inputs(inputs, Some(page.brand_id))?;
        self.save_editor(principal, id, &editor).await
    }

    /// A published page and its components, for public rendering.
    pub async fn find_published(
        &self,
        slug: &str,
    ) -> Result<Option<LandingPageWithComponents>, LandingPageError> {
        let Some(page) = self.pages.find_page_by_slug(slug).await? else {
            return Ok(None);
        };
        if !page.published {
            return Ok(None);
        }
        let components = self.pages.list_components(page.id).await?;
        Ok(Some(LandingPageWithComponents { page, components }))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LandingPageRecord>, LandingPageError> {
        Ok(self.pages.find_page(id).await?)
    }

    /// Load a page and check that `principal` owns its brand.
    pub async fn owned_page(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<LandingPageRecord, LandingPageError> {
        let page = self
            .pages
            .find_page(id)
            .await?
            .ok_or(LandingPageError::NotFound)?;
        owned_brand(self.brands.as_ref(), principal, page.brand_id).await?;
        Ok(page)
    }

    async fn claim_slug(&self, slug: &str, owner: Option<Uuid>) -> Result<String, LandingPageError> {
        validate_slug(slug)?;
        match self.pages.find_page_by_slug(slug).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(LandingPageError::ConstraintViolation("slug"))
            }
            _ => Ok(slug.to_string()),
        }
    }

    async fn unique_slug(&self, title: &str) -> Result<String, LandingPageError> {
        let pages = self.pages.clone();
        match generate_unique_slug_async(title, move |candidate| {
            let pages = pages.clone();
            let candidate = candidate.to_string();
            async move {
                pages
                    .find_page_by_slug(&candidate)
                    .await
                    .map(|existing| existing.is_none())
            }
        })
        .await
        {
            Ok(slug) => Ok(slug),
            Err(SlugAsyncError::Slug(err)) => Err(LandingPageError::Slug(err)),
            Err(SlugAsyncError::Predicate(err)) => Err(LandingPageError::Repo(err)),
        }
    }
}

fn page_color(color: Option<String>) -> Result<String, LandingPageError> {
    match color.filter(|value| !value.trim().is_empty()) {
        Some(value) => normalize_color(&value)
            .map_err(|_| LandingPageError::ConstraintViolation("backgroundColor")),
        None => Ok(DEFAULT_BACKGROUND.to_string()),
    }
}

fn page_font(font: Option<String>) -> String {
    font.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && !value.contains([';', '"', '<', '>', '{', '}']))
        .unwrap_or_else(|| DEFAULT_FONT.to_string())
}
