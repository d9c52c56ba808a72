use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::repos::{BrandsRepo, CreateBrandParams, RepoError, UpdateBrandParams};
use crate::domain::entities::BrandRecord;
use crate::domain::error::{optional_text, require_text};
use crate::domain::qr::validate_external_url;
use crate::domain::slug::{SlugAsyncError, SlugError, generate_unique_slug_async};

/// Failure to resolve a brand the caller may act on.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("brand not found")]
    BrandNotFound,
    #[error("brand belongs to another user")]
    Forbidden,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Load a brand and check that `principal` owns it.
pub async fn owned_brand(
    brands: &dyn BrandsRepo,
    principal: &Principal,
    brand_id: Uuid,
) -> Result<BrandRecord, AccessError> {
    let brand = brands
        .find_brand(brand_id)
        .await?
        .ok_or(AccessError::BrandNotFound)?;

    if brand.owner_id != principal.user_id {
        return Err(AccessError::Forbidden);
    }
    Ok(brand)
}

#[derive(Debug, Error)]
pub enum BrandError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateBrandCommand {
    pub name: String,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateBrandCommand {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct BrandService {
    repo: Arc<dyn BrandsRepo>,
}

impl BrandService {
    pub fn new(repo: Arc<dyn BrandsRepo>) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> Arc<dyn BrandsRepo> {
        self.repo.clone()
    }

    pub async fn list(&self, principal: &Principal) -> Result<Vec<BrandRecord>, BrandError> {
        self.repo
            .list_brands(principal.user_id)
            .await
            .map_err(BrandError::from)
    }

    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<BrandRecord, BrandError> {
        Ok(owned_brand(self.repo.as_ref(), principal, id).await?)
    }

    pub async fn create(
        &self,
        principal: &Principal,
        command: CreateBrandCommand,
    ) -> Result<BrandRecord, BrandError> {
        let name = require_text("name", &command.name)
            .map_err(|_| BrandError::ConstraintViolation("name"))?;
        let website = normalize_website(command.website)?;

        let repo = self.repo.clone();
        let slug = match generate_unique_slug_async(&name, move |candidate| {
            let repo = repo.clone();
            let candidate = candidate.to_string();
            async move { repo.brand_slug_exists(&candidate).await.map(|exists| !exists) }
        })
        .await
        {
            Ok(slug) => slug,
            Err(SlugAsyncError::Slug(SlugError::Exhausted { .. })) => {
                return Err(BrandError::ConstraintViolation("slug"));
            }
            Err(SlugAsyncError::Slug(_)) => return Err(BrandError::ConstraintViolation("name")),
            Err(SlugAsyncError::Predicate(err)) => return Err(BrandError::Repo(err)),
        };

        let brand = self
            .repo
            .create_brand(CreateBrandParams {
                owner_id: principal.user_id,
                name,
                slug,
                logo_url: optional_text(command.logo_url),
                website,
                description: optional_text(command.description),
            })
            .await?;
        Ok(brand)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        command: UpdateBrandCommand,
    ) -> Result<BrandRecord, BrandError> {
        let current = owned_brand(self.repo.as_ref(), principal, id).await?;

        let name = match command.name {
            Some(name) => require_text("name", &name)
                .map_err(|_| BrandError::ConstraintViolation("name"))?,
            None => current.name,
        };
        let website = match command.website {
            Some(website) => normalize_website(Some(website))?,
            None => current.website,
        };
        let logo_url = match command.logo_url {
            Some(logo_url) => optional_text(Some(logo_url)),
            None => current.logo_url,
        };
        let description = match command.description {
            Some(description) => optional_text(Some(description)),
            None => current.description,
        };

        let brand = self
            .repo
            .update_brand(UpdateBrandParams {
                id,
                name,
                logo_url,
                website,
                description,
            })
            .await?;
        Ok(brand)
    }

    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), BrandError> {
        owned_brand(self.repo.as_ref(), principal, id).await?;
        self.repo.delete_brand(id).await?;
        Ok(())
    }
}

fn normalize_website(website: Option<String>) -> Result<Option<String>, BrandError> {
    optional_text(website)
        .map(|url| {
            validate_external_url(&url).map_err(|_| BrandError::ConstraintViolation("website"))
        })
        .transpose()
}
