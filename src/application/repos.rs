//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{
    BrandRecord, CategoryRecord, ContactSubmissionRecord, DesignDocument, FileRecord,
    LandingPageRecord, LandingPageViewRecord, PageComponentRecord, ProductDesignRecord,
    ProductRecord, QrCodeRecord, QrScanRecord, SessionRecord, SubcategoryRecord, UserRecord,
};
use crate::domain::types::{FileBucket, QrTargetKind, VisitSource};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn find_session(&self, token_hash: &str) -> Result<Option<SessionRecord>, RepoError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    async fn delete_session(&self, token_hash: &str) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateBrandParams {
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateBrandParams {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[async_trait]
pub trait BrandsRepo: Send + Sync {
    async fn list_brands(&self, owner_id: Uuid) -> Result<Vec<BrandRecord>, RepoError>;

    async fn find_brand(&self, id: Uuid) -> Result<Option<BrandRecord>, RepoError>;

    async fn brand_slug_exists(&self, slug: &str) -> Result<bool, RepoError>;

    async fn create_brand(&self, params: CreateBrandParams) -> Result<BrandRecord, RepoError>;

    async fn update_brand(&self, params: UpdateBrandParams) -> Result<BrandRecord, RepoError>;

    async fn delete_brand(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct ProductParams {
    pub brand_id: Uuid,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub price_cents: Option<i64>,
    pub image_url: Option<String>,
    pub sku: Option<String>,
}

#[async_trait]
pub trait CatalogRepo: Send + Sync {
    async fn list_categories(&self, brand_id: Uuid) -> Result<Vec<CategoryRecord>, RepoError>;

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError>;

    async fn create_category(&self, brand_id: Uuid, name: &str)
    -> Result<CategoryRecord, RepoError>;

    async fn rename_category(&self, id: Uuid, name: &str) -> Result<CategoryRecord, RepoError>;

    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError>;

    async fn list_subcategories(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<SubcategoryRecord>, RepoError>;

    async fn find_subcategory(&self, id: Uuid) -> Result<Option<SubcategoryRecord>, RepoError>;

    async fn create_subcategory(
        &self,
        category_id: Uuid,
        name: &str,
    ) -> Result<SubcategoryRecord, RepoError>;

    async fn rename_subcategory(
        &self,
        id: Uuid,
        name: &str,
    ) -> Result<SubcategoryRecord, RepoError>;

    async fn delete_subcategory(&self, id: Uuid) -> Result<(), RepoError>;

    async fn list_products(&self, brand_id: Uuid) -> Result<Vec<ProductRecord>, RepoError>;

    async fn find_product(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError>;

    async fn create_product(&self, params: ProductParams) -> Result<ProductRecord, RepoError>;

    async fn update_product(
        &self,
        id: Uuid,
        params: ProductParams,
    ) -> Result<ProductRecord, RepoError>;

    async fn delete_product(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateFileParams {
    pub brand_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub bucket: FileBucket,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub stored_path: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

#[async_trait]
pub trait FilesRepo: Send + Sync {
    async fn list_files(
        &self,
        owner_id: Uuid,
        brand_id: Option<Uuid>,
    ) -> Result<Vec<FileRecord>, RepoError>;

    async fn find_file(&self, id: Uuid) -> Result<Option<FileRecord>, RepoError>;

    async fn create_file(&self, params: CreateFileParams) -> Result<FileRecord, RepoError>;

    async fn delete_file(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateLandingPageParams {
    pub brand_id: Uuid,
    pub title: String,
    pub slug: String,
    pub background_color: String,
    pub font_family: String,
    pub published: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateLandingPageParams {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub background_color: String,
    pub font_family: String,
    pub published: bool,
}

#[async_trait]
pub trait LandingPagesRepo: Send + Sync {
    async fn list_pages(&self, brand_id: Uuid) -> Result<Vec<LandingPageRecord>, RepoError>;

    async fn find_page(&self, id: Uuid) -> Result<Option<LandingPageRecord>, RepoError>;

    async fn find_page_by_slug(&self, slug: &str)
    -> Result<Option<LandingPageRecord>, RepoError>;

    async fn create_page(
        &self,
        params: CreateLandingPageParams,
    ) -> Result<LandingPageRecord, RepoError>;

    async fn update_page(
        &self,
        params: UpdateLandingPageParams,
    ) -> Result<LandingPageRecord, RepoError>;

    async fn delete_page(&self, id: Uuid) -> Result<(), RepoError>;

    /// Components ordered by `position`.
    async fn list_components(&self, page_id: Uuid)
    -> Result<Vec<PageComponentRecord>, RepoError>;

    /// Replace every component of a page atomically.
    async fn replace_components(
        &self,
        page_id: Uuid,
        components: &[PageComponentRecord],
    ) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct SaveDesignParams {
    pub user_id: Uuid,
    pub product_id: Option<Uuid>,
    pub title: String,
    pub content: DesignDocument,
    pub published: bool,
}

#[async_trait]
pub trait ProductDesignsRepo: Send + Sync {
    async fn list_designs(&self, user_id: Uuid) -> Result<Vec<ProductDesignRecord>, RepoError>;

    async fn find_design(&self, id: Uuid) -> Result<Option<ProductDesignRecord>, RepoError>;

    async fn create_design(&self, params: SaveDesignParams)
    -> Result<ProductDesignRecord, RepoError>;

    async fn update_design(
        &self,
        id: Uuid,
        params: SaveDesignParams,
    ) -> Result<ProductDesignRecord, RepoError>;

    async fn delete_design(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct QrCodeParams {
    pub brand_id: Uuid,
    pub name: String,
    pub target_kind: QrTargetKind,
    pub landing_page_id: Option<Uuid>,
    pub external_url: Option<String>,
    pub foreground_color: String,
    pub background_color: String,
    pub size: i32,
}

#[derive(Debug, Clone)]
pub struct RecordScanParams {
    pub qr_code_id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_agent: Option<String>,
    pub scanned_at: OffsetDateTime,
}

#[async_trait]
pub trait QrCodesRepo: Send + Sync {
    async fn list_qr_codes(&self, brand_id: Uuid) -> Result<Vec<QrCodeRecord>, RepoError>;

    async fn find_qr_code(&self, id: Uuid) -> Result<Option<QrCodeRecord>, RepoError>;

    async fn create_qr_code(&self, params: QrCodeParams) -> Result<QrCodeRecord, RepoError>;

    async fn update_qr_code(
        &self,
        id: Uuid,
        params: QrCodeParams,
    ) -> Result<QrCodeRecord, RepoError>;

    async fn delete_qr_code(&self, id: Uuid) -> Result<(), RepoError>;

    /// Insert a scan row and bump the code's `scan_count` in one transaction.
    async fn record_scan(&self, params: RecordScanParams) -> Result<QrScanRecord, RepoError>;

    async fn increment_view_count(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct RecordVisitParams {
    pub user_id: Uuid,
    pub landing_page_id: Uuid,
    pub source: VisitSource,
    pub qr_code_id: Option<Uuid>,
    pub visited_at: OffsetDateTime,
}

#[async_trait]
pub trait VisitsRepo: Send + Sync {
    /// Insert the first visit for `(user, page)` or bump `visit_count` and
    /// `last_visited_at` of the existing row.
    async fn upsert_visit(
        &self,
        params: RecordVisitParams,
    ) -> Result<LandingPageViewRecord, RepoError>;

    async fn list_views(&self, landing_page_id: Uuid)
    -> Result<Vec<LandingPageViewRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateContactParams {
    pub landing_page_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub message: String,
}

#[async_trait]
pub trait ContactRepo: Send + Sync {
    async fn create_submission(
        &self,
        params: CreateContactParams,
    ) -> Result<ContactSubmissionRecord, RepoError>;

    async fn list_submissions(
        &self,
        landing_page_id: Uuid,
    ) -> Result<Vec<ContactSubmissionRecord>, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
