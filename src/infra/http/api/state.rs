use std::sync::Arc;

use crate::application::auth::SessionService;
use crate::application::brands::BrandService;
use crate::application::catalog::CatalogService;
use crate::application::contact::ContactService;
use crate::application::files::FileService;
use crate::application::landing_pages::LandingPageService;
use crate::application::product_designs::ProductDesignService;
use crate::application::qr_codes::QrCodeService;
use crate::application::visits::VisitService;
use crate::infra::uploads::UploadStorage;

use super::rate_limit::ApiRateLimiter;

#[derive(Clone)]
pub struct ApiState {
    pub sessions: SessionService,
    pub brands: Arc<BrandService>,
    pub catalog: Arc<CatalogService>,
    pub landing_pages: Arc<LandingPageService>,
    pub designs: Arc<ProductDesignService>,
    pub qr_codes: Arc<QrCodeService>,
    pub files: Arc<FileService>,
    pub visits: Arc<VisitService>,
    pub contact: Arc<ContactService>,
    pub upload_storage: Arc<UploadStorage>,
    pub rate_limiter: Arc<ApiRateLimiter>,
    /// Body limit applied to the multipart upload routes.
    pub upload_body_limit: usize,
}
