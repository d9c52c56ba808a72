//! Service wiring shared by the binary and the router tests.

use std::sync::Arc;
use std::time::Duration;

use crate::application::auth::SessionService;
use crate::application::brands::BrandService;
use crate::application::catalog::CatalogService;
use crate::application::contact::ContactService;
use crate::application::files::FileService;
use crate::application::landing_pages::LandingPageService;
use crate::application::product_designs::ProductDesignService;
use crate::application::qr_codes::QrCodeService;
use crate::application::repos::{
    BrandsRepo, CatalogRepo, ContactRepo, FilesRepo, HealthRepo, LandingPagesRepo,
    ProductDesignsRepo, QrCodesRepo, SessionsRepo, VisitsRepo,
};
use crate::application::session_watch::SessionHub;
use crate::application::visits::{VisitService, VisitTracker};
use crate::config::Settings;
use crate::infra::http::{ApiRateLimiter, ApiState, GateSettings, HttpState, RouterState};
use crate::infra::uploads::UploadStorage;

/// Every repository trait the services need, implemented by one backend.
pub trait Repositories:
    BrandsRepo
    + CatalogRepo
    + ContactRepo
    + FilesRepo
    + HealthRepo
    + LandingPagesRepo
    + ProductDesignsRepo
    + QrCodesRepo
    + SessionsRepo
    + VisitsRepo
    + 'static
{
}

impl<T> Repositories for T where
    T: BrandsRepo
        + CatalogRepo
        + ContactRepo
        + FilesRepo
        + HealthRepo
        + LandingPagesRepo
        + ProductDesignsRepo
        + QrCodesRepo
        + SessionsRepo
        + VisitsRepo
        + 'static
{
}

pub fn build_router_state<R: Repositories>(
    repos: Arc<R>,
    settings: &Settings,
    upload_storage: Arc<UploadStorage>,
) -> RouterState {
    let brands_repo: Arc<dyn BrandsRepo> = repos.clone();
    let catalog_repo: Arc<dyn CatalogRepo> = repos.clone();
    let pages_repo: Arc<dyn LandingPagesRepo> = repos.clone();
    let qr_repo: Arc<dyn QrCodesRepo> = repos.clone();
    let visits_repo: Arc<dyn VisitsRepo> = repos.clone();
    let designs_repo: Arc<dyn ProductDesignsRepo> = repos.clone();
    let files_repo: Arc<dyn FilesRepo> = repos.clone();
    let contact_repo: Arc<dyn ContactRepo> = repos.clone();
    let sessions_repo: Arc<dyn SessionsRepo> = repos.clone();
    let health_repo: Arc<dyn HealthRepo> = repos;

    let sessions = SessionService::new(sessions_repo, SessionHub::new());
    let landing_pages = LandingPageService::new(pages_repo.clone(), brands_repo.clone());
    let visits = VisitService::new(visits_repo, qr_repo.clone());
    let designs = Arc::new(ProductDesignService::new(
        designs_repo,
        catalog_repo.clone(),
        brands_repo.clone(),
    ));
    let qr_codes = Arc::new(QrCodeService::new(
        qr_repo,
        pages_repo,
        brands_repo.clone(),
        settings.qr.image_api_url.clone(),
        settings.server.public_base_url.clone(),
    ));
    let contact = Arc::new(ContactService::new(contact_repo, landing_pages.clone()));

    let rate_limits = &settings.api_rate_limit;
    let rate_limiter = ApiRateLimiter::new(
        Duration::from_secs(u64::from(rate_limits.window_seconds.get())),
        rate_limits.max_requests.get(),
    );

    let http = HttpState {
        landing_pages: Arc::new(landing_pages.clone()),
        designs: designs.clone(),
        qr_codes: qr_codes.clone(),
        contact: contact.clone(),
        tracker: VisitTracker::new(sessions.clone(), visits.clone()),
        upload_storage: upload_storage.clone(),
        health: health_repo,
        gate: GateSettings::from(&settings.sessions),
    };

    let api = ApiState {
        sessions,
        brands: Arc::new(BrandService::new(brands_repo.clone())),
        catalog: Arc::new(CatalogService::new(catalog_repo, brands_repo.clone())),
        landing_pages: Arc::new(landing_pages),
        designs,
        qr_codes,
        files: Arc::new(FileService::new(files_repo, brands_repo)),
        visits: Arc::new(visits),
        contact,
        upload_storage,
        rate_limiter: Arc::new(rate_limiter),
        upload_body_limit: usize::try_from(settings.uploads.max_request_bytes.get())
            .unwrap_or(usize::MAX),
    };

    RouterState { http, api }
}
