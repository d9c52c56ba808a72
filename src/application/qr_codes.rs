//! QR codes: CRUD, scan recording and image URLs.

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::brands::{AccessError, owned_brand};
use crate::application::repos::{
    BrandsRepo, LandingPagesRepo, QrCodeParams, QrCodesRepo, RecordScanParams, RepoError,
};
use crate::domain::entities::QrCodeRecord;
use crate::domain::error::{optional_text, require_text};
use crate::domain::qr::{
    DEFAULT_BACKGROUND, DEFAULT_FOREGROUND, image_url, normalize_color, validate_external_url,
    validate_size,
};
use crate::domain::types::QrTargetKind;

const DEFAULT_SIZE: i32 = 300;

#[derive(Debug, Error)]
pub enum QrCodeError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("qr code not found")]
    NotFound,
    #[error("qr code target is no longer available")]
    TargetMissing,
    #[error("failed to build qr url: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct QrCodeCommand {
    pub name: String,
    pub target_kind: QrTargetKind,
    pub landing_page_id: Option<Uuid>,
    pub external_url: Option<String>,
    pub foreground_color: Option<String>,
    pub background_color: Option<String>,
    pub size: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRedirect {
    pub location: String,
}

#[derive(Clone)]
pub struct QrCodeService {
    codes: Arc<dyn QrCodesRepo>,
    pages: Arc<dyn LandingPagesRepo>,
    brands: Arc<dyn BrandsRepo>,
    image_api: Url,
    public_base: Url,
}

impl QrCodeService {
    pub fn new(
        codes: Arc<dyn QrCodesRepo>,
        pages: Arc<dyn LandingPagesRepo>,
        brands: Arc<dyn BrandsRepo>,
        image_api: Url,
        public_base: Url,
    ) -> Self {
        Self {
            codes,
            pages,
            brands,
            image_api,
            public_base,
        }
    }

    pub async fn list(
        &self,
        principal: &Principal,
        brand_id: Uuid,
    ) -> Result<Vec<QrCodeRecord>, QrCodeError> {
        owned_brand(self.brands.as_ref(), principal, brand_id).await?;
        Ok(self.codes.list_qr_codes(brand_id).await?)
    }

    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<QrCodeRecord, QrCodeError> {
        self.owned_code(principal, id).await
    }

    pub async fn create(
        &self,
        principal: &Principal,
        brand_id: Uuid,
        command: QrCodeCommand,
    ) -> Result<QrCodeRecord, QrCodeError> {
        owned_brand(self.brands.as_ref(), principal, brand_id).await?;
        let params = self.params(brand_id, command).await?;
        Ok(self.codes.create_qr_code(params).await?)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        command: QrCodeCommand,
    ) -> Result<QrCodeRecord, QrCodeError> {
        let current = self.owned_code(principal, id).await?;
        let params = self.params(current.brand_id, command).await?;
        Ok(self.codes.update_qr_code(id, params).await?)
    }

    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), QrCodeError> {
        self.owned_code(principal, id).await?;
        self.codes.delete_qr_code(id).await?;
        Ok(())
    }

    /// Resolve where the visitor goes next, then record the scan.
    ///
    /// Codes whose target is gone count nothing.
    pub async fn scan(
        &self,
        id: Uuid,
        user_id: Option<Uuid>,
        user_agent: Option<String>,
        now: OffsetDateTime,
    ) -> Result<ScanRedirect, QrCodeError> {
        let code = self
            .codes
            .find_qr_code(id)
            .await?
            .ok_or(QrCodeError::NotFound)?;

        let location = match code.target_kind {
            QrTargetKind::LandingPage => {
                let page_id = code.landing_page_id.ok_or(QrCodeError::TargetMissing)?;
                let page = self
                    .pages
                    .find_page(page_id)
                    .await?
                    .ok_or(QrCodeError::TargetMissing)?;
                format!("/{}?src=qr&qr={}", page.slug, code.id)
            }
            QrTargetKind::External => code.external_url.ok_or(QrCodeError::TargetMissing)?,
        };

        self.codes
            .record_scan(RecordScanParams {
                qr_code_id: id,
                user_id,
                user_agent,
                scanned_at: now,
            })
            .await?;
        counter!("brandpage_qr_scans_total").increment(1);

        info!(
            target = "brandpage::application::qr_codes",
            qr_code_id = %id,
            location = %location,
            "qr scan recorded"
        );

        Ok(ScanRedirect { location })
    }

    /// External image URL encoding the tracked redirect for `id`.
    pub async fn image_url(&self, id: Uuid) -> Result<Url, QrCodeError> {
        let code = self
            .codes
            .find_qr_code(id)
            .await?
            .ok_or(QrCodeError::NotFound)?;
        self.image_url_for(&code)
    }

    pub fn image_url_for(&self, code: &QrCodeRecord) -> Result<Url, QrCodeError> {
        let data = self.public_base.join(&format!("qr/{}", code.id))?;

        Ok(image_url(
            &self.image_api,
            data.as_str(),
            code.size,
            &code.foreground_color,
            &code.background_color,
        ))
    }

    async fn owned_code(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<QrCodeRecord, QrCodeError> {
        let code = self
            .codes
            .find_qr_code(id)
            .await?
            .ok_or(QrCodeError::NotFound)?;
        owned_brand(self.brands.as_ref(), principal, code.brand_id).await?;
        Ok(code)
    }

    async fn params(
        &self,
        brand_id: Uuid,
        command: QrCodeCommand,
    ) -> Result<QrCodeParams, QrCodeError> {
        let name = require_text("name", &command.name)
            .map_err(|_| QrCodeError::ConstraintViolation("name"))?;

        let (landing_page_id, external_url) = match command.target_kind {
            QrTargetKind::LandingPage => {
                let page_id = command
                    .landing_page_id
                    .ok_or(QrCodeError::ConstraintViolation("landingPageId"))?;
                let page = self
                    .pages
                    .find_page(page_id)
                    .await?
                    .ok_or(QrCodeError::ConstraintViolation("landingPageId"))?;
                if page.brand_id != brand_id {
                    return Err(QrCodeError::ConstraintViolation("landingPageId"));
                }
                (Some(page_id), None)
            }
            QrTargetKind::External => {
                let url = optional_text(command.external_url)
                    .ok_or(QrCodeError::ConstraintViolation("externalUrl"))?;
                let url = validate_external_url(&url)
                    .map_err(|_| QrCodeError::ConstraintViolation("externalUrl"))?;
                (None, Some(url))
            }
        };

        let foreground_color = normalize_color(
            command
                .foreground_color
                .as_deref()
                .unwrap_or(DEFAULT_FOREGROUND),
        )
        .map_err(|_| QrCodeError::ConstraintViolation("foregroundColor"))?;
        let background_color = normalize_color(
            command
                .background_color
                .as_deref()
                .unwrap_or(DEFAULT_BACKGROUND),
        )
        .map_err(|_| QrCodeError::ConstraintViolation("backgroundColor"))?;
        let size = validate_size(command.size.unwrap_or(DEFAULT_SIZE))
            .map_err(|_| QrCodeError::ConstraintViolation("size"))?;

        Ok(QrCodeParams {
            brand_id,
            name,
            target_kind: command.target_kind,
            landing_page_id,
            external_url,
            foreground_color,
            background_color,
            size,
        })
    }
}
