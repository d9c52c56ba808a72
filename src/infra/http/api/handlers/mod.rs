//! API handlers organized by resource.
//!
//! Error conversions shared by the submodules live here.

mod brands;
mod catalog;
mod designs;
mod files;
mod landing_pages;
mod qr_codes;
mod session;

pub use brands::*;
pub use catalog::*;
pub use designs::*;
pub use files::*;
pub use landing_pages::*;
pub use qr_codes::*;
pub use session::*;

use axum::http::StatusCode;

use crate::application::brands::{AccessError, BrandError};
use crate::application::catalog::CatalogError;
use crate::application::contact::ContactError;
use crate::application::files::FileError;
use crate::application::landing_pages::LandingPageError;
use crate::application::product_designs::ProductDesignError;
use crate::application::qr_codes::QrCodeError;
use crate::application::repos::RepoError;
use crate::application::visits::VisitError;
use crate::infra::uploads::UploadStorageError;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(msg),
        ),
    }
}

fn invalid(message: &'static str, field: &str) -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        codes::INVALID_INPUT,
        message,
        Some(field.to_string()),
    )
}

pub(crate) fn access_to_api(err: AccessError) -> ApiError {
    match err {
        AccessError::BrandNotFound => ApiError::not_found("brand not found"),
        AccessError::Forbidden => ApiError::forbidden(),
        AccessError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn brand_to_api(err: BrandError) -> ApiError {
    match err {
        BrandError::ConstraintViolation(field) => invalid("Invalid brand", field),
        BrandError::Access(access) => access_to_api(access),
        BrandError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn catalog_to_api(err: CatalogError) -> ApiError {
    match err {
        CatalogError::ConstraintViolation(field) => invalid("Invalid catalog entry", field),
        CatalogError::NotFound(what) => ApiError::new(
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            "Catalog entry not found",
            Some(what.to_string()),
        ),
        CatalogError::Access(access) => access_to_api(access),
        CatalogError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn landing_page_to_api(err: LandingPageError) -> ApiError {
    match err {
        LandingPageError::ConstraintViolation(field) => invalid("Invalid landing page", field),
        LandingPageError::NotFound => ApiError::not_found("landing page not found"),
        LandingPageError::Slug(slug) => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::SLUG,
            "Invalid slug",
            Some(slug.to_string()),
        ),
        LandingPageError::Editor(editor) => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::EDITOR,
            "Invalid components",
            Some(editor.to_string()),
        ),
        LandingPageError::Encode(encode) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::EDITOR,
            "Components could not be encoded",
            Some(encode.to_string()),
        ),
        LandingPageError::Access(access) => access_to_api(access),
        LandingPageError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn design_to_api(err: ProductDesignError) -> ApiError {
    match err {
        ProductDesignError::ConstraintViolation(field) => invalid("Invalid design", field),
        ProductDesignError::NotFound => ApiError::not_found("product design not found"),
        ProductDesignError::ProductNotFound => ApiError::not_found("product not found"),
        ProductDesignError::Forbidden => ApiError::forbidden(),
        ProductDesignError::Editor(editor) => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::EDITOR,
            "Invalid components",
            Some(editor.to_string()),
        ),
        ProductDesignError::Encode(encode) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::EDITOR,
            "Design could not be encoded",
            Some(encode.to_string()),
        ),
        ProductDesignError::Access(access) => access_to_api(access),
        ProductDesignError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn qr_to_api(err: QrCodeError) -> ApiError {
    match err {
        QrCodeError::ConstraintViolation(field) => invalid("Invalid QR code", field),
        QrCodeError::NotFound => ApiError::not_found("qr code not found"),
        QrCodeError::TargetMissing => ApiError::new(
            StatusCode::NOT_FOUND,
            codes::QR_TARGET,
            "QR code target is no longer available",
            None,
        ),
        QrCodeError::Url(url) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::QR_TARGET,
            "QR code URL could not be built",
            Some(url.to_string()),
        ),
        QrCodeError::Access(access) => access_to_api(access),
        QrCodeError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn file_to_api(err: FileError) -> ApiError {
    match err {
        FileError::NotFound => ApiError::not_found("file not found"),
        FileError::Forbidden => ApiError::forbidden(),
        FileError::Access(access) => access_to_api(access),
        FileError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn upload_storage_to_api(err: UploadStorageError) -> ApiError {
    let status = match err {
        UploadStorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    ApiError::new(
        status,
        codes::UPLOAD,
        "Failed to store upload",
        Some(err.to_string()),
    )
}

pub(crate) fn visit_to_api(err: VisitError) -> ApiError {
    match err {
        VisitError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn contact_to_api(err: ContactError) -> ApiError {
    match err {
        ContactError::MissingField(field) => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Please fill in all fields",
            Some(field.to_string()),
        ),
        ContactError::Page(page) => landing_page_to_api(page),
        ContactError::Repo(repo) => repo_to_api(repo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_map_to_statuses() {
        let duplicate = repo_to_api(RepoError::Duplicate {
            constraint: "brands_owner_slug_key".into(),
        });
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
        assert_eq!(duplicate.code(), codes::DUPLICATE);

        assert_eq!(
            repo_to_api(RepoError::Timeout).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn ownership_failures_are_forbidden() {
        let err = landing_page_to_api(LandingPageError::Access(AccessError::Forbidden));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err = file_to_api(FileError::Forbidden);
        assert_eq!(err.code(), codes::FORBIDDEN);
    }

    #[test]
    fn missing_qr_target_has_dedicated_code() {
        let err = qr_to_api(QrCodeError::TargetMissing);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), codes::QR_TARGET);
    }

    #[test]
    fn contact_missing_field_is_bad_request() {
        let err = contact_to_api(ContactError::MissingField("email"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
