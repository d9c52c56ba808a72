use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::landing_pages::{LandingPageError, LandingPageService};
use crate::application::repos::{ContactRepo, CreateContactParams, RepoError};
use crate::domain::entities::ContactSubmissionRecord;
use crate::domain::error::require_text;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("`{0}` is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Page(#[from] LandingPageError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct ContactCommand {
    pub landing_page_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Clone)]
pub struct ContactService {
    repo: Arc<dyn ContactRepo>,
    pages: LandingPageService,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactRepo>, pages: LandingPageService) -> Self {
        Self { repo, pages }
    }

    /// Store a contact form submission. Only presence of the fields is checked.
    pub async fn submit(
        &self,
        command: ContactCommand,
    ) -> Result<ContactSubmissionRecord, ContactError> {
        let name =
            require_text("name", &command.name).map_err(|_| ContactError::MissingField("name"))?;
        let email = require_text("email", &command.email)
            .map_err(|_| ContactError::MissingField("email"))?;
        let message = require_text("message", &command.message)
            .map_err(|_| ContactError::MissingField("message"))?;

        let submission = self
            .repo
            .create_submission(CreateContactParams {
                landing_page_id: command.landing_page_id,
                name,
                email,
                message,
            })
            .await?;
        Ok(submission)
    }

    pub async fn list_for_page(
        &self,
        principal: &Principal,
        landing_page_id: Uuid,
    ) -> Result<Vec<ContactSubmissionRecord>, ContactError> {
        self.pages.owned_page(principal, landing_page_id).await?;
        Ok(self.repo.list_submissions(landing_page_id).await?)
    }
}
