use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{RepoError, SessionsRepo};
use crate::application::session_watch::{SessionEvent, SessionHub};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing session token")]
    Missing,
    #[error("invalid session token")]
    Invalid,
    #[error("expired session")]
    Expired,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// The signed-in user behind an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
}

/// Resolves bearer session tokens issued by the sign-in flow.
#[derive(Clone)]
pub struct SessionService {
    repo: Arc<dyn SessionsRepo>,
    hub: SessionHub,
}

impl SessionService {
    pub fn new(repo: Arc<dyn SessionsRepo>, hub: SessionHub) -> Self {
        Self { repo, hub }
    }

    pub fn hub(&self) -> &SessionHub {
        &self.hub
    }

    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.trim().as_bytes());
        hex::encode(hasher.finalize())
    }

    pub async fn authenticate(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Principal, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::Missing);
        }

        let session = self
            .repo
            .find_session(&Self::hash_token(token))
            .await?
            .ok_or(AuthError::Invalid)?;

        if !session.is_active_at(now) {
            return Err(AuthError::Expired);
        }

        Ok(Principal {
            user_id: session.user_id,
        })
    }

    /// Remote session check used by the visitor gate. `Ok(None)` means the
    /// token is unknown or expired.
    pub async fn verify(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Uuid>, RepoError> {
        match self.authenticate(token, now).await {
            Ok(principal) => Ok(Some(principal.user_id)),
            Err(AuthError::Repo(err)) => Err(err),
            Err(AuthError::Missing | AuthError::Invalid | AuthError::Expired) => Ok(None),
        }
    }

    /// Delete the session and notify open gate streams.
    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let token_hash = Self::hash_token(token);
        self.repo.delete_session(&token_hash).await?;
        self.hub.publish(SessionEvent::SignedOut { token_hash });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_token_is_stable_hex() {
        let hash = SessionService::hash_token("secret");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, SessionService::hash_token(" secret "));
        assert!(hash.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
