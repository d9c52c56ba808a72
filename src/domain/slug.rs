//! Utilities for generating deterministic, human-friendly slugs.
//!
//! Landing pages are served from the root of the site (`/<slug>`), so besides
//! uniqueness a slug must stay clear of the top-level routes the server owns.
//! Consumers provide their own uniqueness predicate to keep generation pure.

use std::future::Future;

use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;
const MAX_SLUG_LEN: usize = 96;

/// Top-level path segments that can never be used as a page slug.
pub const RESERVED_SLUGS: &[&str] = &["api", "qr", "designs", "uploads", "_health"];

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
    #[error("slug `{slug}` may only contain lowercase letters, digits and `-`")]
    InvalidCharacters { slug: String },
    #[error("slug `{slug}` is reserved")]
    Reserved { slug: String },
}

/// Errors that can occur while generating a slug via an async uniqueness check.
#[derive(Debug, Error)]
pub enum SlugAsyncError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Predicate(E),
}

/// Derive a base slug from the provided human-readable text.
///
/// A derived slug that lands on a reserved word gets a `-page` suffix.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let mut candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    if candidate.len() > MAX_SLUG_LEN {
        candidate.truncate(MAX_SLUG_LEN);
        while candidate.ends_with('-') {
            candidate.pop();
        }
    }

    if is_reserved(&candidate) {
        candidate.push_str("-page");
    }

    Ok(candidate)
}

/// Validate a slug supplied directly by a user.
pub fn validate_slug(slug: &str) -> Result<(), SlugError> {
    if slug.is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let well_formed = slug.len() <= MAX_SLUG_LEN
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
    if !well_formed {
        return Err(SlugError::InvalidCharacters {
            slug: slug.to_string(),
        });
    }

    if is_reserved(slug) {
        return Err(SlugError::Reserved {
            slug: slug.to_string(),
        });
    }

    Ok(())
}

pub fn is_reserved(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Produce a slug that does not collide according to the supplied predicate.
///
/// The `is_unique` closure must return `true` when the provided slug does not
/// already exist. The helper retries by suffixing a monotonic counter
/// (`-2`, `-3`, ...).
pub fn generate_unique_slug<F>(input: &str, mut is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = derive_slug(input)?;

    if is_unique(&base) {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted { base })
}

/// Async variant of [`generate_unique_slug`] that awaits the uniqueness predicate.
pub async fn generate_unique_slug_async<F, Fut, E>(
    input: &str,
    mut is_unique: F,
) -> Result<String, SlugAsyncError<E>>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(input)?;

    if is_unique(&base).await.map_err(SlugAsyncError::Predicate)? {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate)
            .await
            .map_err(SlugAsyncError::Predicate)?
        {
            return Ok(candidate);
        }
    }

    Err(SlugAsyncError::Slug(SlugError::Exhausted { base }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_normalizes_titles() {
        assert_eq!(derive_slug("Summer Sale 2026!").expect("slug"), "summer-sale-2026");
        assert_eq!(derive_slug("Café Crème").expect("slug"), "cafe-creme");
    }

    #[test]
    fn derive_slug_avoids_reserved_words() {
        assert_eq!(derive_slug("API").expect("slug"), "api-page");
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn validate_slug_rejects_reserved_and_malformed() {
        assert!(validate_slug("spring-launch").is_ok());
        assert_eq!(
            validate_slug("qr"),
            Err(SlugError::Reserved { slug: "qr".into() })
        );
        assert!(matches!(
            validate_slug("Spring Launch"),
            Err(SlugError::InvalidCharacters { .. })
        ));
        assert!(matches!(
            validate_slug("-leading"),
            Err(SlugError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn generate_unique_slug_appends_counter() {
        let mut existing = vec!["spring-launch".to_string()];
        let slug = generate_unique_slug("Spring Launch", |candidate| {
            if existing.contains(&candidate.to_string()) {
                false
            } else {
                existing.push(candidate.to_string());
                true
            }
        })
        .expect("unique slug");

        assert_eq!(slug, "spring-launch-2");
    }

    #[test]
    fn generate_unique_slug_exhausted() {
        let result =
            generate_unique_slug("Example", |_| false).expect_err("should exhaust attempts");
        assert_eq!(
            result,
            SlugError::Exhausted {
                base: "example".to_string()
            }
        );
    }

    #[tokio::test]
    async fn generate_unique_slug_async_works() {
        use std::sync::Arc;
        use tokio::sync::Mutex;

        let existing = Arc::new(Mutex::new(vec!["spring-launch".to_string()]));

        let slug = generate_unique_slug_async("Spring Launch", |candidate| {
            let existing = existing.clone();
            let candidate = candidate.to_string();
            async move {
                let guard = existing.lock().await;
                Ok::<bool, std::convert::Infallible>(!guard.contains(&candidate))
            }
        })
        .await
        .expect("unique slug");

        assert_eq!(slug, "spring-launch-2");
    }
}
