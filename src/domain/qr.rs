//! QR code presentation helpers.
//!
//! Images are not encoded locally; they are rendered by an external image API
//! addressed through query parameters.

use url::Url;

use crate::domain::error::DomainError;

pub const DEFAULT_FOREGROUND: &str = "#000000";
pub const DEFAULT_BACKGROUND: &str = "#ffffff";
pub const MIN_SIZE: i32 = 64;
pub const MAX_SIZE: i32 = 1024;

/// Normalise a `#rgb` / `#rrggbb` colour to lowercase `#rrggbb`.
pub fn normalize_color(value: &str) -> Result<String, DomainError> {
    let hex = value.trim().trim_start_matches('#');
    let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|ch| ch.is_ascii_hexdigit());
    if !valid {
        return Err(DomainError::validation(format!(
            "`{value}` is not a hex colour"
        )));
    }

    let expanded: String = if hex.len() == 3 {
        hex.chars().flat_map(|ch| [ch, ch]).collect()
    } else {
        hex.to_string()
    };
    Ok(format!("#{}", expanded.to_ascii_lowercase()))
}

pub fn validate_size(size: i32) -> Result<i32, DomainError> {
    if (MIN_SIZE..=MAX_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(DomainError::validation(format!(
            "size must be between {MIN_SIZE} and {MAX_SIZE} pixels"
        )))
    }
}

/// External redirect targets must be absolute http(s) URLs.
pub fn validate_external_url(value: &str) -> Result<String, DomainError> {
    let parsed = Url::parse(value.trim())
        .map_err(|err| DomainError::validation(format!("invalid external url: {err}")))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed.to_string()),
        _ => Err(DomainError::validation(
            "external url must use http or https",
        )),
    }
}

/// Build the image URL for a QR code that encodes `data`.
pub fn image_url(base: &Url, data: &str, size: i32, foreground: &str, background: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("data", data)
        .append_pair("size", &format!("{size}x{size}"))
        .append_pair("color", foreground.trim_start_matches('#'))
        .append_pair("bgcolor", background.trim_start_matches('#'));
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_color_expands_short_form() {
        assert_eq!(normalize_color("#FA0").expect("colour"), "#ffaa00");
        assert_eq!(normalize_color("123abc").expect("colour"), "#123abc");
        assert!(normalize_color("#12345").is_err());
        assert!(normalize_color("red").is_err());
    }

    #[test]
    fn image_url_encodes_parameters() {
        let base = Url::parse("https://api.qrserver.com/v1/create-qr-code/").expect("base");
        let url = image_url(&base, "https://brand.test/qr/1?a=b", 300, "#112233", "#ffffff");

        assert_eq!(
            url.as_str(),
            "https://api.qrserver.com/v1/create-qr-code/?data=https%3A%2F%2Fbrand.test%2Fqr%2F1%3Fa%3Db&size=300x300&color=112233&bgcolor=ffffff"
        );
    }

    #[test]
    fn external_url_requires_http_scheme() {
        assert!(validate_external_url("https://example.com/offer").is_ok());
        assert!(validate_external_url("javascript:alert(1)").is_err());
        assert!(validate_external_url("/relative").is_err());
    }

    #[test]
    fn size_bounds_are_enforced() {
        assert_eq!(validate_size(300).expect("size"), 300);
        assert!(validate_size(10).is_err());
        assert!(validate_size(4096).is_err());
    }
}
