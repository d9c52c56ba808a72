//! Shared domain enumerations aligned with persisted database enums.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of renderable block variants.
///
/// Stored as the SCREAMING_SNAKE_CASE tag (`IMAGE_TEXT`). Parsing is lenient
/// about case and `-`/`_` so rows written by older editors (`image-text`)
/// resolve to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockKind {
    Hero,
    Features,
    Testimonials,
    Contact,
    Pdf,
    Video,
    Image,
    ImageText,
    Heading,
    Text,
    Custom,
    Button,
    Divider,
}

impl BlockKind {
    pub const ALL: [BlockKind; 13] = [
        BlockKind::Hero,
        BlockKind::Features,
        BlockKind::Testimonials,
        BlockKind::Contact,
        BlockKind::Pdf,
        BlockKind::Video,
        BlockKind::Image,
        BlockKind::ImageText,
        BlockKind::Heading,
        BlockKind::Text,
        BlockKind::Custom,
        BlockKind::Button,
        BlockKind::Divider,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Hero => "HERO",
            BlockKind::Features => "FEATURES",
            BlockKind::Testimonials => "TESTIMONIALS",
            BlockKind::Contact => "CONTACT",
            BlockKind::Pdf => "PDF",
            BlockKind::Video => "VIDEO",
            BlockKind::Image => "IMAGE",
            BlockKind::ImageText => "IMAGE_TEXT",
            BlockKind::Heading => "HEADING",
            BlockKind::Text => "TEXT",
            BlockKind::Custom => "CUSTOM",
            BlockKind::Button => "BUTTON",
            BlockKind::Divider => "DIVIDER",
        }
    }

    /// Resolve a stored type tag. Returns `None` for tags outside the closed set.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .trim()
            .chars()
            .map(|ch| match ch {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "qr_target_kind", rename_all = "snake_case")]
pub enum QrTargetKind {
    LandingPage,
    External,
}

/// Where a recorded visit originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "visit_source", rename_all = "snake_case")]
pub enum VisitSource {
    Direct,
    QrScan,
}

impl VisitSource {
    pub fn as_str(self) -> &'static str {
        match self {
            VisitSource::Direct => "direct",
            VisitSource::QrScan => "qr_scan",
        }
    }
}

/// Object storage buckets for uploaded assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileBucket {
    #[serde(rename = "product-images")]
    ProductImages,
    #[serde(rename = "public")]
    Public,
}

impl FileBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            FileBucket::ProductImages => "product-images",
            FileBucket::Public => "public",
        }
    }
}

impl TryFrom<&str> for FileBucket {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "product-images" => Ok(FileBucket::ProductImages),
            "public" => Ok(FileBucket::Public),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_legacy_spellings() {
        assert_eq!(BlockKind::parse("IMAGE_TEXT"), Some(BlockKind::ImageText));
        assert_eq!(BlockKind::parse("image-text"), Some(BlockKind::ImageText));
        assert_eq!(BlockKind::parse(" hero "), Some(BlockKind::Hero));
        assert_eq!(BlockKind::parse("carousel"), None);
    }

    #[test]
    fn tags_round_trip_through_parse() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::parse(kind.as_str()), Some(kind));
        }
    }
}
