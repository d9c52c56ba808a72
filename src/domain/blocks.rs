//! Block content model shared by landing pages and product designs.
//!
//! Storage keeps the loose `(type, content, styles)` triple; everything above
//! the persistence adapters works with [`BlockContent`], a discriminated union
//! with one typed struct per variant. Every struct field is `#[serde(default)]`
//! so an empty object decodes into a renderable value.
//!
//! Content and styles survive a save and reload unchanged: keys a struct does
//! not know are kept in its `extra` map, fields left at their default are not
//! written back, and style values keep their JSON type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::domain::types::BlockKind;

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroContent {
    #[serde(skip_serializing_if = "is_default")]
    pub title: String,
    #[serde(skip_serializing_if = "is_default")]
    pub subtitle: String,
    #[serde(skip_serializing_if = "is_default")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub button_text: String,
    #[serde(skip_serializing_if = "is_default")]
    pub button_link: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureItem {
    #[serde(skip_serializing_if = "is_default")]
    pub title: String,
    #[serde(skip_serializing_if = "is_default")]
    pub description: String,
    #[serde(skip_serializing_if = "is_default")]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeaturesContent {
    #[serde(skip_serializing_if = "is_default")]
    pub title: String,
    #[serde(alias = "features", skip_serializing_if = "is_default")]
    pub items: Vec<FeatureItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "name", skip_serializing_if = "is_default")]
    pub author: String,
    #[serde(skip_serializing_if = "is_default")]
    pub role: String,
    #[serde(alias = "text", skip_serializing_if = "is_default")]
    pub quote: String,
    #[serde(skip_serializing_if = "is_default")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "is_default")]
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialsContent {
    #[serde(skip_serializing_if = "is_default")]
    pub title: String,
    #[serde(alias = "testimonials", skip_serializing_if = "is_default")]
    pub reviews: Vec<Review>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactContent {
    #[serde(skip_serializing_if = "is_default")]
    pub title: String,
    #[serde(skip_serializing_if = "is_default")]
    pub description: String,
    #[serde(skip_serializing_if = "is_default")]
    pub email: String,
    #[serde(skip_serializing_if = "is_default")]
    pub phone: String,
    #[serde(skip_serializing_if = "is_default")]
    pub address: String,
    #[serde(skip_serializing_if = "is_default")]
    pub show_form: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PdfContent {
    #[serde(skip_serializing_if = "is_default")]
    pub title: String,
    #[serde(skip_serializing_if = "is_default")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub file_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoContent {
    #[serde(skip_serializing_if = "is_default")]
    pub title: String,
    #[serde(skip_serializing_if = "is_default")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub autoplay: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageContent {
    #[serde(skip_serializing_if = "is_default")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub alt: String,
    #[serde(skip_serializing_if = "is_default")]
    pub caption: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageTextContent {
    #[serde(skip_serializing_if = "is_default")]
    pub title: String,
    #[serde(skip_serializing_if = "is_default")]
    pub text: String,
    #[serde(skip_serializing_if = "is_default")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub image_position: ImagePosition,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeadingContent {
    #[serde(skip_serializing_if = "is_default")]
    pub text: String,
    #[serde(skip_serializing_if = "is_default")]
    pub level: u8,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextContent {
    #[serde(skip_serializing_if = "is_default")]
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomContent {
    #[serde(skip_serializing_if = "is_default")]
    pub html: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonContent {
    #[serde(alias = "text", skip_serializing_if = "is_default")]
    pub label: String,
    #[serde(skip_serializing_if = "is_default")]
    pub link: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DividerContent {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed block content: one variant per block type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContent {
    Hero(HeroContent),
    Features(FeaturesContent),
    Testimonials(TestimonialsContent),
    Contact(ContactContent),
    Pdf(PdfContent),
    Video(VideoContent),
    Image(ImageContent),
    ImageText(ImageTextContent),
    Heading(HeadingContent),
    Text(TextContent),
    Custom(CustomContent),
    Button(ButtonContent),
    Divider(DividerContent),
}

impl BlockContent {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockContent::Hero(_) => BlockKind::Hero,
            BlockContent::Features(_) => BlockKind::Features,
            BlockContent::Testimonials(_) => BlockKind::Testimonials,
            BlockContent::Contact(_) => BlockKind::Contact,
            BlockContent::Pdf(_) => BlockKind::Pdf,
            BlockContent::Video(_) => BlockKind::Video,
            BlockContent::Image(_) => BlockKind::Image,
            BlockContent::ImageText(_) => BlockKind::ImageText,
            BlockContent::Heading(_) => BlockKind::Heading,
            BlockContent::Text(_) => BlockKind::Text,
            BlockContent::Custom(_) => BlockKind::Custom,
            BlockContent::Button(_) => BlockKind::Button,
            BlockContent::Divider(_) => BlockKind::Divider,
        }
    }

    /// Empty content for a kind; every field at its zero value.
    pub fn empty(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Hero => BlockContent::Hero(HeroContent::default()),
            BlockKind::Features => BlockContent::Features(FeaturesContent::default()),
            BlockKind::Testimonials => BlockContent::Testimonials(TestimonialsContent::default()),
            BlockKind::Contact => BlockContent::Contact(ContactContent::default()),
            BlockKind::Pdf => BlockContent::Pdf(PdfContent::default()),
            BlockKind::Video => BlockContent::Video(VideoContent::default()),
            BlockKind::Image => BlockContent::Image(ImageContent::default()),
            BlockKind::ImageText => BlockContent::ImageText(ImageTextContent::default()),
            BlockKind::Heading => BlockContent::Heading(HeadingContent::default()),
            BlockKind::Text => BlockContent::Text(TextContent::default()),
            BlockKind::Custom => BlockContent::Custom(CustomContent::default()),
            BlockKind::Button => BlockContent::Button(ButtonContent::default()),
            BlockKind::Divider => BlockContent::Divider(DividerContent::default()),
        }
    }

    /// Starter content used when a block is added in an editor.
    pub fn template(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Hero => BlockContent::Hero(HeroContent {
                title: "Welcome to our brand".to_string(),
                subtitle: "Tell your visitors what makes you different".to_string(),
                button_text: "Learn more".to_string(),
                button_link: "#".to_string(),
                ..HeroContent::default()
            }),
            BlockKind::Features => BlockContent::Features(FeaturesContent {
                title: "Features".to_string(),
                items: vec![
                    FeatureItem {
                        title: "Feature one".to_string(),
                        description: "Describe the first feature".to_string(),
                        ..FeatureItem::default()
                    },
                    FeatureItem {
                        title: "Feature two".to_string(),
                        description: "Describe the second feature".to_string(),
                        ..FeatureItem::default()
                    },
                ],
                ..FeaturesContent::default()
            }),
            BlockKind::Testimonials => BlockContent::Testimonials(TestimonialsContent {
                title: "What our customers say".to_string(),
                reviews: vec![Review {
                    author: "Happy customer".to_string(),
                    quote: "Add a quote from a customer".to_string(),
                    rating: Some(5),
                    ..Review::default()
                }],
                ..TestimonialsContent::default()
            }),
            BlockKind::Contact => BlockContent::Contact(ContactContent {
                title: "Contact us".to_string(),
                description: "We would love to hear from you".to_string(),
                show_form: true,
                ..ContactContent::default()
            }),
            BlockKind::Pdf => BlockContent::Pdf(PdfContent {
                title: "Document".to_string(),
                ..PdfContent::default()
            }),
            BlockKind::Video => BlockContent::Video(VideoContent {
                title: "Video".to_string(),
                ..VideoContent::default()
            }),
            BlockKind::Image => BlockContent::Image(ImageContent::default()),
            BlockKind::ImageText => BlockContent::ImageText(ImageTextContent {
                title: "Our story".to_string(),
                text: "Add your text here".to_string(),
                ..ImageTextContent::default()
            }),
            BlockKind::Heading => BlockContent::Heading(HeadingContent {
                text: "Heading".to_string(),
                level: 2,
                ..HeadingContent::default()
            }),
            BlockKind::Text => BlockContent::Text(TextContent {
                text: "Add your text here".to_string(),
                ..TextContent::default()
            }),
            BlockKind::Custom => BlockContent::Custom(CustomContent::default()),
            BlockKind::Button => BlockContent::Button(ButtonContent {
                label: "Click here".to_string(),
                link: "#".to_string(),
                ..ButtonContent::default()
            }),
            BlockKind::Divider => BlockContent::Divider(DividerContent::default()),
        }
    }

    /// Decode stored content for a known kind. `null` is treated as `{}`.
    pub fn from_parts(kind: BlockKind, content: &Value) -> Result<Self, serde_json::Error> {
        let value = if content.is_null() {
            Value::Object(Map::new())
        } else {
            content.clone()
        };

        Ok(match kind {
            BlockKind::Hero => BlockContent::Hero(serde_json::from_value(value)?),
            BlockKind::Features => BlockContent::Features(serde_json::from_value(value)?),
            BlockKind::Testimonials => BlockContent::Testimonials(serde_json::from_value(value)?),
            BlockKind::Contact => BlockContent::Contact(serde_json::from_value(value)?),
            BlockKind::Pdf => BlockContent::Pdf(serde_json::from_value(value)?),
            BlockKind::Video => BlockContent::Video(serde_json::from_value(value)?),
            BlockKind::Image => BlockContent::Image(serde_json::from_value(value)?),
            BlockKind::ImageText => BlockContent::ImageText(serde_json::from_value(value)?),
            BlockKind::Heading => BlockContent::Heading(serde_json::from_value(value)?),
            BlockKind::Text => BlockContent::Text(serde_json::from_value(value)?),
            BlockKind::Custom => BlockContent::Custom(serde_json::from_value(value)?),
            BlockKind::Button => BlockContent::Button(serde_json::from_value(value)?),
            BlockKind::Divider => BlockContent::Divider(serde_json::from_value(value)?),
        })
    }

    /// Decode stored content, falling back to empty content when fields carry
    /// the wrong JSON types.
    pub fn from_parts_lossy(kind: BlockKind, content: &Value) -> Self {
        match Self::from_parts(kind, content) {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!(
                    target = "brandpage::domain::blocks",
                    kind = kind.as_str(),
                    error = %err,
                    "block content did not match its type; using empty content"
                );
                Self::empty(kind)
            }
        }
    }

    /// Content payload without the type tag, as stored in the `content` column.
    pub fn content_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            BlockContent::Hero(inner) => serde_json::to_value(inner),
            BlockContent::Features(inner) => serde_json::to_value(inner),
            BlockContent::Testimonials(inner) => serde_json::to_value(inner),
            BlockContent::Contact(inner) => serde_json::to_value(inner),
            BlockContent::Pdf(inner) => serde_json::to_value(inner),
            BlockContent::Video(inner) => serde_json::to_value(inner),
            BlockContent::Image(inner) => serde_json::to_value(inner),
            BlockContent::ImageText(inner) => serde_json::to_value(inner),
            BlockContent::Heading(inner) => serde_json::to_value(inner),
            BlockContent::Text(inner) => serde_json::to_value(inner),
            BlockContent::Custom(inner) => serde_json::to_value(inner),
            BlockContent::Button(inner) => serde_json::to_value(inner),
            BlockContent::Divider(inner) => serde_json::to_value(inner),
        }
    }
}

/// Flat map of CSS-like properties attached to a block.
///
/// Values keep the JSON type they were saved with; only strings, numbers and
/// booleans reach the rendered CSS.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockStyles(BTreeMap<String, Value>);

impl BlockStyles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), Value::String(value.into())))
                .collect(),
        )
    }

    /// Read a stored style map. Anything but an object reads as empty.
    pub fn from_value(value: &Value) -> Self {
        match value.as_object() {
            Some(object) => Self(
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            ),
            None => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Starter styles used when a block is added in an editor.
    pub fn template(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Hero => Self::from_pairs([
                ("backgroundColor", "#f8fafc"),
                ("textAlign", "center"),
                ("padding", "4rem 1.5rem"),
            ]),
            BlockKind::Features | BlockKind::Testimonials => {
                Self::from_pairs([("padding", "3rem 1.5rem")])
            }
            BlockKind::Contact => {
                Self::from_pairs([("padding", "3rem 1.5rem"), ("backgroundColor", "#ffffff")])
            }
            BlockKind::Heading => Self::from_pairs([("textAlign", "left")]),
            BlockKind::Text => Self::from_pairs([("fontSize", "1rem"), ("lineHeight", "1.6")]),
            BlockKind::Button => Self::from_pairs([
                ("backgroundColor", "#0b57d0"),
                ("color", "#ffffff"),
                ("borderRadius", "8px"),
            ]),
            BlockKind::Divider => Self::from_pairs([("margin", "2rem 0")]),
            BlockKind::Pdf
            | BlockKind::Video
            | BlockKind::Image
            | BlockKind::ImageText
            | BlockKind::Custom => Self::default(),
        }
    }

    /// Render as an inline CSS declaration list.
    ///
    /// Keys are converted from camelCase to kebab-case. Entries whose key or
    /// value could break out of the attribute or declaration are skipped.
    pub fn to_inline_css(&self) -> String {
        let mut declarations = Vec::with_capacity(self.0.len());
        for (key, value) in &self.0 {
            let property = css_property_name(key);
            let Some(value) = css_value(value) else {
                continue;
            };
            if property.is_empty() || !is_safe_css_value(&value) {
                continue;
            }
            declarations.push(format!("{property}: {}", value.trim()));
        }
        declarations.join("; ")
    }
}

fn css_property_name(key: &str) -> String {
    let mut property = String::with_capacity(key.len() + 4);
    for ch in key.trim().chars() {
        if ch.is_ascii_uppercase() {
            property.push('-');
            property.push(ch.to_ascii_lowercase());
        } else if ch.is_ascii_alphanumeric() || ch == '-' {
            property.push(ch);
        } else {
            return String::new();
        }
    }
    property
}

fn css_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn is_safe_css_value(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && !trimmed
            .chars()
            .any(|ch| matches!(ch, ';' | '"' | '<' | '>' | '{' | '}' | '\\'))
        && !trimmed.to_ascii_lowercase().contains("url(javascript")
}

/// A block as edited and rendered: typed content plus ordering metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: Uuid,
    pub content: BlockContent,
    pub styles: BlockStyles,
    pub order: i32,
    pub is_active: bool,
    pub brand_id: Option<Uuid>,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }
}

/// A stored block resolved for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedBlock {
    Known {
        content: BlockContent,
        styles: BlockStyles,
    },
    Unknown {
        type_name: String,
    },
}

impl ResolvedBlock {
    /// Resolve a loose `(type, content, styles)` triple. Never fails.
    pub fn resolve(type_name: &str, content: &Value, styles: &Value) -> Self {
        match BlockKind::parse(type_name) {
            Some(kind) => ResolvedBlock::Known {
                content: BlockContent::from_parts_lossy(kind, content),
                styles: BlockStyles::from_value(styles),
            },
            None => ResolvedBlock::Unknown {
                type_name: type_name.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn every_kind_decodes_from_empty_object() {
        for kind in BlockKind::ALL {
            let content = BlockContent::from_parts(kind, &json!({})).expect("empty decodes");
            assert_eq!(content.kind(), kind);
            assert_eq!(content, BlockContent::empty(kind));
        }
    }

    #[test]
    fn aliases_accept_legacy_field_names() {
        let content = BlockContent::from_parts(
            BlockKind::Testimonials,
            &json!({ "testimonials": [{ "name": "Ada", "text": "Great" }] }),
        )
        .expect("decode testimonials");

        let BlockContent::Testimonials(inner) = content else {
            panic!("expected testimonials");
        };
        assert_eq!(inner.reviews.len(), 1);
        assert_eq!(inner.reviews[0].author, "Ada");
        assert_eq!(inner.reviews[0].quote, "Great");
    }

    #[test]
    fn mistyped_fields_fall_back_to_empty_content() {
        let content = BlockContent::from_parts_lossy(BlockKind::Hero, &json!({ "title": 42 }));
        assert_eq!(content, BlockContent::empty(BlockKind::Hero));
    }

    #[test]
    fn content_value_round_trips_through_from_parts() {
        for kind in BlockKind::ALL {
            let original = BlockContent::template(kind);
            let value = original.content_value().expect("serialize");
            let decoded = BlockContent::from_parts(kind, &value).expect("decode");
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn inline_css_converts_keys_and_skips_unsafe_values() {
        let styles = BlockStyles::from_pairs([
            ("backgroundColor", "#fff"),
            ("color", "red; position: fixed"),
            ("padding", "1rem"),
        ]);
        assert_eq!(styles.to_inline_css(), "background-color: #fff; padding: 1rem");
    }

    #[test]
    fn styles_keep_json_types_and_render_scalars() {
        let stored = json!({ "opacity": 0.5, "zIndex": 2, "nested": {} });
        let styles = BlockStyles::from_value(&stored);
        assert_eq!(styles.get("opacity"), Some(&json!(0.5)));
        assert_eq!(styles.to_value(), stored);
        assert_eq!(styles.to_inline_css(), "opacity: 0.5; z-index: 2");
    }

    #[test]
    fn unknown_content_keys_survive_and_defaults_stay_out() {
        let submitted = json!({ "title": "Hi", "backgroundImage": "/uploads/public/x.png" });
        let content = BlockContent::from_parts(BlockKind::Hero, &submitted).expect("decode");

        let BlockContent::Hero(hero) = &content else {
            panic!("expected hero");
        };
        assert_eq!(hero.title, "Hi");
        assert_eq!(
            hero.extra.get("backgroundImage"),
            Some(&json!("/uploads/public/x.png"))
        );
        assert_eq!(content.content_value().expect("serialize"), submitted);
    }

    #[test]
    fn unknown_type_resolves_without_error() {
        let resolved = ResolvedBlock::resolve("CAROUSEL", &json!({}), &json!({}));
        assert_eq!(
            resolved,
            ResolvedBlock::Unknown {
                type_name: "CAROUSEL".to_string()
            }
        );
    }
}
