//! HTML renderer for landing page and product design blocks.
//!
//! Rendering is total. Unknown type tags produce a visible "Unknown component
//! type" fallback, empty fields render placeholders and mistyped content
//! degrades to the variant's empty value, so a half-edited page always loads.

use askama::Template;
use metrics::counter;
use serde_json::Value;
use tracing::warn;

use crate::domain::blocks::{
    BlockContent, BlockStyles, ButtonContent, ContactContent, FeaturesContent, HeadingContent,
    HeroContent, ImageContent, ImagePosition, ImageTextContent, PdfContent, ResolvedBlock,
    TestimonialsContent, TextContent, VideoContent,
};
use crate::domain::entities::{PageComponentRecord, ProductComponent};
use crate::domain::types::BlockKind;

const TEXT_PLACEHOLDER: &str = "Add your text here";
const TITLE_PLACEHOLDER: &str = "Untitled section";
const BUTTON_PLACEHOLDER: &str = "Click here";
const MINIMAL_FALLBACK: &str =
    r#"<div class="block block-unknown" role="note">Unknown component type</div>"#;

/// Render one stored `(type, content, styles)` triple.
pub fn render_block(type_name: &str, content: &Value, styles: &Value) -> String {
    render_resolved(&ResolvedBlock::resolve(type_name, content, styles))
}

pub fn render_resolved(block: &ResolvedBlock) -> String {
    match block {
        ResolvedBlock::Known { content, styles } => render_content(content, styles),
        ResolvedBlock::Unknown { type_name } => {
            counter!("brandpage_render_fallback_total", "reason" => "unknown_type").increment(1);
            render_view(
                None,
                UnknownBlock {
                    type_name: type_name.clone(),
                },
            )
        }
    }
}

/// Active landing page rows in position order.
pub fn render_page_components(rows: &[PageComponentRecord]) -> Vec<String> {
    let mut active: Vec<&PageComponentRecord> = rows.iter().filter(|row| row.is_active).collect();
    active.sort_by_key(|row| row.position);
    active
        .into_iter()
        .map(|row| render_block(&row.component_type, &row.content, &row.styles))
        .collect()
}

/// Active product design components in `order`.
pub fn render_product_components(components: &[ProductComponent]) -> Vec<String> {
    let mut active: Vec<&ProductComponent> = components
        .iter()
        .filter(|component| component.is_active)
        .collect();
    active.sort_by_key(|component| component.order);
    active
        .into_iter()
        .map(|component| {
            render_block(
                &component.component_type,
                &component.content,
                &component.styles,
            )
        })
        .collect()
}

pub fn render_content(content: &BlockContent, styles: &BlockStyles) -> String {
    let style = styles.to_inline_css();
    let kind = Some(content.kind());

    match content {
        BlockContent::Hero(inner) => render_view(kind, HeroBlock::new(style, inner)),
        BlockContent::Features(inner) => render_view(kind, FeaturesBlock::new(style, inner)),
        BlockContent::Testimonials(inner) => {
            render_view(kind, TestimonialsBlock::new(style, inner))
        }
        BlockContent::Contact(inner) => render_view(kind, ContactBlock::new(style, inner)),
        BlockContent::Pdf(inner) => render_view(kind, PdfBlock::new(style, inner)),
        BlockContent::Video(inner) => render_view(kind, VideoBlock::new(style, inner)),
        BlockContent::Image(inner) => render_view(kind, ImageBlock::new(style, inner)),
        BlockContent::ImageText(inner) => render_view(kind, ImageTextBlock::new(style, inner)),
        BlockContent::Heading(inner) => render_view(kind, HeadingBlock::new(style, inner)),
        BlockContent::Text(inner) => render_view(kind, TextBlock::new(style, inner)),
        BlockContent::Custom(inner) => render_view(
            kind,
            CustomBlock {
                style,
                html: ammonia::clean(&inner.html),
            },
        ),
        BlockContent::Button(inner) => render_view(kind, ButtonBlock::new(style, inner)),
        BlockContent::Divider(_) => render_view(kind, DividerBlock { style }),
    }
}

fn render_view<T: Template>(kind: Option<BlockKind>, view: T) -> String {
    match view.render() {
        Ok(html) => html,
        Err(err) => {
            warn!(
                target = "brandpage::presentation::blocks",
                kind = kind.map(BlockKind::as_str).unwrap_or("unknown"),
                error = %err,
                "block template failed; rendering fallback"
            );
            counter!("brandpage_render_fallback_total", "reason" => "template").increment(1);
            MINIMAL_FALLBACK.to_string()
        }
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Links may be absolute http(s), `mailto:`/`tel:`, site-relative or anchors.
fn safe_href(value: &str) -> String {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    let allowed = lower.starts_with("https://")
        || lower.starts_with("http://")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || (trimmed.starts_with('/') && !trimmed.starts_with("//"))
        || trimmed.starts_with('#');
    if allowed { trimmed.to_string() } else { "#".to_string() }
}

/// Media sources must be absolute http(s) or served from this site.
fn safe_src(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    let lower = trimmed.to_ascii_lowercase();
    let allowed = lower.starts_with("https://")
        || lower.starts_with("http://")
        || (trimmed.starts_with('/') && !trimmed.starts_with("//"));
    allowed.then(|| trimmed.to_string())
}

fn stars(rating: Option<u8>) -> String {
    match rating {
        Some(value) => {
            let filled = usize::from(value.min(5));
            format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
        }
        None => String::new(),
    }
}

/// YouTube and Vimeo links become player embeds; other URLs play natively.
fn video_embed(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if let Some(rest) = trimmed
        .split_once("youtube.com/watch?v=")
        .map(|(_, rest)| rest)
        .or_else(|| trimmed.split_once("youtu.be/").map(|(_, rest)| rest))
    {
        let id: String = rest
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
            .collect();
        return (!id.is_empty()).then(|| format!("https://www.youtube.com/embed/{id}"));
    }
    if let Some((_, rest)) = trimmed.split_once("vimeo.com/") {
        let id: String = rest.chars().take_while(char::is_ascii_digit).collect();
        return (!id.is_empty()).then(|| format!("https://player.vimeo.com/video/{id}"));
    }
    None
}

#[derive(Template)]
#[template(path = "blocks/hero.html")]
struct HeroBlock {
    style: String,
    title: String,
    subtitle: Option<String>,
    image_url: Option<String>,
    button_text: Option<String>,
    button_link: String,
}

impl HeroBlock {
    fn new(style: String, content: &HeroContent) -> Self {
        Self {
            style,
            title: or_placeholder(&content.title, TITLE_PLACEHOLDER),
            subtitle: non_empty(&content.subtitle),
            image_url: safe_src(content.image_url.as_deref()),
            button_text: non_empty(&content.button_text),
            button_link: safe_href(&content.button_link),
        }
    }
}

struct FeatureView {
    title: String,
    description: String,
    icon: Option<String>,
}

#[derive(Template)]
#[template(path = "blocks/features.html")]
struct FeaturesBlock {
    style: String,
    title: Option<String>,
    items: Vec<FeatureView>,
}

impl FeaturesBlock {
    fn new(style: String, content: &FeaturesContent) -> Self {
        Self {
            style,
            title: non_empty(&content.title),
            items: content
                .items
                .iter()
                .map(|item| FeatureView {
                    title: or_placeholder(&item.title, TITLE_PLACEHOLDER),
                    description: or_placeholder(&item.description, TEXT_PLACEHOLDER),
                    icon: item.icon.as_deref().and_then(non_empty),
                })
                .collect(),
        }
    }
}

struct ReviewView {
    author: String,
    role: Option<String>,
    quote: String,
    stars: String,
    avatar_url: Option<String>,
}

#[derive(Template)]
#[template(path = "blocks/testimonials.html")]
struct TestimonialsBlock {
    style: String,
    title: Option<String>,
    reviews: Vec<ReviewView>,
}

impl TestimonialsBlock {
    fn new(style: String, content: &TestimonialsContent) -> Self {
        Self {
            style,
            title: non_empty(&content.title),
            reviews: content
                .reviews
                .iter()
                .map(|review| ReviewView {
                    author: or_placeholder(&review.author, "Anonymous"),
                    role: non_empty(&review.role),
                    quote: or_placeholder(&review.quote, TEXT_PLACEHOLDER),
                    stars: stars(review.rating),
                    avatar_url: safe_src(review.avatar_url.as_deref()),
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/contact.html")]
struct ContactBlock {
    style: String,
    title: String,
    description: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    show_form: bool,
}

impl ContactBlock {
    fn new(style: String, content: &ContactContent) -> Self {
        Self {
            style,
            title: or_placeholder(&content.title, "Contact us"),
            description: non_empty(&content.description),
            email: non_empty(&content.email),
            phone: non_empty(&content.phone),
            address: non_empty(&content.address),
            show_form: content.show_form,
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/pdf.html")]
struct PdfBlock {
    style: String,
    title: Option<String>,
    file_url: Option<String>,
    file_name: String,
}

impl PdfBlock {
    fn new(style: String, content: &PdfContent) -> Self {
        Self {
            style,
            title: non_empty(&content.title),
            file_url: safe_src(content.file_url.as_deref()),
            file_name: or_placeholder(&content.file_name, "Download document"),
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/video.html")]
struct VideoBlock {
    style: String,
    title: Option<String>,
    embed_url: Option<String>,
    video_url: Option<String>,
    autoplay: bool,
}

impl VideoBlock {
    fn new(style: String, content: &VideoContent) -> Self {
        let source = safe_src(content.video_url.as_deref());
        let embed_url = source.as_deref().and_then(video_embed);
        let video_url = if embed_url.is_some() { None } else { source };
        Self {
            style,
            title: non_empty(&content.title),
            embed_url,
            video_url,
            autoplay: content.autoplay,
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/image.html")]
struct ImageBlock {
    style: String,
    image_url: Option<String>,
    alt: String,
    caption: Option<String>,
}

impl ImageBlock {
    fn new(style: String, content: &ImageContent) -> Self {
        Self {
            style,
            image_url: safe_src(content.image_url.as_deref()),
            alt: content.alt.trim().to_string(),
            caption: non_empty(&content.caption),
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/image_text.html")]
struct ImageTextBlock {
    style: String,
    title: Option<String>,
    paragraphs: Vec<String>,
    image_url: Option<String>,
    image_right: bool,
}

impl ImageTextBlock {
    fn new(style: String, content: &ImageTextContent) -> Self {
        Self {
            style,
            title: non_empty(&content.title),
            paragraphs: paragraphs(&content.text),
            image_url: safe_src(content.image_url.as_deref()),
            image_right: content.image_position == ImagePosition::Right,
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/heading.html")]
struct HeadingBlock {
    style: String,
    level: u8,
    text: String,
}

impl HeadingBlock {
    fn new(style: String, content: &HeadingContent) -> Self {
        let level = if content.level == 0 {
            2
        } else {
            content.level.min(6)
        };
        Self {
            style,
            level,
            text: or_placeholder(&content.text, "Heading"),
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/text.html")]
struct TextBlock {
    style: String,
    paragraphs: Vec<String>,
}

impl TextBlock {
    fn new(style: String, content: &TextContent) -> Self {
        Self {
            style,
            paragraphs: paragraphs(&content.text),
        }
    }
}

fn paragraphs(text: &str) -> Vec<String> {
    let parts: Vec<String> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    if parts.is_empty() {
        vec![TEXT_PLACEHOLDER.to_string()]
    } else {
        parts
    }
}

#[derive(Template)]
#[template(path = "blocks/custom.html")]
struct CustomBlock {
    style: String,
    html: String,
}

#[derive(Template)]
#[template(path = "blocks/button.html")]
struct ButtonBlock {
    style: String,
    label: String,
    link: String,
}

impl ButtonBlock {
    fn new(style: String, content: &ButtonContent) -> Self {
        Self {
            style,
            label: or_placeholder(&content.label, BUTTON_PLACEHOLDER),
            link: safe_href(&content.link),
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/divider.html")]
struct DividerBlock {
    style: String,
}

#[derive(Template)]
#[template(path = "blocks/unknown.html")]
struct UnknownBlock {
    type_name: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_image_renders_placeholder() {
        let html = render_block("IMAGE", &json!({}), &json!({}));
        assert!(html.contains("No image uploaded"));
    }

    #[test]
    fn unknown_type_renders_fallback_with_escaped_name() {
        let html = render_block("<script>", &json!({}), &json!({}));
        assert!(html.contains("Unknown component type"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn custom_html_is_sanitised() {
        let html = render_block(
            "CUSTOM",
            &json!({ "html": "<p onclick=\"x()\">Hi</p><script>alert(1)</script>" }),
            &json!({}),
        );
        assert!(html.contains("<p>Hi</p>"));
        assert!(!html.contains("script"));
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn styles_become_inline_css() {
        let html = render_block(
            "DIVIDER",
            &json!({}),
            &json!({ "marginTop": "2rem", "color": "red\"; x" }),
        );
        assert!(html.contains("margin-top: 2rem"));
        assert!(!html.contains("color"));
    }

    #[test]
    fn javascript_links_are_neutralised() {
        let html = render_block(
            "BUTTON",
            &json!({ "label": "Go", "link": "javascript:alert(1)" }),
            &json!({}),
        );
        assert!(html.contains("href=\"#\""));
        assert!(!html.contains("javascript"));
    }

    #[test]
    fn heading_level_is_clamped() {
        let html = render_block("HEADING", &json!({ "text": "Hi", "level": 9 }), &json!({}));
        assert!(html.contains("<h6"));
    }

    #[test]
    fn youtube_links_become_embeds() {
        assert_eq!(
            video_embed("https://www.youtube.com/watch?v=abc_123&t=4").as_deref(),
            Some("https://www.youtube.com/embed/abc_123")
        );
        assert_eq!(
            video_embed("https://vimeo.com/76979871").as_deref(),
            Some("https://player.vimeo.com/video/76979871")
        );
        assert_eq!(video_embed("https://cdn.example.com/clip.mp4"), None);
    }

    #[test]
    fn inactive_rows_are_skipped_and_positions_ordered() {
        let row = |position: i32, text: &str, is_active: bool| PageComponentRecord {
            id: uuid::Uuid::new_v4(),
            page_id: uuid::Uuid::nil(),
            component_type: "TEXT".to_string(),
            content: json!({ "text": text }),
            styles: json!({}),
            position,
            is_active,
        };
        let rendered = render_page_components(&[
            row(1, "second", true),
            row(0, "first", true),
            row(2, "hidden", false),
        ]);

        assert_eq!(rendered.len(), 2);
        assert!(rendered[0].contains("first"));
        assert!(rendered[1].contains("second"));
    }
}
