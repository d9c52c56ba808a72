//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::{FileBucket, QrTargetKind, VisitSource};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A persisted login session. Only the SHA-256 of the bearer token is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl SessionRecord {
    pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryRecord {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    /// Price in minor currency units.
    pub price_cents: Option<i64>,
    pub image_url: Option<String>,
    pub sku: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    pub brand_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub bucket: FileBucket,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub stored_path: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl FileRecord {
    /// Public URL the asset is served from.
    pub fn public_url(&self) -> String {
        format!("/uploads/{}", self.stored_path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeRecord {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub name: String,
    pub target_kind: QrTargetKind,
    pub landing_page_id: Option<Uuid>,
    pub external_url: Option<String>,
    pub foreground_color: String,
    pub background_color: String,
    pub size: i32,
    pub scan_count: i64,
    pub view_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrScanRecord {
    pub id: Uuid,
    pub qr_code_id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_agent: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub scanned_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPageRecord {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub title: String,
    pub slug: String,
    pub background_color: String,
    pub font_family: String,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// One stored component row of a landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageComponentRecord {
    pub id: Uuid,
    pub page_id: Uuid,
    #[serde(rename = "type")]
    pub component_type: String,
    pub content: Value,
    pub styles: Value,
    pub position: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPageViewRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub landing_page_id: Uuid,
    pub source: VisitSource,
    pub qr_code_id: Option<Uuid>,
    pub visit_count: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub first_visited_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_visited_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmissionRecord {
    pub id: Uuid,
    pub landing_page_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn default_background() -> String {
    "#ffffff".to_string()
}

fn default_font_family() -> String {
    "Inter, sans-serif".to_string()
}

fn default_max_width() -> String {
    "960px".to_string()
}

fn default_active() -> bool {
    true
}

/// Page-wide presentation settings of a product design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_max_width")]
    pub max_width: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            background_color: default_background(),
            font_family: default_font_family(),
            max_width: default_max_width(),
        }
    }
}

/// A component as stored inside a product design document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductComponent {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub styles: Value,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// JSON document persisted in `product_designs.content`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDocument {
    #[serde(default)]
    pub components: Vec<ProductComponent>,
    #[serde(default)]
    pub page_settings: PageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDesignRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Option<Uuid>,
    pub title: String,
    pub content: DesignDocument,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn design_document_fills_missing_settings() {
        let doc: DesignDocument = serde_json::from_value(json!({
            "components": [{ "id": Uuid::nil(), "type": "TEXT" }]
        }))
        .expect("decode document");

        assert_eq!(doc.page_settings, PageSettings::default());
        assert_eq!(doc.components.len(), 1);
        assert!(doc.components[0].is_active);
        assert!(doc.components[0].content.is_null());
    }
}
