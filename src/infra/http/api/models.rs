use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::editor::ComponentInput;
use crate::domain::entities::{
    FileRecord, LandingPageRecord, LandingPageViewRecord, PageComponentRecord, PageSettings,
    QrCodeRecord,
};
use crate::domain::types::QrTargetKind;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandCreateRequest {
    pub name: String,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandUpdateRequest {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

/// Create or rename a category or subcategory.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub image_url: Option<String>,
    pub sku: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPageCreateRequest {
    pub brand_id: Uuid,
    pub title: String,
    pub slug: Option<String>,
    pub background_color: Option<String>,
    pub font_family: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPageUpdateRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub background_color: Option<String>,
    pub font_family: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ComponentsRequest {
    pub components: Vec<ComponentInput>,
}

#[derive(Debug, Serialize)]
pub struct LandingPageResponse {
    #[serde(flatten)]
    pub page: LandingPageRecord,
    pub components: Vec<PageComponentRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRequest {
    pub title: String,
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub components: Vec<ComponentInput>,
    pub page_settings: Option<PageSettings>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeRequest {
    pub name: String,
    pub target_kind: QrTargetKind,
    pub landing_page_id: Option<Uuid>,
    pub external_url: Option<String>,
    pub foreground_color: Option<String>,
    pub background_color: Option<String>,
    pub size: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeResponse {
    #[serde(flatten)]
    pub code: QrCodeRecord,
    pub image_url: String,
    pub redirect_path: String,
}

#[derive(Debug, Serialize)]
pub struct FileResponse {
    #[serde(flatten)]
    pub file: FileRecord,
    pub url: String,
}

impl From<FileRecord> for FileResponse {
    fn from(file: FileRecord) -> Self {
        let url = file.public_url();
        Self { file, url }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListQuery {
    pub brand_id: Option<Uuid>,
}

/// Per-page visit analytics: one row per visitor.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewsResponse {
    pub unique_visitors: usize,
    pub total_visits: i64,
    pub qr_visitors: usize,
    pub views: Vec<LandingPageViewRecord>,
}

impl From<Vec<LandingPageViewRecord>> for ViewsResponse {
    fn from(views: Vec<LandingPageViewRecord>) -> Self {
        Self {
            unique_visitors: views.len(),
            total_visits: views.iter().map(|view| i64::from(view.visit_count)).sum(),
            qr_visitors: views
                .iter()
                .filter(|view| view.qr_code_id.is_some())
                .count(),
            views,
        }
    }
}

/// Public contact form body. Fields default to empty so a missing field is a
/// 400 from the service rather than a deserialisation rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactRequest {
    pub landing_page_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::domain::types::VisitSource;

    fn view(visit_count: i32, qr: bool) -> LandingPageViewRecord {
        LandingPageViewRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            landing_page_id: Uuid::nil(),
            source: if qr {
                VisitSource::QrScan
            } else {
                VisitSource::Direct
            },
            qr_code_id: qr.then(Uuid::new_v4),
            visit_count,
            first_visited_at: OffsetDateTime::UNIX_EPOCH,
            last_visited_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn views_summary_counts_visitors_and_visits() {
        let summary = ViewsResponse::from(vec![view(2, false), view(3, true)]);
        assert_eq!(summary.unique_visitors, 2);
        assert_eq!(summary.total_visits, 5);
        assert_eq!(summary.qr_visitors, 1);
    }

    #[test]
    fn contact_request_tolerates_missing_fields() {
        let request: ContactRequest =
            serde_json::from_str(r#"{"name":"Ada"}"#).expect("decode contact");
        assert_eq!(request.name, "Ada");
        assert!(request.email.is_empty());
    }
}
