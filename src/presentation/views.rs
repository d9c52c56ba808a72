use crate::application::error::{ErrorReport, HttpError};
use crate::application::landing_pages::LandingPageWithComponents;
use crate::domain::blocks::BlockStyles;
use crate::domain::entities::ProductDesignRecord;
use crate::domain::visit::GateState;
use crate::presentation::blocks::{render_page_components, render_product_components};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response() -> Response {
    let view = ErrorPageView::not_found();
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// The sign-in prompt overlay of a published landing page.
pub struct GateView {
    pub prompt_visible: bool,
    pub skip_action: String,
    pub stream_url: String,
    pub sign_in_url: String,
    pub register_url: String,
    /// Unix timestamp the running skip countdown ends at.
    pub skip_until: Option<i64>,
}

impl GateView {
    pub fn new(slug: &str, state: &GateState, sign_in_path: &str) -> Self {
        let skip_until = match state {
            GateState::Skipped { until } => Some(until.unix_timestamp()),
            _ => None,
        };

        Self {
            prompt_visible: state.is_prompt(),
            skip_action: format!("/{slug}/skip"),
            stream_url: format!("/{slug}/gate"),
            sign_in_url: format!("{sign_in_path}?redirect=/{slug}"),
            register_url: format!("{sign_in_path}?redirect=/{slug}&mode=register"),
            skip_until,
        }
    }
}

pub struct LandingPageView {
    pub title: String,
    pub page_id: String,
    pub page_style: String,
    pub blocks: Vec<String>,
    pub gate: GateView,
}

impl LandingPageView {
    pub fn new(page: &LandingPageWithComponents, gate: GateView) -> Self {
        Self {
            title: page.page.title.clone(),
            page_id: page.page.id.to_string(),
            page_style: BlockStyles::from_pairs([
                ("backgroundColor", page.page.background_color.as_str()),
                ("fontFamily", page.page.font_family.as_str()),
            ])
            .to_inline_css(),
            blocks: render_page_components(&page.components),
            gate,
        }
    }
}

#[derive(Template)]
#[template(path = "landing_page.html")]
pub struct LandingPageTemplate {
    pub view: LandingPageView,
}

pub struct DesignPageView {
    pub title: String,
    pub page_style: String,
    pub content_style: String,
    pub blocks: Vec<String>,
}

impl DesignPageView {
    pub fn new(design: &ProductDesignRecord) -> Self {
        let settings = &design.content.page_settings;
        Self {
            title: design.title.clone(),
            page_style: BlockStyles::from_pairs([
                ("backgroundColor", settings.background_color.as_str()),
                ("fontFamily", settings.font_family.as_str()),
            ])
            .to_inline_css(),
            content_style: BlockStyles::from_pairs([("maxWidth", settings.max_width.as_str())])
                .to_inline_css(),
            blocks: render_product_components(&design.content.components),
        }
    }
}

#[derive(Template)]
#[template(path = "design_page.html")]
pub struct DesignPageTemplate {
    pub view: DesignPageView,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "This page does not exist or is not published yet.".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: ErrorPageView,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn gate_view_links_back_to_the_page() {
        let gate = GateView::new("spring-sale", &GateState::PromptShown, "/auth/sign-in");
        assert!(gate.prompt_visible);
        assert_eq!(gate.skip_action, "/spring-sale/skip");
        assert_eq!(gate.stream_url, "/spring-sale/gate");
        assert_eq!(gate.sign_in_url, "/auth/sign-in?redirect=/spring-sale");
        assert_eq!(gate.skip_until, None);
    }

    #[test]
    fn skipped_gate_exposes_deadline() {
        let until = datetime!(2026-03-01 12:02 UTC);
        let gate = GateView::new("p", &GateState::Skipped { until }, "/auth/sign-in");
        assert!(!gate.prompt_visible);
        assert_eq!(gate.skip_until, Some(until.unix_timestamp()));

        let signed_in = GateView::new(
            "p",
            &GateState::Authenticated {
                user_id: Uuid::nil(),
            },
            "/auth/sign-in",
        );
        assert!(!signed_in.prompt_visible);
    }
}
