pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use crate::infra::http::RouterState;
use crate::infra::http::middleware::log_responses;

/// Authenticated JSON API used by the brand, page and design editors.
pub fn build_api_router(state: RouterState) -> Router<RouterState> {
    let auth_state = state.clone();
    let rate_state = state.clone();
    let upload_limit = DefaultBodyLimit::max(ApiState::from_ref(&state).upload_body_limit);

    Router::new()
        .route(
            "/api/session",
            get(handlers::current_session).delete(handlers::sign_out),
        )
        .route(
            "/api/brands",
            get(handlers::list_brands).post(handlers::create_brand),
        )
        .route(
            "/api/brands/{brand_id}",
            get(handlers::get_brand)
                .patch(handlers::update_brand)
                .delete(handlers::delete_brand),
        )
        .route(
            "/api/brands/{brand_id}/files",
            get(handlers::list_brand_files)
                .post(handlers::upload_brand_file)
                .layer(upload_limit.clone()),
        )
        .route(
            "/api/brands/{brand_id}/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/brands/{brand_id}/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/brands/{brand_id}/landing-pages",
            get(handlers::list_landing_pages),
        )
        .route(
            "/api/brands/{brand_id}/qr-codes",
            get(handlers::list_qr_codes).post(handlers::create_qr_code),
        )
        .route(
            "/api/categories/{id}",
            put(handlers::rename_category).delete(handlers::delete_category),
        )
        .route(
            "/api/categories/{id}/subcategories",
            get(handlers::list_subcategories).post(handlers::create_subcategory),
        )
        .route(
            "/api/subcategories/{id}",
            put(handlers::rename_subcategory).delete(handlers::delete_subcategory),
        )
        .route(
            "/api/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/api/files", get(handlers::list_files))
        .route("/api/files/{id}", delete(handlers::delete_file))
        .route(
            "/api/upload",
            post(handlers::upload_file).layer(upload_limit),
        )
        .route("/api/landing-pages", post(handlers::create_landing_page))
        .route(
            "/api/landing-pages/{id}",
            get(handlers::get_landing_page)
                .patch(handlers::update_landing_page)
                .delete(handlers::delete_landing_page),
        )
        .route(
            "/api/landing-pages/{id}/components",
            put(handlers::save_landing_page_components),
        )
        .route(
            "/api/landing-pages/{id}/views",
            get(handlers::list_landing_page_views),
        )
        .route(
            "/api/landing-pages/{id}/contact-submissions",
            get(handlers::list_contact_submissions),
        )
        .route(
            "/api/designs",
            get(handlers::list_designs).post(handlers::create_design),
        )
        .route(
            "/api/designs/{id}",
            get(handlers::get_design)
                .put(handlers::save_design)
                .delete(handlers::delete_design),
        )
        .route(
            "/api/qr-codes/{id}",
            get(handlers::get_qr_code)
                .put(handlers::update_qr_code)
                .delete(handlers::delete_qr_code),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            rate_state,
            middleware::api_rate_limit,
        ))
        .layer(axum_middleware::from_fn_with_state(
            auth_state,
            middleware::api_auth,
        ))
        .layer(axum_middleware::from_fn(log_responses))
}
