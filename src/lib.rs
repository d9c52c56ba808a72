//! Brand pages: QR codes, landing pages and product pages for multi-tenant brands.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
