//! Application services orchestrating domain logic and persistence.

pub mod auth;
pub mod brands;
pub mod catalog;
pub mod contact;
pub mod error;
pub mod files;
pub mod landing_pages;
pub mod product_designs;
pub mod qr_codes;
pub mod repos;
pub mod session_watch;
pub mod visits;
