//! HTML rendering for published pages.

pub mod blocks;
pub mod views;
