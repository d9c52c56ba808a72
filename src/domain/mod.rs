//! Domain layer types and invariants.

pub mod blocks;
pub mod editor;
pub mod entities;
pub mod error;
pub mod qr;
pub mod slug;
pub mod types;
pub mod visit;
