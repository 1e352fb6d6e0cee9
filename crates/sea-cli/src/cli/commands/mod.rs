//! CLI command handlers.

pub mod ask;
pub mod auth;
pub mod config;
pub mod documents;
pub mod render;
