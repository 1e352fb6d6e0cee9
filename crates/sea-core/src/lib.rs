//! Core SEA library (API client, session token, markdown rendering, config).

pub mod api;
pub mod config;
pub mod markdown;
pub mod session;
pub mod storage;

pub use sea_types as types;
