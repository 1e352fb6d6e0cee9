//! SEA backend API client.
//!
//! JSON over HTTP against a configurable base URL. Every typed operation goes
//! through one request primitive that attaches the bearer token and cookies
//! and maps non-2xx responses to [`ApiError`].

mod client;
mod error;
mod types;

pub use client::{SeaClient, SeaClientConfig, USER_AGENT};
pub use error::{ApiError, ApiErrorKind, ApiResult};
