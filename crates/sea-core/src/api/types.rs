//! Request and response bodies private to the client.

use sea_types::InferenceInteraction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct AuthenticateRequest<'a> {
    pub email: &'a str,
    /// The backend names the password field `credentials`.
    pub credentials: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthenticateResponse {
    pub token: String,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct InferenceQueryRequest<'a> {
    pub inference_interactions: &'a [InferenceInteraction],
}
