use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Method;
use sea_types::{AuthenticatedUser, DocumentSearchResult, InferenceInteraction, InferenceResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use super::error::{ApiError, ApiErrorKind, ApiResult};
use super::types::{AuthenticateRequest, AuthenticateResponse, InferenceQueryRequest};
use crate::config::{Config, parse_base_url};
use crate::session::{SessionCookieJar, StorageMirror, TokenMirror, TokenStore};
use crate::storage::KeyValueStorage;

/// Standard User-Agent header for SEA API requests.
pub const USER_AGENT: &str = concat!("sea/", env!("CARGO_PKG_VERSION"));

/// Placeholder for requests without a body.
const NO_BODY: Option<&()> = None;

/// Connection settings for [`SeaClient`].
#[derive(Debug, Clone)]
pub struct SeaClientConfig {
    /// Base URL, always ending in `/`
    pub base_url: Url,
    /// Per-request timeout (None waits indefinitely)
    pub timeout: Option<Duration>,
}

impl SeaClientConfig {
    /// Creates a config for `base_url` without a timeout.
    ///
    /// # Errors
    /// Returns an error if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: None,
        })
    }

    /// Builds client settings from the loaded config.
    ///
    /// Base URL resolution order:
    /// 1. `SEA_BASE_URL` env var (if set and non-empty)
    /// 2. `cli_override` (if Some and non-empty)
    /// 3. `base_url` from config.toml
    /// 4. Default: `http://localhost:8000/api/`
    ///
    /// # Errors
    /// Returns an error if the resolved base URL is invalid.
    pub fn from_config(config: &Config, cli_override: Option<&str>) -> Result<Self> {
        Ok(Self {
            base_url: config.resolve_base_url(cli_override)?,
            timeout: config.request_timeout(),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Optional parts of a backend request.
struct RequestOptions<'a, B: Serialize + ?Sized> {
    query: &'a [(&'a str, &'a str)],
    body: Option<&'a B>,
    token: Option<&'a str>,
}

/// Client for the SEA backend API.
///
/// The client is `Send + Sync`; share it behind an `Arc` to issue requests
/// from several tasks. Each request is independent and nothing orders their
/// completion.
pub struct SeaClient {
    config: SeaClientConfig,
    http: reqwest::Client,
    cookies: Arc<SessionCookieJar>,
    tokens: TokenStore,
}

impl SeaClient {
    /// Creates a client, recovering a session token persisted by an earlier
    /// run from `storage` if there is one.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: SeaClientConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        let cookies = Arc::new(SessionCookieJar::new(config.base_url.clone()));
        let tokens = TokenStore::recover(Self::mirrors(&cookies, storage));
        Self::assemble(config, cookies, tokens)
    }

    /// Creates a client that starts authenticated with `token`.
    ///
    /// The token is written through to `storage` and the cookie jar.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_token(
        config: SeaClientConfig,
        storage: Arc<dyn KeyValueStorage>,
        token: &str,
    ) -> Result<Self> {
        let cookies = Arc::new(SessionCookieJar::new(config.base_url.clone()));
        let tokens = TokenStore::with_token(Self::mirrors(&cookies, storage), token);
        Self::assemble(config, cookies, tokens)
    }

    fn mirrors(
        cookies: &Arc<SessionCookieJar>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Vec<Arc<dyn TokenMirror>> {
        vec![
            Arc::new(StorageMirror::new(storage)),
            Arc::<SessionCookieJar>::clone(cookies),
        ]
    }

    fn assemble(
        config: SeaClientConfig,
        cookies: Arc<SessionCookieJar>,
        tokens: TokenStore,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(Arc::<SessionCookieJar>::clone(&cookies))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            config,
            http,
            cookies,
            tokens,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Whether a session token is held.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_set()
    }

    /// Returns the current session token.
    pub fn token(&self) -> Option<String> {
        self.tokens.get()
    }

    /// Cookie jar attached to every request.
    pub fn cookie_jar(&self) -> &SessionCookieJar {
        &self.cookies
    }

    /// Forgets the session token, in memory and in every persisted copy.
    pub fn clear_token(&self) {
        self.tokens.clear();
        info!("Session token cleared");
    }

    /// Exchanges credentials for a session token.
    ///
    /// On success the token is stored and the user's display name returned.
    /// On failure, including a blank token in the response, the token state
    /// is left untouched.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the request or answers with
    /// an unexpected body.
    pub async fn authenticate(&self, email: &str, password: &str) -> ApiResult<AuthenticatedUser> {
        let body = AuthenticateRequest {
            email,
            credentials: password,
        };

        let response: AuthenticateResponse = self
            .request(
                Method::POST,
                "authenticate",
                RequestOptions {
                    query: &[],
                    body: Some(&body),
                    token: None,
                },
            )
            .await?;

        if response.token.trim().is_empty() {
            return Err(ApiError::new(
                ApiErrorKind::Decode,
                "Failed to parse authenticate response: empty token",
            ));
        }

        self.tokens.set(&response.token);
        info!(display_name = %response.display_name, "Authenticated");

        Ok(AuthenticatedUser {
            display_name: response.display_name,
        })
    }

    /// Sends the conversation so far and returns the backend's answer.
    ///
    /// `interactions` is sent in the order given.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the request or answers with
    /// an unexpected body.
    pub async fn inference_query(
        &self,
        interactions: &[InferenceInteraction],
    ) -> ApiResult<InferenceResult> {
        let token = self.tokens.get();
        let body = InferenceQueryRequest {
            inference_interactions: interactions,
        };

        self.request(
            Method::POST,
            "inference/query",
            RequestOptions {
                query: &[],
                body: Some(&body),
                token: token.as_deref(),
            },
        )
        .await
    }

    /// Searches the document index.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the request or answers with
    /// an unexpected body.
    pub async fn search_documents(&self, query: &str) -> ApiResult<Vec<DocumentSearchResult>> {
        let token = self.tokens.get();

        self.request(
            Method::GET,
            "search_documents",
            RequestOptions {
                query: &[("query", query)],
                body: NO_BODY,
                token: token.as_deref(),
            },
        )
        .await
    }

    /// Returns the download URL for a document. No request is made.
    ///
    /// The hash is percent-encoded as a single path segment.
    pub fn build_document_url(&self, hash: &str) -> Url {
        let mut url = self.config.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("document").push(hash);
        }
        url
    }

    /// Sends one JSON request and decodes the JSON response.
    ///
    /// Attaches `Authorization: Bearer <token>` when a token is given;
    /// cookies come from the jar. Any non-2xx status is an error and the
    /// body of a failed response is never decoded.
    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions<'_, B>,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.config.base_url.join(path).map_err(|e| {
            ApiError::new(
                ApiErrorKind::Transport,
                format!("Invalid request path '{path}': {e}"),
            )
        })?;

        debug!("Sending API request to {method} {url}");

        let mut builder = self.http.request(method.clone(), url.clone());
        if !options.query.is_empty() {
            builder = builder.query(options.query);
        }
        if let Some(body) = options.body {
            builder = builder.json(body);
        }
        if let Some(token) = options.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| ApiError::transport(&e))?;

        let status = response.status();
        debug!(status = status.as_u16(), "Received API response from {method} {url}");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status, &body));
        }

        let bytes = response.bytes().await.map_err(|e| ApiError::transport(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::decode(path, &e))
    }
}
