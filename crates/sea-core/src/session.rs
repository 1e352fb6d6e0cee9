//! Session token lifecycle.
//!
//! A client holds at most one session token. The in-memory value is
//! mirrored into every [`TokenMirror`] (the persistent key-value storage
//! and the cookie jar attached to the HTTP client) so the token survives
//! restarts and reaches the backend both as a bearer header and as a
//! cookie. [`TokenStore`] is the single place that keeps the three in
//! step. Tokens are never logged in full, see [`mask_token`].

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use tracing::{debug, warn};
use url::Url;

use crate::storage::KeyValueStorage;

/// Storage key holding the session token.
pub const TOKEN_STORAGE_KEY: &str = "sea_token";

/// Cookie name carrying the session token.
pub const TOKEN_COOKIE_NAME: &str = "X-Sea-Token";

/// One persisted copy of the session token.
pub trait TokenMirror: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// # Errors
    /// Returns an error if the mirror cannot be read.
    fn read(&self) -> Result<Option<String>>;

    /// # Errors
    /// Returns an error if the mirror cannot be written.
    fn write(&self, token: &str) -> Result<()>;

    /// # Errors
    /// Returns an error if the mirror cannot be written.
    fn erase(&self) -> Result<()>;
}

/// Mirrors the token into a [`KeyValueStorage`] entry.
pub struct StorageMirror {
    storage: Arc<dyn KeyValueStorage>,
}

impl StorageMirror {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }
}

impl TokenMirror for StorageMirror {
    fn name(&self) -> &'static str {
        "storage"
    }

    fn read(&self) -> Result<Option<String>> {
        self.storage.get_item(TOKEN_STORAGE_KEY)
    }

    fn write(&self, token: &str) -> Result<()> {
        self.storage.set_item(TOKEN_STORAGE_KEY, token)
    }

    fn erase(&self) -> Result<()> {
        self.storage.remove_item(TOKEN_STORAGE_KEY)
    }
}

/// Cookie jar scoped to the backend origin.
///
/// Installed as the HTTP client's cookie provider, so every request to the
/// backend carries the session cookie along with whatever cookies the
/// backend set itself. Unlike `reqwest::cookie::Jar` it supports removal,
/// which logging out needs.
#[derive(Debug)]
pub struct SessionCookieJar {
    origin: Url,
    cookies: RwLock<BTreeMap<String, String>>,
}

impl SessionCookieJar {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            cookies: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the current value of a cookie.
    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Returns the session token cookie, if set.
    pub fn token(&self) -> Option<String> {
        self.get(TOKEN_COOKIE_NAME)
    }

    fn same_origin(&self, url: &Url) -> bool {
        url.scheme() == self.origin.scheme()
            && url.host_str() == self.origin.host_str()
            && url.port_or_known_default() == self.origin.port_or_known_default()
    }

    fn insert(&self, name: &str, value: &str) {
        self.cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());
    }

    fn remove(&self, name: &str) {
        self.cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}

impl TokenMirror for SessionCookieJar {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn read(&self) -> Result<Option<String>> {
        Ok(self.token())
    }

    fn write(&self, token: &str) -> Result<()> {
        if token.is_empty() || !token.bytes().all(is_cookie_octet) {
            // Never leave an earlier session's token behind.
            self.remove(TOKEN_COOKIE_NAME);
            anyhow::bail!("Session token contains characters not allowed in a cookie");
        }
        self.insert(TOKEN_COOKIE_NAME, token);
        Ok(())
    }

    fn erase(&self) -> Result<()> {
        self.remove(TOKEN_COOKIE_NAME);
        Ok(())
    }
}

impl CookieStore for SessionCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        if !self.same_origin(url) {
            return;
        }

        for header in cookie_headers {
            let Some((name, value, expired)) = header.to_str().ok().and_then(parse_set_cookie)
            else {
                continue;
            };
            // The session cookie is owned by the token store.
            if name == TOKEN_COOKIE_NAME {
                continue;
            }
            if expired {
                self.remove(name);
            } else {
                self.insert(name, value);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        if !self.same_origin(url) {
            return None;
        }

        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        if cookies.is_empty() {
            return None;
        }

        let header = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");

        HeaderValue::from_str(&header).ok()
    }
}

/// Splits a `Set-Cookie` header into name, value and whether it expires the
/// cookie immediately (`Max-Age=0` or an empty value).
fn parse_set_cookie(header: &str) -> Option<(&str, &str, bool)> {
    let mut parts = header.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value = value.trim().trim_matches('"');

    let max_age_zero = parts.any(|attr| {
        attr.split_once('=').is_some_and(|(key, val)| {
            key.trim().eq_ignore_ascii_case("max-age") && val.trim().starts_with(['0', '-'])
        })
    });

    Some((name, value, max_age_zero || value.is_empty()))
}

/// RFC 6265 `cookie-octet`.
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

/// Holds the session token and keeps its mirrors consistent.
pub struct TokenStore {
    current: RwLock<Option<String>>,
    mirrors: Vec<Arc<dyn TokenMirror>>,
}

impl TokenStore {
    /// Creates an empty store over the given mirrors without reading them.
    pub fn new(mirrors: Vec<Arc<dyn TokenMirror>>) -> Self {
        Self {
            current: RwLock::new(None),
            mirrors,
        }
    }

    /// Creates a store holding `token`, written through to every mirror.
    pub fn with_token(mirrors: Vec<Arc<dyn TokenMirror>>, token: &str) -> Self {
        let store = Self::new(mirrors);
        store.set(token);
        store
    }

    /// Creates a store from the first mirror that holds a token.
    ///
    /// A recovered token is written back to every mirror so a fresh cookie
    /// jar picks up the token persisted by an earlier run.
    pub fn recover(mirrors: Vec<Arc<dyn TokenMirror>>) -> Self {
        let store = Self::new(mirrors);

        let recovered = store.mirrors.iter().find_map(|mirror| match mirror.read() {
            Ok(Some(token)) if !token.trim().is_empty() => {
                debug!(mirror = mirror.name(), "recovered session token");
                Some(token)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(mirror = mirror.name(), "failed to read session token: {e:#}");
                None
            }
        });

        if let Some(token) = recovered {
            store.set(&token);
        }
        store
    }

    /// Returns the current token.
    pub fn get(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replaces the token in memory and in every mirror.
    ///
    /// A mirror that cannot take the new token is erased instead, so no
    /// mirror ever holds a token other than the current one. Failures are
    /// logged and otherwise ignored; the in-memory value is authoritative
    /// for the rest of this process.
    pub fn set(&self, token: &str) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        for mirror in &self.mirrors {
            if let Err(e) = mirror.write(token) {
                warn!(mirror = mirror.name(), "failed to persist session token: {e:#}");
                if let Err(e) = mirror.erase() {
                    warn!(mirror = mirror.name(), "failed to erase stale session token: {e:#}");
                }
            }
        }
        *current = Some(token.to_string());
        debug!(token = %mask_token(token), "session token stored");
    }

    /// Forgets the token in memory and in every mirror.
    pub fn clear(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        for mirror in &self.mirrors {
            if let Err(e) = mirror.erase() {
                warn!(mirror = mirror.name(), "failed to erase session token: {e:#}");
            }
        }
        *current = None;
        debug!("session token cleared");
    }
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 16 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}...")
}
