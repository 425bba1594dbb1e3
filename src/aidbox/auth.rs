//! Aidbox Authentication
//!
//! Requests against the main server use HTTP basic auth with the configured
//! client credentials. Requests routed to a multibox box carry the box access
//! token as a cookie and name the box host in the `Host` header.

use anyhow::{Context, Result};
use reqwest::header::{COOKIE, HOST};
use reqwest::RequestBuilder;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

/// How long a box token is reused before `multibox/get-box` is called again
const DEFAULT_BOX_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// Basic auth credentials (the superuser client in multibox mode)
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authentication applied to a single request
#[derive(Clone)]
pub enum RequestAuth {
    Basic(Credentials),
    BoxToken { host: String, token: String },
}

impl RequestAuth {
    /// Attach the auth headers to a request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            RequestAuth::Basic(credentials) => {
                request.basic_auth(&credentials.username, Some(&credentials.password))
            }
            RequestAuth::BoxToken { host, token } => request
                .header(HOST, host.as_str())
                .header(COOKIE, format!("aidbox-auth-token={}", token)),
        }
    }
}

impl fmt::Debug for RequestAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestAuth::Basic(credentials) => f.debug_tuple("Basic").field(credentials).finish(),
            RequestAuth::BoxToken { host, .. } => f
                .debug_struct("BoxToken")
                .field("host", host)
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Extract the hostname used to route requests to a box
pub fn box_host(box_url: &str) -> Result<String> {
    let url = Url::parse(box_url).with_context(|| format!("Invalid box URL '{}'", box_url))?;
    url.host_str()
        .map(str::to_string)
        .with_context(|| format!("Box URL '{}' has no host", box_url))
}

#[derive(Clone)]
struct CachedBoxToken {
    host: String,
    token: String,
    expires_at: Instant,
}

impl CachedBoxToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Per-box cache of routing host and access token
#[derive(Clone)]
pub struct BoxTokenCache {
    entries: Arc<RwLock<HashMap<String, CachedBoxToken>>>,
    ttl: Duration,
}

impl Default for BoxTokenCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_BOX_TOKEN_TTL)
    }
}

impl BoxTokenCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Cached auth for a box, if present and not expired
    pub async fn get(&self, box_id: &str) -> Option<RequestAuth> {
        let entries = self.entries.read().await;
        match entries.get(box_id) {
            Some(cached) if cached.is_valid() => Some(RequestAuth::BoxToken {
                host: cached.host.clone(),
                token: cached.token.clone(),
            }),
            Some(_) => {
                tracing::debug!("Cached token for box {} expired", box_id);
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, box_id: &str, host: String, token: String) {
        let mut entries = self.entries.write().await;
        entries.insert(
            box_id.to_string(),
            CachedBoxToken {
                host,
                token,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Forget a box (after it has been deleted or recreated)
    pub async fn evict(&self, box_id: &str) {
        self.entries.write().await.remove(box_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_host_drops_scheme_and_port() {
        assert_eq!(box_host("https://ankh.morpork.example:8443/").unwrap(), "ankh.morpork.example");
        assert_eq!(box_host("http://box1.localhost").unwrap(), "box1.localhost");
        assert!(box_host("not a url").is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let auth = RequestAuth::Basic(Credentials::new("root", "hunter2"));
        assert!(!format!("{:?}", auth).contains("hunter2"));

        let auth = RequestAuth::BoxToken {
            host: "box".to_string(),
            token: "s3cr3t".to_string(),
        };
        assert!(!format!("{:?}", auth).contains("s3cr3t"));
    }

    #[tokio::test]
    async fn test_cache_roundtrip_and_evict() {
        let cache = BoxTokenCache::default();
        assert!(cache.get("watch").await.is_none());

        cache.insert("watch", "watch.example".to_string(), "tok".to_string()).await;
        match cache.get("watch").await {
            Some(RequestAuth::BoxToken { host, token }) => {
                assert_eq!(host, "watch.example");
                assert_eq!(token, "tok");
            }
            other => panic!("unexpected cache entry: {:?}", other),
        }

        cache.evict("watch").await;
        assert!(cache.get("watch").await.is_none());
    }

    #[test]
    fn test_expired_entries_are_ignored() {
        let cache = BoxTokenCache::with_ttl(Duration::ZERO);
        tokio_test::block_on(cache.insert("watch", "h".to_string(), "t".to_string()));
        assert!(tokio_test::block_on(cache.get("watch")).is_none());
    }
}
