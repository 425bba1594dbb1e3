//! HTTP utilities for Aidbox REST and RPC calls

use super::auth::RequestAuth;
use super::error::AidboxError;
use anyhow::{Context, Result};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

/// Maximum length of a body to log (bodies can carry secrets and large profiles)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize a body for logging
/// Truncates long bodies and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control() && c != ' ', "")
}

/// Pretty-print a JSON body, or return it verbatim when it is not JSON
pub fn pretty_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.to_string(),
    }
}

/// Whether a status code counts as success for mutations (2xx and 3xx)
pub fn is_alright(status: StatusCode) -> bool {
    status.as_u16() >= 200 && status.as_u16() < 400
}

/// Status and body of a completed request
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub method: Method,
    pub url: String,
    pub request_body: Option<String>,
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    /// Build the error reported when this response's status is not accepted
    pub fn unexpected_status(&self) -> AidboxError {
        tracing::warn!(
            "API error: {} {} -> {} - {}",
            self.method,
            self.url,
            self.status,
            sanitize_for_log(&self.body)
        );

        AidboxError::UnexpectedStatus {
            status: self.status.as_u16(),
            reason: self.status.canonical_reason().unwrap_or("").to_string(),
            method: self.method.to_string(),
            url: self.url.clone(),
            request_body: self
                .request_body
                .as_deref()
                .map(pretty_body)
                .unwrap_or_default(),
            response_body: pretty_body(&self.body),
        }
    }

    /// Fail unless the status is 2xx/3xx
    pub fn require_alright(self) -> Result<Self> {
        if is_alright(self.status) {
            Ok(self)
        } else {
            Err(self.unexpected_status().into())
        }
    }

    /// Fail unless the status is exactly `expected`; 404 maps to [`AidboxError::NotFound`]
    pub fn require_status(self, expected: StatusCode) -> Result<Self> {
        if self.status == expected {
            return Ok(self);
        }
        if self.status == StatusCode::NOT_FOUND && expected == StatusCode::OK {
            return Err(AidboxError::NotFound.into());
        }
        Err(self.unexpected_status().into())
    }

    /// Decode the body as JSON into `T`
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .with_context(|| format!("Failed to parse response JSON from {} {}", self.method, self.url))
    }
}

/// HTTP client wrapper for Aidbox API calls
#[derive(Clone)]
pub struct AidboxHttpClient {
    client: Client,
}

impl AidboxHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("aidbox-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Send a request and collect status and body
    ///
    /// Non-success statuses are not errors here; each operation decides which
    /// statuses it accepts.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        auth: &RequestAuth,
        body: Option<&Value>,
    ) -> Result<RawResponse> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(reqwest::header::ACCEPT, "application/json");
        request = auth.apply(request);

        let request_body = match body {
            Some(body) => {
                let encoded =
                    serde_json::to_string(body).context("Failed to encode request body")?;
                tracing::trace!("request body: {}", sanitize_for_log(&encoded));
                request = request
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(encoded.clone());
                Some(encoded)
            }
            None => None,
        };

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to {}", method, url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        tracing::trace!("response {}: {}", status, sanitize_for_log(&body));

        Ok(RawResponse {
            method,
            url: url.to_string(),
            request_body,
            status,
            body,
        })
    }
}
