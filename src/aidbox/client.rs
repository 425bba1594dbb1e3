//! Aidbox Client
//!
//! Main client for the Aidbox REST and RPC APIs. Combines the HTTP transport
//! with basic auth or per-box token routing and implements the typed CRUD
//! operations every resource module builds on.

use super::auth::{box_host, BoxTokenCache, Credentials, RequestAuth};
use super::error::AidboxError;
use super::http::{AidboxHttpClient, RawResponse};
use super::multibox::BoxResource;
use super::resource::{self, AnyResource, Resource};
use super::rpc::{RpcRequest, RpcResponse};
use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Main Aidbox client
#[derive(Clone)]
pub struct ApiClient {
    pub url: String,
    /// Superuser credentials when `is_multibox` is set
    credentials: Credentials,
    pub is_multibox: bool,
    http: AidboxHttpClient,
    box_tokens: BoxTokenCache,
}

impl ApiClient {
    /// Create a new client for the server at `url`
    pub fn new(url: &str, username: &str, password: &str, is_multibox: bool) -> Result<Self> {
        let http = AidboxHttpClient::new()?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            credentials: Credentials::new(username, password),
            is_multibox,
            http,
            box_tokens: BoxTokenCache::default(),
        })
    }

    /// Absolute URL for a path relative to the server root
    pub fn endpoint(&self, relative_path: &str) -> String {
        format!("{}/{}", self.url, relative_path.trim_start_matches('/'))
    }

    /// Pick basic auth for the main server, or token routing for a box
    async fn auth_for(&self, box_id: &str) -> Result<RequestAuth> {
        if box_id.is_empty() {
            return Ok(RequestAuth::Basic(self.credentials.clone()));
        }
        if !self.is_multibox {
            return Err(AidboxError::NotMultibox.into());
        }
        if let Some(auth) = self.box_tokens.get(box_id).await {
            return Ok(auth);
        }

        let basic = RequestAuth::Basic(self.credentials.clone());
        let found: BoxResource = self
            .rpc_with_auth("multibox/get-box", &serde_json::json!({ "id": box_id }), &basic)
            .await
            .with_context(|| format!("Failed to look up box '{}'", box_id))?;
        let host = box_host(&found.box_url)?;
        tracing::info!("Routing requests for box {} to host {}", box_id, host);

        self.box_tokens
            .insert(box_id, host.clone(), found.access_token.clone())
            .await;
        Ok(RequestAuth::BoxToken {
            host,
            token: found.access_token,
        })
    }

    pub(crate) async fn forget_box(&self, box_id: &str) {
        self.box_tokens.evict(box_id).await;
    }

    /// Send a request to a path relative to the server root
    pub async fn request(
        &self,
        method: Method,
        relative_path: &str,
        body: Option<&Value>,
        box_id: &str,
    ) -> Result<RawResponse> {
        let auth = self.auth_for(box_id).await?;
        self.http
            .send(method, &self.endpoint(relative_path), &auth, body)
            .await
    }

    // =========================================================================
    // Raw JSON helpers
    // =========================================================================

    /// GET and decode; 404 maps to [`AidboxError::NotFound`], anything but 200 fails
    pub async fn get_json<T: DeserializeOwned>(&self, relative_path: &str, box_id: &str) -> Result<T> {
        self.request(Method::GET, relative_path, None, box_id)
            .await?
            .require_status(StatusCode::OK)?
            .json()
    }

    /// POST a JSON body and decode the response; any 2xx/3xx is accepted
    pub async fn post_json<B, T>(&self, relative_path: &str, body: &B, box_id: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).context("Failed to encode request body")?;
        self.request(Method::POST, relative_path, Some(&body), box_id)
            .await?
            .require_alright()?
            .json()
    }

    /// PUT a JSON body and decode the response; any 2xx/3xx is accepted
    pub async fn put_json<B, T>(&self, relative_path: &str, body: &B, box_id: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).context("Failed to encode request body")?;
        self.request(Method::PUT, relative_path, Some(&body), box_id)
            .await?
            .require_alright()?
            .json()
    }

    /// Call an RPC method; the `error` member of the reply fails the call
    pub async fn rpc<P, T>(&self, method: &str, params: &P, box_id: &str) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let auth = self.auth_for(box_id).await?;
        self.rpc_with_auth(method, params, &auth).await
    }

    async fn rpc_with_auth<P, T>(&self, method: &str, params: &P, auth: &RequestAuth) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope = serde_json::to_value(RpcRequest::new(method, params)?)
            .context("Failed to encode RPC request")?;
        tracing::trace!("rpc {}", method);

        let reply: RpcResponse = self
            .http
            .send(Method::POST, &self.endpoint("rpc"), auth, Some(&envelope))
            .await?
            .require_alright()?
            .json()?;
        reply.into_result(method)
    }

    /// Fetch any supported resource through the discriminator
    pub async fn get_any(&self, relative_path: &str, box_id: &str) -> Result<AnyResource> {
        let response = self
            .request(Method::GET, relative_path, None, box_id)
            .await?
            .require_status(StatusCode::OK)?;
        resource::parse_resource(response.body.as_bytes())
    }

    // =========================================================================
    // Typed resource CRUD
    // =========================================================================

    /// Create a resource
    ///
    /// POSTs to the collection and requires 201, or PUTs to the id for
    /// collections that do not honour a client id on POST.
    pub async fn create<T: Resource>(&self, resource: &T, box_id: &str) -> Result<T> {
        let body = resource::encode(resource)?;
        let response = if T::CREATE_WITH_PUT {
            let path = format!("{}/{}", T::PATH, resource.id());
            self.request(Method::PUT, &path, Some(&body), box_id)
                .await?
                .require_alright()?
        } else {
            self.request(Method::POST, T::PATH, Some(&body), box_id)
                .await?
                .require_status(StatusCode::CREATED)?
        };
        self.clear_cache().await?;
        resource::decode(response.json()?)
    }

    /// Read a resource by id
    pub async fn get<T: Resource>(&self, id: &str, box_id: &str) -> Result<T> {
        let value: Value = self
            .get_json(&format!("{}/{}", T::PATH, id), box_id)
            .await?;
        resource::decode(value)
    }

    /// Replace a resource
    pub async fn update<T: Resource>(&self, resource: &T, box_id: &str) -> Result<T> {
        let body = resource::encode(resource)?;
        let path = format!("{}/{}", T::PATH, resource.id());
        let response = self
            .request(Method::PUT, &path, Some(&body), box_id)
            .await?
            .require_alright()?;
        self.clear_cache().await?;
        resource::decode(response.json()?)
    }

    /// Delete a resource by id; 404 maps to [`AidboxError::NotFound`]
    pub async fn delete<T: Resource>(&self, id: &str, box_id: &str) -> Result<()> {
        let path = format!("{}/{}", T::PATH, id);
        let response = self.request(Method::DELETE, &path, None, box_id).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(AidboxError::NotFound.into());
        }
        response.require_alright()?;
        self.clear_cache().await
    }

    /// Drop multibox caches after a mutation
    ///
    /// Some resources are not invalidated by multibox on their own. No-op
    /// outside multibox mode.
    pub async fn clear_cache(&self) -> Result<()> {
        if !self.is_multibox {
            return Ok(());
        }
        let reply: Value = self
            .rpc("multibox/drop-box-caches", &serde_json::json!({}), "")
            .await?;
        match reply.as_str() {
            Some("ok") => Ok(()),
            _ => Err(AidboxError::CacheInvalidation(reply.to_string()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let client = ApiClient::new("http://localhost:8888/", "root", "secret", false).unwrap();
        assert_eq!(client.endpoint("AccessPolicy/x"), "http://localhost:8888/AccessPolicy/x");
        assert_eq!(client.endpoint("/db/migrations"), "http://localhost:8888/db/migrations");
    }

    #[tokio::test]
    async fn test_box_id_requires_multibox() {
        let client = ApiClient::new("http://localhost:8888", "root", "secret", false).unwrap();
        let err = client.auth_for("box-1").await.unwrap_err();
        assert_eq!(err.to_string(), "boxId provided to non-multibox client");
    }

    #[tokio::test]
    async fn test_empty_box_id_uses_basic_auth() {
        let client = ApiClient::new("http://localhost:8888", "root", "secret", true).unwrap();
        let auth = client.auth_for("").await.unwrap();
        assert!(matches!(auth, RequestAuth::Basic(c) if c.username == "root"));
    }
}
