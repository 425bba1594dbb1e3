//! RPC envelope
//!
//! Multibox administration is only reachable through `POST /rpc` with a
//! `{"method", "params"}` body. Replies carry either `result` or `error`.

use super::error::AidboxError;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub method: &'a str,
    pub params: Value,
}

impl<'a> RpcRequest<'a> {
    pub fn new<P: Serialize + ?Sized>(method: &'a str, params: &P) -> Result<Self> {
        let params = serde_json::to_value(params)
            .with_context(|| format!("Failed to encode params for {}", method))?;
        Ok(Self { method, params })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl RpcResponse {
    /// Decode `result`, or fail with the `error` member
    pub fn into_result<T: DeserializeOwned>(self, method: &str) -> Result<T> {
        if let Some(error) = self.error.filter(|e| !e.is_null()) {
            return Err(AidboxError::Rpc(error.to_string()))
                .with_context(|| format!("RPC call {} failed", method));
        }
        serde_json::from_value(self.result.unwrap_or(Value::Null))
            .with_context(|| format!("Failed to decode result of {}", method))
    }
}
