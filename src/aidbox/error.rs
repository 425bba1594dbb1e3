//! Aidbox API errors
//!
//! Failures that callers need to branch on. Everything else travels as
//! `anyhow::Error` with context attached.

use thiserror::Error;

/// Errors raised by the Aidbox client
#[derive(Debug, Error)]
pub enum AidboxError {
    /// The requested resource does not exist on the server
    #[error("Not found")]
    NotFound,

    /// The server answered with a status the operation does not accept
    #[error(
        "unexpected status code ({status}) received: {status} {reason}\n\n===== {method} {url} =====\n{request_body}\n===== RESPONSE BODY =====\n{response_body}\n"
    )]
    UnexpectedStatus {
        status: u16,
        reason: String,
        method: String,
        url: String,
        request_body: String,
        response_body: String,
    },

    /// The RPC endpoint returned an `error` member
    #[error("error response from RPC call {0}")]
    Rpc(String),

    /// A box id was supplied to a client that is not talking to multibox
    #[error("boxId provided to non-multibox client")]
    NotMultibox,

    /// `multibox/drop-box-caches` answered with something other than "ok"
    #[error("unexpected response to multibox/drop-box-caches: {0}")]
    CacheInvalidation(String),

    /// The discriminator found a `resourceType` it does not know
    #[error("Unsupported resource type {0}")]
    UnsupportedResourceType(String),

    /// The server returned a different resource type than requested
    #[error("expected resource of type {expected}, server returned {actual}")]
    ResourceTypeMismatch { expected: String, actual: String },

    /// A string value does not name a member of a string-marshalled enum
    #[error("{message}: '{value}'")]
    InvalidEnum {
        message: &'static str,
        value: String,
    },
}

/// Check whether an error (or anything in its context chain) is [`AidboxError::NotFound`]
pub fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<AidboxError>(), Some(AidboxError::NotFound)))
}
