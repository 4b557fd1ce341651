//! Error taxonomy for the DynamoDB bindings.
//!
//! Validation-class errors are detected before any network call; malformed
//! response errors abort the one decode that hit them and carry the
//! offending wire fragment.

use serde_json::Value;

/// Errors produced by the DynamoDB bindings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller-supplied data violates an operation precondition.
    #[error("validation error: {0}")]
    Validation(String),

    /// A batch write request carried no items.
    #[error("batch write request must contain at least 1 item")]
    EmptyRequest,

    /// A batch write request carried more items than the service accepts.
    #[error("batch write request of {count} items exceeds the 25-item service limit")]
    TooManyItems {
        /// Total item count across all tables and operations.
        count: usize,
    },

    /// A single item exceeds the per-item size limit.
    #[error("item of {size} bytes exceeds the 65536-byte service limit")]
    ItemTooLarge {
        /// The item's computed size.
        size: usize,
    },

    /// A batch write request exceeds the aggregate size limit.
    #[error("batch write request of {size} bytes exceeds the 1048576-byte service limit")]
    RequestTooLarge {
        /// The sum of all items' computed sizes.
        size: usize,
    },

    /// The requested item does not exist. An expected outcome of a read,
    /// not an exceptional condition.
    #[error("item not found")]
    NotFound,

    /// The service returned a shape the decoder cannot interpret.
    #[error("malformed response at {context}: {fragment}")]
    MalformedResponse {
        /// Which part of the response was being unpacked.
        context: &'static str,
        /// The offending wire fragment, rendered as JSON text.
        fragment: String,
    },

    /// Opaque failure surfaced by the transport layer.
    #[error("transport error")]
    Transport(#[source] anyhow::Error),
}

impl Error {
    /// Builds a [`Error::MalformedResponse`] carrying the offending
    /// fragment.
    #[must_use]
    pub fn malformed(context: &'static str, fragment: &Value) -> Self {
        Self::MalformedResponse {
            context,
            fragment: fragment.to_string(),
        }
    }
}
