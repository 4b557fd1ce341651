//! Transport collaborator boundary.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use nimbus_dynamodb_model::{Error, Operation};

/// Boundary to the signed-HTTP layer.
///
/// An implementation performs one signed request per call, addressed by the
/// operation's `X-Amz-Target` value, and returns the raw response body.
/// Network, auth, and non-2xx failures are surfaced opaquely through
/// `anyhow::Error`; the bindings wrap them as [`Error::Transport`]. Retry,
/// timeouts, and credentials all live behind this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the signed HTTP call for `op`, returning the raw response
    /// body.
    async fn send(&self, op: Operation, payload: Value) -> anyhow::Result<Bytes>;
}

#[async_trait]
impl<'a, T: Transport + ?Sized> Transport for &'a T {
    async fn send(&self, op: Operation, payload: Value) -> anyhow::Result<Bytes> {
        (**self).send(op, payload).await
    }
}

/// Encodes a typed input struct into the JSON payload handed to the
/// transport.
pub(crate) fn encode_payload<T: Serialize>(input: &T) -> Result<Value, Error> {
    serde_json::to_value(input)
        .map_err(|err| Error::Validation(format!("unencodable request payload: {err}")))
}
