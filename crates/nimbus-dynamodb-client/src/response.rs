//! Response document helpers shared by the operation decoders.
//!
//! Every nesting level is validated as the expected JSON shape before
//! further unpacking; a mismatch fails with [`Error::MalformedResponse`]
//! carrying the offending fragment.

use bytes::Bytes;
use serde_json::{Map, Value};

use nimbus_dynamodb_model::Error;

/// Parses raw response bytes into a JSON document.
pub(crate) fn parse_document(body: &Bytes) -> Result<Value, Error> {
    serde_json::from_slice(body).map_err(|_| Error::MalformedResponse {
        context: "response body",
        fragment: String::from_utf8_lossy(body).into_owned(),
    })
}

/// Fetches a named top-level field, requiring it to be a JSON object.
///
/// Absence, a non-object document, and a non-object field all fail alike:
/// each signals an API-contract violation, not an empty result.
pub(crate) fn require_object_field<'a>(
    document: &'a Value,
    field: &'static str,
) -> Result<&'a Map<String, Value>, Error> {
    document
        .get(field)
        .and_then(Value::as_object)
        .ok_or_else(|| Error::malformed(field, document))
}
