//! DynamoDB `AttributeValue` codec.
//!
//! `AttributeValue` is a tagged union where exactly one variant is present.
//! The JSON wire format uses single-key objects like `{"S": "hello"}`;
//! [`AttributeValue::from_wire`] rebuilds the variant from the one present
//! type tag.

use std::fmt;

use base64::Engine;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Scalar attribute types eligible as key attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarAttributeType {
    /// String.
    S,
    /// Number.
    N,
    /// Binary.
    B,
}

impl ScalarAttributeType {
    /// Returns the wire type tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::N => "N",
            Self::B => "B",
        }
    }
}

impl fmt::Display for ScalarAttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DynamoDB attribute value.
///
/// Numbers are string-encoded to preserve arbitrary precision. Binary
/// payloads are carried as base64 text exactly as supplied; the
/// [`AttributeValue::binary`] and [`AttributeValue::binary_set`]
/// constructors encode raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// String value.
    S(String),
    /// Number value (string-encoded for arbitrary precision).
    N(String),
    /// Binary value (base64 text).
    B(String),
    /// String Set.
    Ss(Vec<String>),
    /// Number Set (string-encoded).
    Ns(Vec<String>),
    /// Binary Set (base64 text).
    Bs(Vec<String>),
}

impl AttributeValue {
    /// Builds a binary value from raw bytes, base64-encoding them.
    #[must_use]
    pub fn binary(data: impl AsRef<[u8]>) -> Self {
        Self::B(base64::engine::general_purpose::STANDARD.encode(data))
    }

    /// Builds a binary set from raw byte sequences, base64-encoding each.
    #[must_use]
    pub fn binary_set<I, D>(values: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[u8]>,
    {
        Self::Bs(
            values
                .into_iter()
                .map(|data| base64::engine::general_purpose::STANDARD.encode(data))
                .collect(),
        )
    }

    /// Returns the wire type tag (e.g. "S", "NS").
    #[must_use]
    pub fn type_descriptor(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::B(_) => "B",
            Self::Ss(_) => "SS",
            Self::Ns(_) => "NS",
            Self::Bs(_) => "BS",
        }
    }

    /// Returns `true` for the single-valued variants.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::S(_) | Self::N(_) | Self::B(_))
    }

    /// Returns the string value if this is an `S` variant.
    #[must_use]
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number string if this is an `N` variant.
    #[must_use]
    pub fn as_n(&self) -> Option<&str> {
        match self {
            Self::N(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the base64 text if this is a `B` variant.
    #[must_use]
    pub fn as_b(&self) -> Option<&str> {
        match self {
            Self::B(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the element list for the set variants.
    #[must_use]
    pub fn set_values(&self) -> Option<&[String]> {
        match self {
            Self::Ss(v) | Self::Ns(v) | Self::Bs(v) => Some(v),
            _ => None,
        }
    }

    /// Byte length of the carried text for scalar variants; set variants
    /// report zero.
    #[must_use]
    pub fn scalar_len(&self) -> usize {
        match self {
            Self::S(s) | Self::N(s) | Self::B(s) => s.len(),
            Self::Ss(_) | Self::Ns(_) | Self::Bs(_) => 0,
        }
    }

    /// Decodes a wire object into an attribute value.
    ///
    /// Probes the recognized type tags in the order S, N, B, SS, NS, BS;
    /// the first tag present with a well-shaped payload wins (well-formed
    /// input carries exactly one). Returns `None` when the value is not an
    /// object, carries none of the six tags, or carries a tag whose payload
    /// has the wrong shape; callers drop such fields from the decoded item.
    #[must_use]
    pub fn from_wire(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        if let Some(s) = map.get("S").and_then(Value::as_str) {
            return Some(Self::S(s.to_owned()));
        }
        if let Some(n) = map.get("N").and_then(Value::as_str) {
            return Some(Self::N(n.to_owned()));
        }
        if let Some(b) = map.get("B").and_then(Value::as_str) {
            return Some(Self::B(b.to_owned()));
        }
        if let Some(v) = map.get("SS").and_then(string_elements) {
            return Some(Self::Ss(v));
        }
        if let Some(v) = map.get("NS").and_then(string_elements) {
            return Some(Self::Ns(v));
        }
        if let Some(v) = map.get("BS").and_then(string_elements) {
            return Some(Self::Bs(v));
        }
        None
    }
}

/// Extracts a set payload: an array whose elements are all strings.
fn string_elements(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|element| element.as_str().map(str::to_owned))
        .collect()
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::S(s) => map.serialize_entry("S", s)?,
            Self::N(n) => map.serialize_entry("N", n)?,
            Self::B(b) => map.serialize_entry("B", b)?,
            Self::Ss(v) => map.serialize_entry("SS", v)?,
            Self::Ns(v) => map.serialize_entry("NS", v)?,
            Self::Bs(v) => map.serialize_entry("BS", v)?,
        }
        map.end()
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(s) => write!(f, "{{S: {s}}}"),
            Self::N(n) => write!(f, "{{N: {n}}}"),
            Self::B(b) => write!(f, "{{B: {} bytes}}", b.len()),
            Self::Ss(v) => write!(f, "{{SS: {v:?}}}"),
            Self::Ns(v) => write!(f, "{{NS: {v:?}}}"),
            Self::Bs(v) => write!(f, "{{BS: {} items}}", v.len()),
        }
    }
}
