//! Item model: one record as an ordered collection of named attributes.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::attribute_value::AttributeValue;
use crate::error::Error;

/// One named, typed value (or set of values) belonging to an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,
    /// The attribute value.
    pub value: AttributeValue,
}

impl Attribute {
    /// Builds an attribute from a name and an already-typed value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Builds a string attribute.
    #[must_use]
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, AttributeValue::S(value.into()))
    }

    /// Builds a number attribute from its decimal-string text.
    #[must_use]
    pub fn number(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, AttributeValue::N(value.into()))
    }

    /// Builds a binary attribute from raw bytes.
    #[must_use]
    pub fn binary(name: impl Into<String>, data: impl AsRef<[u8]>) -> Self {
        Self::new(name, AttributeValue::binary(data))
    }

    /// Builds a string-set attribute.
    #[must_use]
    pub fn string_set(name: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(name, AttributeValue::Ss(values))
    }

    /// Builds a number-set attribute from decimal-string texts.
    #[must_use]
    pub fn number_set(name: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(name, AttributeValue::Ns(values))
    }

    /// Builds a binary-set attribute from raw byte sequences.
    #[must_use]
    pub fn binary_set<I, D>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[u8]>,
    {
        Self::new(name, AttributeValue::binary_set(values))
    }
}

/// One record, represented as an ordered collection of attributes.
///
/// Attribute order is preserved as appended. Names are unique by convention
/// but not enforced; on the wire, a later duplicate overwrites an earlier
/// one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    attributes: Vec<Attribute>,
}

impl Item {
    /// Builds an empty item.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one attribute.
    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Appends every entry of `attributes`. Append order follows map
    /// iteration and is therefore unspecified.
    pub fn add_attributes_from_map(&mut self, attributes: HashMap<String, AttributeValue>) {
        for (name, value) in attributes {
            self.add_attribute(Attribute::new(name, value));
        }
    }

    /// The attributes in append order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` when the item carries no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Serialized size used for pre-flight batch validation; never
    /// transmitted.
    ///
    /// Counts the byte length of scalar values only; set-valued attributes
    /// contribute nothing, so set-heavy items under-report their wire size.
    #[must_use]
    pub fn size(&self) -> usize {
        self.attributes
            .iter()
            .map(|attribute| attribute.value.scalar_len())
            .sum()
    }

    /// Decodes a wire attribute map into an item.
    ///
    /// Fields that match none of the recognized type tags (or carry a
    /// malformed payload) are dropped with a warning; input that is not a
    /// JSON object fails with [`Error::MalformedResponse`].
    pub fn from_wire(value: &Value) -> Result<Self, Error> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::malformed("item attributes", value))?;
        let mut item = Self::new();
        for (name, wire) in map {
            match AttributeValue::from_wire(wire) {
                Some(decoded) => item.add_attribute(Attribute::new(name.clone(), decoded)),
                None => warn!(attribute = %name, "skipping unrecognized attribute field"),
            }
        }
        Ok(item)
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len()))?;
        for attribute in &self.attributes {
            map.serialize_entry(&attribute.name, &attribute.value)?;
        }
        map.end()
    }
}
