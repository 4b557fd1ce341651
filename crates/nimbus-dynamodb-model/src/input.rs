//! Typed request payloads for the data-plane operations.
//!
//! All input structs use `PascalCase` JSON field naming to match the
//! DynamoDB wire protocol (`awsJson1_0`); optional fields are omitted when
//! unset. Table-keyed maps are `IndexMap`s so payload order follows
//! builder insertion order.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::attribute_value::AttributeValue;
use crate::item::Item;

/// Input for the `GetItem` operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemInput {
    /// The name of the table containing the item.
    pub table_name: String,
    /// The primary key of the item to retrieve.
    pub key: HashMap<String, AttributeValue>,
}

/// Input for the `PutItem` operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemInput {
    /// The name of the table to put the item into.
    pub table_name: String,
    /// The item to store.
    pub item: Item,
}

/// Input for the `DeleteItem` operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemInput {
    /// The name of the table to delete the item from.
    pub table_name: String,
    /// The primary key of the item to delete.
    pub key: HashMap<String, AttributeValue>,
}

/// Action keyword for one entry of an `UpdateItem`'s attribute updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateAction {
    /// Add a value (or extend a set).
    #[serde(rename = "ADD")]
    Add,
    /// Set the attribute, replacing any prior value.
    #[serde(rename = "PUT")]
    Put,
    /// Remove the attribute (or set elements).
    #[serde(rename = "DELETE")]
    Delete,
}

impl UpdateAction {
    /// Returns the wire action keyword.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for UpdateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the `AttributeUpdates` map.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeUpdate {
    /// The action to apply.
    pub action: UpdateAction,
    /// The value the action applies.
    pub value: AttributeValue,
}

/// Input for the `UpdateItem` operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemInput {
    /// The name of the table containing the item.
    pub table_name: String,
    /// The primary key of the item to update.
    pub key: HashMap<String, AttributeValue>,
    /// The attribute updates, in the caller's attribute order.
    pub attribute_updates: IndexMap<String, AttributeUpdate>,
}

/// The keys requested from one table in a `BatchGetItem`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeysAndAttributes {
    /// The primary keys to retrieve.
    pub keys: Vec<HashMap<String, AttributeValue>>,
}

/// Input for the `BatchGetItem` operation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchGetItemInput {
    /// A map of table names to the keys requested on each.
    pub request_items: IndexMap<String, KeysAndAttributes>,
}

/// A request to put an item within a `BatchWriteItem` operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutRequest {
    /// The item to put.
    pub item: Item,
}

/// A request to delete an item within a `BatchWriteItem` operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteRequest {
    /// An item carrying only the key attributes of the item to delete.
    pub key: Item,
}

/// A single put or delete within a `BatchWriteItem` operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WriteRequest {
    /// A request to put an item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put_request: Option<PutRequest>,
    /// A request to delete an item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_request: Option<DeleteRequest>,
}

/// Input for the `BatchWriteItem` operation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchWriteItemInput {
    /// A map of table names to the write requests against each.
    pub request_items: IndexMap<String, Vec<WriteRequest>>,

    /// Level of detail about consumed capacity to request. The response
    /// data is not decoded by these bindings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<String>,

    /// Whether to request item collection metrics. The response data is
    /// not decoded by these bindings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_item_collection_metrics: Option<String>,
}
