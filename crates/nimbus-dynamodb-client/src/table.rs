//! Table handle and single-item operations.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use nimbus_dynamodb_model::input::{
    AttributeUpdate, DeleteItemInput, GetItemInput, PutItemInput, UpdateAction, UpdateItemInput,
};
use nimbus_dynamodb_model::{Attribute, AttributeValue, Error, Item, Operation, ScalarAttributeType};

use crate::batch::{BatchGetItem, BatchWriteItemRequest, UnprocessedItems};
use crate::transport::{Transport, encode_payload};
use crate::{batch, response};

/// One key attribute definition with its name and scalar type.
#[derive(Debug, Clone)]
pub struct KeyAttribute {
    /// The attribute name.
    pub name: String,
    /// The scalar type (S, N, or B).
    pub attr_type: ScalarAttributeType,
}

impl KeyAttribute {
    /// Builds a key attribute definition.
    #[must_use]
    pub fn new(name: impl Into<String>, attr_type: ScalarAttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
        }
    }
}

/// Key schema for a table: the hash key definition and an optional range
/// key definition.
#[derive(Debug, Clone)]
pub struct KeySchema {
    /// Hash (partition) key name and type.
    pub hash_key: KeyAttribute,
    /// Optional range (sort) key name and type.
    pub range_key: Option<KeyAttribute>,
}

impl KeySchema {
    /// Builds a hash-only schema.
    #[must_use]
    pub fn new(hash_key: KeyAttribute) -> Self {
        Self {
            hash_key,
            range_key: None,
        }
    }

    /// Adds a range key definition.
    #[must_use]
    pub fn with_range_key(mut self, range_key: KeyAttribute) -> Self {
        self.range_key = Some(range_key);
        self
    }
}

/// A primary key value, carried as text; the table's [`KeySchema`] decides
/// each component's wire type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// The hash key value.
    pub hash_key: String,
    /// The optional range key value.
    pub range_key: Option<String>,
}

impl Key {
    /// Builds a hash-only key.
    #[must_use]
    pub fn new(hash_key: impl Into<String>) -> Self {
        Self {
            hash_key: hash_key.into(),
            range_key: None,
        }
    }

    /// Adds a range key value.
    #[must_use]
    pub fn with_range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }
}

/// Client handle for one table.
///
/// Holds the table name, its key schema, and the transport that carries
/// the signed requests. Handles are independent; share a transport across
/// tables by constructing them over `&T`.
#[derive(Debug)]
pub struct Table<T> {
    transport: T,
    name: String,
    schema: KeySchema,
}

impl<T: Transport> Table<T> {
    /// Builds a handle for `name` with the given key schema.
    pub fn new(transport: T, name: impl Into<String>, schema: KeySchema) -> Self {
        Self {
            transport,
            name: name.into(),
            schema,
        }
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encodes a key value into the wire attribute map the schema calls
    /// for.
    pub(crate) fn key_map(&self, key: &Key) -> HashMap<String, AttributeValue> {
        let mut map = HashMap::with_capacity(2);
        map.insert(
            self.schema.hash_key.name.clone(),
            wire_key_value(self.schema.hash_key.attr_type, &key.hash_key),
        );
        if let (Some(attr), Some(value)) = (&self.schema.range_key, &key.range_key) {
            map.insert(attr.name.clone(), wire_key_value(attr.attr_type, value));
        }
        map
    }

    pub(crate) fn encode_keys(&self, keys: &[Key]) -> Vec<HashMap<String, AttributeValue>> {
        keys.iter().map(|key| self.key_map(key)).collect()
    }

    /// Retrieves one item by primary key.
    ///
    /// A response without an `"Item"` field fails with [`Error::NotFound`];
    /// an empty `"Item": {}` decodes to an item with zero attributes.
    pub async fn get_item(&self, key: &Key) -> Result<Item, Error> {
        let input = GetItemInput {
            table_name: self.name.clone(),
            key: self.key_map(key),
        };
        let body = self.dispatch(Operation::GetItem, encode_payload(&input)?).await?;
        let document = response::parse_document(&body)?;
        let root = document
            .as_object()
            .ok_or_else(|| Error::malformed("response document", &document))?;
        match root.get("Item") {
            None => Err(Error::NotFound),
            Some(item) => Item::from_wire(item),
        }
    }

    /// Stores one item, replacing any prior item under the same key.
    ///
    /// Fails with [`Error::Validation`] before dispatch when the item
    /// carries no attributes; succeeds once a parseable acknowledgment is
    /// received.
    pub async fn put_item(&self, item: Item) -> Result<(), Error> {
        if item.is_empty() {
            return Err(Error::Validation(
                "at least one attribute is required".to_owned(),
            ));
        }
        let input = PutItemInput {
            table_name: self.name.clone(),
            item,
        };
        let body = self.dispatch(Operation::PutItem, encode_payload(&input)?).await?;
        response::parse_document(&body)?;
        Ok(())
    }

    /// Deletes one item by primary key.
    pub async fn delete_item(&self, key: &Key) -> Result<(), Error> {
        let input = DeleteItemInput {
            table_name: self.name.clone(),
            key: self.key_map(key),
        };
        let body = self
            .dispatch(Operation::DeleteItem, encode_payload(&input)?)
            .await?;
        response::parse_document(&body)?;
        Ok(())
    }

    /// Adds the given attribute values to the item (extending sets,
    /// summing numbers).
    pub async fn add_attributes(&self, key: &Key, attributes: Vec<Attribute>) -> Result<(), Error> {
        self.modify_attributes(key, attributes, UpdateAction::Add).await
    }

    /// Sets the given attributes, replacing any prior values.
    pub async fn update_attributes(
        &self,
        key: &Key,
        attributes: Vec<Attribute>,
    ) -> Result<(), Error> {
        self.modify_attributes(key, attributes, UpdateAction::Put).await
    }

    /// Removes the given attributes (or set elements) from the item.
    pub async fn delete_attributes(
        &self,
        key: &Key,
        attributes: Vec<Attribute>,
    ) -> Result<(), Error> {
        self.modify_attributes(key, attributes, UpdateAction::Delete)
            .await
    }

    async fn modify_attributes(
        &self,
        key: &Key,
        attributes: Vec<Attribute>,
        action: UpdateAction,
    ) -> Result<(), Error> {
        if attributes.is_empty() {
            return Err(Error::Validation(
                "at least one attribute is required".to_owned(),
            ));
        }
        let mut attribute_updates = IndexMap::with_capacity(attributes.len());
        for attribute in attributes {
            attribute_updates.insert(
                attribute.name,
                AttributeUpdate {
                    action,
                    value: attribute.value,
                },
            );
        }
        let input = UpdateItemInput {
            table_name: self.name.clone(),
            key: self.key_map(key),
            attribute_updates,
        };
        let body = self
            .dispatch(Operation::UpdateItem, encode_payload(&input)?)
            .await?;
        response::parse_document(&body)?;
        Ok(())
    }

    /// Dispatches an accumulated batch write request, validating the
    /// service limits first.
    ///
    /// The returned mapping reports the items the service did not apply;
    /// an empty mapping means full success. Retrying the unprocessed subset
    /// is the caller's decision.
    pub async fn batch_write_item(
        &self,
        request: &BatchWriteItemRequest,
    ) -> Result<UnprocessedItems, Error> {
        request.validate()?;
        let payload = encode_payload(&request.to_input())?;
        let body = self.dispatch(Operation::BatchWriteItem, payload).await?;
        batch::parse_batch_write_response(&body)
    }

    /// Starts a batch get seeded with this table's keys.
    #[must_use]
    pub fn batch_get_items(&self, keys: &[Key]) -> BatchGetItem<'_, T> {
        BatchGetItem::new(&self.transport, self.name.clone(), self.encode_keys(keys))
    }

    async fn dispatch(
        &self,
        op: Operation,
        payload: serde_json::Value,
    ) -> Result<bytes::Bytes, Error> {
        debug!(operation = %op, table = %self.name, "dispatching DynamoDB operation");
        self.transport
            .send(op, payload)
            .await
            .map_err(Error::Transport)
    }
}

fn wire_key_value(attr_type: ScalarAttributeType, value: &str) -> AttributeValue {
    match attr_type {
        ScalarAttributeType::S => AttributeValue::S(value.to_owned()),
        ScalarAttributeType::N => AttributeValue::N(value.to_owned()),
        ScalarAttributeType::B => AttributeValue::B(value.to_owned()),
    }
}
