//! Batch operations: write builder, limit validation, and partial-failure
//! decoding.

use std::collections::HashMap;

use bytes::Bytes;
use indexmap::IndexMap;
use tracing::{debug, warn};

use nimbus_dynamodb_model::input::{
    BatchGetItemInput, BatchWriteItemInput, DeleteRequest, KeysAndAttributes, PutRequest,
    WriteRequest,
};
use nimbus_dynamodb_model::{AttributeValue, Error, Item, Operation};

use crate::response;
use crate::table::{Key, Table};
use crate::transport::{Transport, encode_payload};

/// Service limit: items per batch write request.
pub const MAX_BATCH_ITEMS: usize = 25;

/// Service limit: computed bytes per item.
pub const MAX_ITEM_SIZE: usize = 65_536;

/// Service limit: aggregate computed bytes per batch write request.
pub const MAX_REQUEST_SIZE: usize = 1_048_576;

/// Items a batch write did not apply, keyed by table, then by the
/// originating operation kind ("PutRequest" / "DeleteRequest").
///
/// Partial-success data, not an error: the caller decides whether to retry
/// the unprocessed subset.
pub type UnprocessedItems = IndexMap<String, IndexMap<String, Vec<Item>>>;

/// The delete and put lists accumulated against one table.
#[derive(Debug, Clone, Default)]
pub struct BatchWriteOperations {
    /// Items carrying only key attributes, to delete.
    pub delete_requests: Vec<Item>,
    /// Full items to put.
    pub put_requests: Vec<Item>,
}

/// Accumulates per-table put/delete operations for one `BatchWriteItem`
/// call.
///
/// Not synchronized; a single builder must not be mutated from multiple
/// threads.
#[derive(Debug, Clone, Default)]
pub struct BatchWriteItemRequest {
    operations: IndexMap<String, BatchWriteOperations>,
    return_consumed_capacity: bool,
    return_item_collection_metrics: bool,
}

impl BatchWriteItemRequest {
    /// Builds an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `item` to be put into `table`.
    pub fn add_put_request(&mut self, table: impl Into<String>, item: Item) {
        self.operations
            .entry(table.into())
            .or_default()
            .put_requests
            .push(item);
    }

    /// Queues a delete against `table`; `item` carries only the key
    /// attributes of the item to delete.
    pub fn add_delete_request(&mut self, table: impl Into<String>, item: Item) {
        self.operations
            .entry(table.into())
            .or_default()
            .delete_requests
            .push(item);
    }

    /// Requests consumed-capacity data in the response. The response data
    /// is not parsed; the flag only shapes the request.
    pub fn set_return_consumed_capacity(&mut self, value: bool) {
        self.return_consumed_capacity = value;
        warn!("ConsumedCapacity response data is not parsed");
    }

    /// Requests item-collection metrics in the response. The response data
    /// is not parsed; the flag only shapes the request.
    pub fn set_return_item_collection_metrics(&mut self, value: bool) {
        self.return_item_collection_metrics = value;
        warn!("ItemCollectionMetrics response data is not parsed");
    }

    /// Whether consumed-capacity data is requested.
    #[must_use]
    pub fn return_consumed_capacity(&self) -> bool {
        self.return_consumed_capacity
    }

    /// Whether item-collection metrics are requested.
    #[must_use]
    pub fn return_item_collection_metrics(&self) -> bool {
        self.return_item_collection_metrics
    }

    /// The accumulated operations, keyed by table in insertion order.
    #[must_use]
    pub fn operations(&self) -> &IndexMap<String, BatchWriteOperations> {
        &self.operations
    }

    /// Every queued item across all tables and operations, deletes before
    /// puts per table.
    #[must_use]
    pub fn items(&self) -> Vec<&Item> {
        self.operations
            .values()
            .flat_map(|ops| ops.delete_requests.iter().chain(ops.put_requests.iter()))
            .collect()
    }

    /// Enforces the service limits, in order: at least one item, at most
    /// [`MAX_BATCH_ITEMS`], no item over [`MAX_ITEM_SIZE`], aggregate under
    /// [`MAX_REQUEST_SIZE`]. The first violated check is reported; all run
    /// before any network call.
    pub fn validate(&self) -> Result<(), Error> {
        let items = self.items();
        if items.is_empty() {
            return Err(Error::EmptyRequest);
        }
        if items.len() > MAX_BATCH_ITEMS {
            return Err(Error::TooManyItems { count: items.len() });
        }
        let mut total = 0;
        for item in &items {
            let size = item.size();
            if size > MAX_ITEM_SIZE {
                return Err(Error::ItemTooLarge { size });
            }
            total += size;
        }
        if total > MAX_REQUEST_SIZE {
            return Err(Error::RequestTooLarge { size: total });
        }
        Ok(())
    }

    /// Builds the wire input, cloning the accumulated items.
    pub(crate) fn to_input(&self) -> BatchWriteItemInput {
        let mut request_items = IndexMap::with_capacity(self.operations.len());
        for (table, ops) in &self.operations {
            let mut writes =
                Vec::with_capacity(ops.delete_requests.len() + ops.put_requests.len());
            for item in &ops.delete_requests {
                writes.push(WriteRequest {
                    put_request: None,
                    delete_request: Some(DeleteRequest { key: item.clone() }),
                });
            }
            for item in &ops.put_requests {
                writes.push(WriteRequest {
                    put_request: Some(PutRequest { item: item.clone() }),
                    delete_request: None,
                });
            }
            request_items.insert(table.clone(), writes);
        }
        BatchWriteItemInput {
            request_items,
            return_consumed_capacity: self.return_consumed_capacity.then(|| "TOTAL".to_owned()),
            return_item_collection_metrics: self
                .return_item_collection_metrics
                .then(|| "SIZE".to_owned()),
        }
    }
}

/// Decodes a `BatchWriteItem` response into the unprocessed-items mapping.
///
/// An empty `"UnprocessedItems"` object is full success; an absent or
/// non-object field is a contract violation. Item order within a
/// table/kind follows response order.
pub(crate) fn parse_batch_write_response(body: &Bytes) -> Result<UnprocessedItems, Error> {
    let document = response::parse_document(body)?;
    let tables = response::require_object_field(&document, "UnprocessedItems")?;
    let mut results = UnprocessedItems::new();
    for (table, containers) in tables {
        let containers = containers
            .as_array()
            .ok_or_else(|| Error::malformed("unprocessed table entries", containers))?;
        let table_result: &mut IndexMap<String, Vec<Item>> =
            results.entry(table.clone()).or_default();
        for container in containers {
            let container = container
                .as_object()
                .ok_or_else(|| Error::malformed("write request container", container))?;
            for (op_kind, wrapper) in container {
                // The wrapper level ({"Item": ...} / {"Key": ...}) is
                // traversed without interpreting its key name.
                let wrapper = wrapper
                    .as_object()
                    .ok_or_else(|| Error::malformed("write request payload", wrapper))?;
                for attributes in wrapper.values() {
                    let item = Item::from_wire(attributes)?;
                    table_result.entry(op_kind.clone()).or_default().push(item);
                }
            }
        }
    }
    Ok(results)
}

/// Accumulates per-table key lists for one `BatchGetItem` call.
///
/// Seeded via [`Table::batch_get_items`]; [`BatchGetItem::add_table`]
/// replaces any keys previously requested on that table.
#[derive(Debug)]
pub struct BatchGetItem<'a, T> {
    transport: &'a T,
    request_items: IndexMap<String, KeysAndAttributes>,
}

impl<'a, T: Transport> BatchGetItem<'a, T> {
    pub(crate) fn new(
        transport: &'a T,
        table: String,
        keys: Vec<HashMap<String, AttributeValue>>,
    ) -> Self {
        Self {
            transport,
            request_items: IndexMap::from([(table, KeysAndAttributes { keys })]),
        }
    }

    /// Requests `keys` on `table`, replacing any prior keys for that table.
    pub fn add_table(&mut self, table: &Table<T>, keys: &[Key]) -> &mut Self {
        self.request_items.insert(
            table.name().to_owned(),
            KeysAndAttributes {
                keys: table.encode_keys(keys),
            },
        );
        self
    }

    /// The accumulated request, keyed by table in insertion order.
    #[must_use]
    pub fn request_items(&self) -> &IndexMap<String, KeysAndAttributes> {
        &self.request_items
    }

    /// Sends the batch get and decodes the per-table result sets.
    pub async fn execute(&self) -> Result<IndexMap<String, Vec<Item>>, Error> {
        let input = BatchGetItemInput {
            request_items: self.request_items.clone(),
        };
        debug!(tables = self.request_items.len(), "dispatching BatchGetItem");
        let body = self
            .transport
            .send(Operation::BatchGetItem, encode_payload(&input)?)
            .await
            .map_err(Error::Transport)?;
        parse_batch_get_response(&body)
    }
}

/// Decodes a `BatchGetItem` response's `"Responses"` field into per-table
/// item lists.
fn parse_batch_get_response(body: &Bytes) -> Result<IndexMap<String, Vec<Item>>, Error> {
    let document = response::parse_document(body)?;
    let tables = response::require_object_field(&document, "Responses")?;
    let mut results = IndexMap::new();
    for (table, entries) in tables {
        let entries = entries
            .as_array()
            .ok_or_else(|| Error::malformed("table result set", entries))?;
        let mut table_result = Vec::with_capacity(entries.len());
        for entry in entries {
            table_result.push(Item::from_wire(entry)?);
        }
        results.insert(table.clone(), table_result);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use nimbus_dynamodb_model::{Attribute, AttributeValue, ScalarAttributeType};

    use super::*;
    use crate::table::{KeyAttribute, KeySchema};
    use crate::testing::StubTransport;

    fn item_with_string(name: &str, value: String) -> Item {
        let mut item = Item::new();
        item.add_attribute(Attribute::string(name, value));
        item
    }

    fn keyed_item(id: usize) -> Item {
        let mut item = Item::new();
        item.add_attribute(Attribute::number("id", id.to_string()));
        item
    }

    fn test_table(transport: &StubTransport) -> Table<&StubTransport> {
        let schema = KeySchema::new(KeyAttribute::new("id", ScalarAttributeType::S));
        Table::new(transport, "gotest", schema)
    }

    #[test]
    fn test_should_reject_empty_request() {
        let request = BatchWriteItemRequest::new();
        assert!(matches!(request.validate(), Err(Error::EmptyRequest)));
    }

    #[test]
    fn test_should_reject_26_items_across_tables_and_operations() {
        let mut request = BatchWriteItemRequest::new();
        for i in 0..13 {
            request.add_put_request("table-a", keyed_item(i));
        }
        for i in 0..13 {
            request.add_delete_request("table-b", keyed_item(i));
        }
        assert!(matches!(
            request.validate(),
            Err(Error::TooManyItems { count: 26 })
        ));
    }

    #[test]
    fn test_should_accept_25_items() {
        let mut request = BatchWriteItemRequest::new();
        for i in 0..25 {
            request.add_put_request("gotest", keyed_item(i));
        }
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_should_reject_item_over_size_limit() {
        let mut request = BatchWriteItemRequest::new();
        request.add_put_request("gotest", item_with_string("blob", "x".repeat(65_537)));
        assert!(matches!(
            request.validate(),
            Err(Error::ItemTooLarge { size: 65_537 })
        ));
    }

    #[test]
    fn test_should_accept_item_at_size_limit() {
        let mut request = BatchWriteItemRequest::new();
        request.add_put_request("gotest", item_with_string("blob", "x".repeat(65_536)));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_should_reject_aggregate_over_request_limit() {
        // 17 items, each exactly at the per-item limit: every per-item
        // check passes, but 17 * 65536 = 1114112 > 1048576.
        let mut request = BatchWriteItemRequest::new();
        for _ in 0..17 {
            request.add_put_request("gotest", item_with_string("blob", "x".repeat(65_536)));
        }
        assert!(matches!(
            request.validate(),
            Err(Error::RequestTooLarge { size: 1_114_112 })
        ));
    }

    #[test]
    fn test_should_flatten_deletes_before_puts_per_table() {
        let mut request = BatchWriteItemRequest::new();
        request.add_put_request("gotest", keyed_item(1));
        request.add_delete_request("gotest", keyed_item(2));
        let items = request.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].attributes()[0].value, AttributeValue::N("2".to_owned()));
        assert_eq!(items[1].attributes()[0].value, AttributeValue::N("1".to_owned()));
    }

    #[test]
    fn test_should_build_wire_input_shape() {
        let mut request = BatchWriteItemRequest::new();
        request.add_delete_request("gotest", keyed_item(1));
        request.add_put_request("gotest", keyed_item(2));
        let wire = serde_json::to_value(request.to_input()).unwrap();
        assert_eq!(
            wire,
            json!({
                "RequestItems": {
                    "gotest": [
                        {"DeleteRequest": {"Key": {"id": {"N": "1"}}}},
                        {"PutRequest": {"Item": {"id": {"N": "2"}}}},
                    ]
                }
            })
        );
    }

    #[test]
    fn test_should_serialize_response_shaping_flags_when_set() {
        let mut request = BatchWriteItemRequest::new();
        request.add_put_request("gotest", keyed_item(1));
        request.set_return_consumed_capacity(true);
        request.set_return_item_collection_metrics(true);
        assert!(request.return_consumed_capacity());
        assert!(request.return_item_collection_metrics());
        let wire = serde_json::to_value(request.to_input()).unwrap();
        assert_eq!(wire["ReturnConsumedCapacity"], "TOTAL");
        assert_eq!(wire["ReturnItemCollectionMetrics"], "SIZE");
    }

    #[tokio::test]
    async fn test_should_treat_empty_unprocessed_items_as_full_success() {
        let transport = StubTransport::replying(r#"{"UnprocessedItems": {}}"#);
        let table = test_table(&transport);
        let mut request = BatchWriteItemRequest::new();
        for i in 0..25 {
            request.add_put_request("gotest", keyed_item(i));
        }

        let unprocessed = table.batch_write_item(&request).await.unwrap();

        assert!(unprocessed.is_empty());
        // 25 items passed validation and the request went out.
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(transport.calls()[0].0, Operation::BatchWriteItem);
    }

    #[tokio::test]
    async fn test_should_not_dispatch_oversized_batch() {
        let transport = StubTransport::replying(r#"{"UnprocessedItems": {}}"#);
        let table = test_table(&transport);
        let mut request = BatchWriteItemRequest::new();
        for i in 0..26 {
            request.add_put_request("gotest", keyed_item(i));
        }

        let err = table.batch_write_item(&request).await.unwrap_err();

        assert!(matches!(err, Error::TooManyItems { count: 26 }));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_should_reconstruct_unprocessed_put_items() {
        let transport = StubTransport::replying(
            r#"{"UnprocessedItems": {"T": [{"PutRequest": {"Item": {"id": {"N": "1"}}}}]}}"#,
        );
        let table = test_table(&transport);
        let mut request = BatchWriteItemRequest::new();
        request.add_put_request("T", keyed_item(1));

        let unprocessed = table.batch_write_item(&request).await.unwrap();

        let puts = &unprocessed["T"]["PutRequest"];
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].attributes()[0].name, "id");
        assert_eq!(puts[0].attributes()[0].value, AttributeValue::N("1".to_owned()));
    }

    #[tokio::test]
    async fn test_should_keep_unprocessed_items_in_wire_order() {
        let transport = StubTransport::replying(
            r#"{"UnprocessedItems": {"T": [
                {"PutRequest": {"Item": {"id": {"N": "1"}}}},
                {"DeleteRequest": {"Key": {"id": {"N": "2"}}}},
                {"PutRequest": {"Item": {"id": {"N": "3"}}}}
            ]}}"#,
        );
        let table = test_table(&transport);
        let mut request = BatchWriteItemRequest::new();
        request.add_put_request("T", keyed_item(1));

        let unprocessed = table.batch_write_item(&request).await.unwrap();

        let puts = &unprocessed["T"]["PutRequest"];
        assert_eq!(puts[0].attributes()[0].value, AttributeValue::N("1".to_owned()));
        assert_eq!(puts[1].attributes()[0].value, AttributeValue::N("3".to_owned()));
        let deletes = &unprocessed["T"]["DeleteRequest"];
        assert_eq!(deletes.len(), 1);
    }

    #[tokio::test]
    async fn test_should_fail_when_unprocessed_items_is_a_string() {
        let transport = StubTransport::replying(r#"{"UnprocessedItems": "oops"}"#);
        let table = test_table(&transport);
        let mut request = BatchWriteItemRequest::new();
        request.add_put_request("T", keyed_item(1));

        let err = table.batch_write_item(&request).await.unwrap_err();

        assert!(matches!(
            err,
            Error::MalformedResponse {
                context: "UnprocessedItems",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_should_fail_when_unprocessed_items_is_absent() {
        let transport = StubTransport::replying("{}");
        let table = test_table(&transport);
        let mut request = BatchWriteItemRequest::new();
        request.add_put_request("T", keyed_item(1));

        let err = table.batch_write_item(&request).await.unwrap_err();

        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_should_fail_on_malformed_write_request_container() {
        let transport =
            StubTransport::replying(r#"{"UnprocessedItems": {"T": ["not a container"]}}"#);
        let table = test_table(&transport);
        let mut request = BatchWriteItemRequest::new();
        request.add_put_request("T", keyed_item(1));

        let err = table.batch_write_item(&request).await.unwrap_err();

        assert!(matches!(
            err,
            Error::MalformedResponse {
                context: "write request container",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_should_replace_keys_on_repeated_add_table() {
        let transport = StubTransport::replying(r#"{"Responses": {}}"#);
        let table = test_table(&transport);

        let mut batch = table.batch_get_items(&[Key::new("k1"), Key::new("k2")]);
        batch.add_table(&table, &[Key::new("k3")]);

        let keys = &batch.request_items()["gotest"].keys;
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0]["id"], AttributeValue::S("k3".to_owned()));
    }

    #[tokio::test]
    async fn test_should_decode_batch_get_responses() {
        let transport = StubTransport::replying(
            r#"{"Responses": {"gotest": [
                {"id": {"S": "k1"}, "count": {"N": "7"}},
                {"id": {"S": "k2"}}
            ]}}"#,
        );
        let table = test_table(&transport);

        let results = table
            .batch_get_items(&[Key::new("k1"), Key::new("k2")])
            .execute()
            .await
            .unwrap();

        assert_eq!(results["gotest"].len(), 2);
        assert_eq!(results["gotest"][0].len(), 2);
        let calls = transport.calls();
        assert_eq!(calls[0].0, Operation::BatchGetItem);
        assert_eq!(
            calls[0].1,
            json!({
                "RequestItems": {
                    "gotest": {"Keys": [{"id": {"S": "k1"}}, {"id": {"S": "k2"}}]}
                }
            })
        );
    }

    #[tokio::test]
    async fn test_should_fail_when_responses_field_is_missing() {
        let transport = StubTransport::replying("{}");
        let table = test_table(&transport);

        let err = table
            .batch_get_items(&[Key::new("k1")])
            .execute()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::MalformedResponse {
                context: "Responses",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_should_fail_on_non_array_table_result_set() {
        let transport = StubTransport::replying(r#"{"Responses": {"gotest": {"id": "1"}}}"#);
        let table = test_table(&transport);

        let err = table
            .batch_get_items(&[Key::new("k1")])
            .execute()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::MalformedResponse {
                context: "table result set",
                ..
            }
        ));
    }
}
