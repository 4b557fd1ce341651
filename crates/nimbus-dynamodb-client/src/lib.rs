//! DynamoDB client bindings over an abstract signed-request transport.
//!
//! The bindings build typed request payloads, hand them to a caller-supplied
//! [`Transport`] (which owns signing, connections, credentials, and retry),
//! and decode the JSON responses into typed items. The batch write path
//! enforces the service's count and size limits before dispatch and reports
//! partial failure through the unprocessed-items mapping.
//!
//! ```no_run
//! use nimbus_dynamodb_client::{
//!     BatchWriteItemRequest, KeyAttribute, KeySchema, ScalarAttributeType, Table,
//! };
//! use nimbus_dynamodb_model::{Attribute, Item};
//!
//! # async fn example(transport: impl nimbus_dynamodb_client::Transport) -> Result<(), Box<dyn std::error::Error>> {
//! let schema = KeySchema::new(KeyAttribute::new("id", ScalarAttributeType::S));
//! let table = Table::new(transport, "gotest", schema);
//!
//! let mut item = Item::new();
//! item.add_attribute(Attribute::number("id", "1"));
//! item.add_attribute(Attribute::string("description", "lorem"));
//!
//! let mut request = BatchWriteItemRequest::new();
//! request.add_put_request("gotest", item);
//! let unprocessed = table.batch_write_item(&request).await?;
//! assert!(unprocessed.is_empty());
//! # Ok(())
//! # }
//! ```

mod batch;
mod response;
mod table;
mod transport;

pub use batch::{
    BatchGetItem, BatchWriteItemRequest, BatchWriteOperations, MAX_BATCH_ITEMS, MAX_ITEM_SIZE,
    MAX_REQUEST_SIZE, UnprocessedItems,
};
pub use table::{Key, KeyAttribute, KeySchema, Table};
pub use transport::Transport;

pub use nimbus_dynamodb_model::{
    Attribute, AttributeValue, Error, Item, Operation, ScalarAttributeType,
};
