//! DynamoDB wire model types for Nimbus.
//!
//! This crate provides the types that cross the DynamoDB `awsJson1_0` wire
//! boundary: the attribute codec, the item model, typed operation inputs,
//! and the error taxonomy. The types are hand-written since DynamoDB's JSON
//! protocol makes serde impls trivial; response decoding is a typed walk
//! over [`serde_json::Value`] so malformed shapes surface as
//! [`Error::MalformedResponse`] instead of silently producing defaults.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]

pub mod attribute_value;
pub mod error;
pub mod input;
pub mod item;
pub mod operations;

pub use attribute_value::{AttributeValue, ScalarAttributeType};
pub use error::Error;
pub use item::{Attribute, Item};
pub use operations::Operation;
