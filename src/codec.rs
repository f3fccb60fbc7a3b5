//! Serde bridge between typed values and the native property-list node tree.
//!
//! The native layer consumes and produces dictionaries, arrays and scalars; on
//! the Rust side they are represented as [`Node`] values. Encoding failures
//! surface as [`Error::Encoding`] and decoding failures as [`Error::Decoding`].

use crate::errors::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Opaque request/response payload exchanged with the native layer.
pub type Node = serde_json::Value;

/// Encode a typed value into a native payload.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Node> {
    serde_json::to_value(value).map_err(Error::Encoding)
}

/// Decode a native payload into a typed value, consuming the node.
pub fn decode<T: DeserializeOwned>(node: Node) -> Result<T> {
    serde_json::from_value(node).map_err(Error::Decoding)
}
