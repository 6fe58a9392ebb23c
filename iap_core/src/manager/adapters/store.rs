// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;

/// A durable key-value store that persists small values across process
/// restarts.
///
/// The context uses it for exactly two keys — the product-identifier list
/// and the purchased-product-identifier list — and owns those keys
/// exclusively. Values are opaque bytes to the store.
///
/// # Example
///
/// For example code see [`crate::context::memory::InMemoryStore`]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Defines the user-specified error type.
    ///
    /// This error type should implement the `Error` and `Debug` traits from
    /// the standard library. Errors of this type are returned to the user
    /// when an operation fails.
    type AdapterError: std::error::Error + Send + Sync + 'static;

    /// Returns the value stored for `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::AdapterError>;

    /// Stores `value` for `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), Self::AdapterError>;
}
