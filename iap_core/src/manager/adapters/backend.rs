// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use iap_types::{Product, ProductId, PurchaseResult, Transaction, VerificationResult};

/// The platform commerce backend.
///
/// The backend owns the product catalog, the purchase flow and the
/// cryptographic verification of transactions; this crate only consumes
/// its results. All calls may suspend indefinitely, e.g. while a system
/// purchase sheet awaits user interaction.
///
/// # Example
///
/// For example code see [`crate::context::memory::InMemoryBackend`]
#[async_trait]
pub trait CommerceBackend: Send + Sync {
    /// Defines the user-specified error type.
    ///
    /// This error type should implement the `Error` and `Debug` traits from
    /// the standard library. Errors of this type are returned to the user
    /// when an operation fails.
    type AdapterError: std::error::Error + Send + Sync + 'static;

    /// Fetches the product descriptors for the provided identifiers.
    ///
    /// Identifiers unknown to the backend are simply absent from the
    /// result.
    async fn fetch_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, Self::AdapterError>;

    /// Performs a purchase of the provided product.
    async fn purchase(&self, product: &Product) -> Result<PurchaseResult, Self::AdapterError>;

    /// Returns the most recent transaction for a product, if any exists,
    /// wrapped in the backend's verification result.
    async fn latest_transaction(
        &self,
        product_id: &str,
    ) -> Result<Option<VerificationResult>, Self::AdapterError>;

    /// The backend's asynchronous stream of transaction updates.
    ///
    /// The stream is unordered, possibly infinite, and may deliver
    /// transactions for the same product multiple times (e.g. renewals).
    /// It is subscribed to exactly once, for the lifetime of the owning
    /// manager.
    fn transaction_updates(&self) -> BoxStream<'static, VerificationResult>;

    /// Acknowledges a processed transaction with the backend.
    ///
    /// Until a transaction is finalized the backend keeps re-delivering it
    /// on the update stream.
    async fn finalize(&self, transaction: &Transaction) -> Result<(), Self::AdapterError>;
}
