// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use futures_util::StreamExt;
use iap_types::{Product, ProductId, PurchaseOutcome, PurchaseResult, Transaction, VerificationResult};
use tokio::task::JoinHandle;

use super::adapters::{CommerceBackend, KeyValueStore};
use crate::{
    context::StoreContext,
    verification::{SharedVerifier, StandardVerifier, TransactionVerifier},
    Error, Result,
};

/// Coordinates purchases, restores and live transaction updates against
/// one [`StoreContext`].
///
/// Construction subscribes to the backend's transaction-update stream and
/// spawns the live listener; the subscription lives for the lifetime of
/// the manager and is torn down when the manager is dropped.
///
/// Failure policy, per operation:
///
/// - the live listener swallows and logs every per-update failure — one
///   bad notification must not kill background listening;
/// - [`Self::restore_purchases`] fails fast: any verification or backend
///   failure aborts the whole pass and leaves the cache untouched;
/// - [`Self::purchase`] propagates failures to the caller.
pub struct StoreManager<B, S> {
    backend: Arc<B>,
    context: Arc<StoreContext<S>>,
    verifier: SharedVerifier,
    product_ids: Vec<ProductId>,
    direct_purchase: bool,
    listener: JoinHandle<()>,
}

impl<B, S> StoreManager<B, S>
where
    B: CommerceBackend + 'static,
    S: KeyValueStore + 'static,
{
    /// Creates a manager for the provided tracked product identifiers,
    /// syncing any transaction changes into `context`.
    pub fn new(
        backend: Arc<B>,
        context: Arc<StoreContext<S>>,
        product_ids: Vec<ProductId>,
    ) -> Self {
        Self::with_verifier(backend, context, product_ids, Arc::new(StandardVerifier))
    }

    /// Creates a manager that runs every transaction through the provided
    /// verifier instead of [`StandardVerifier`].
    pub fn with_verifier(
        backend: Arc<B>,
        context: Arc<StoreContext<S>>,
        product_ids: Vec<ProductId>,
        verifier: SharedVerifier,
    ) -> Self {
        let listener = tokio::spawn(listen_for_transaction_updates(
            backend.clone(),
            context.clone(),
            verifier.clone(),
        ));
        Self {
            backend,
            context,
            verifier,
            product_ids,
            direct_purchase: true,
            listener,
        }
    }

    /// Sets whether this execution environment may initiate purchases
    /// directly.
    ///
    /// When disabled, [`Self::purchase`] fails with
    /// [`Error::UnsupportedPlatform`] and purchases must be routed through
    /// the environment-provided purchase affordance.
    pub fn with_direct_purchase(mut self, direct_purchase: bool) -> Self {
        self.direct_purchase = direct_purchase;
        self
    }

    /// The context this manager syncs into.
    pub fn context(&self) -> &StoreContext<S> {
        &self.context
    }

    /// Fetches the descriptors for the tracked products from the backend.
    ///
    /// Does not touch the context; use [`Self::sync_store_data`] to also
    /// sync the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AdapterError`] with the backend's error when the
    /// fetch fails.
    pub async fn fetch_products(&self) -> Result<Vec<Product>> {
        self.backend
            .fetch_products(&self.product_ids)
            .await
            .map_err(|err| Error::AdapterError {
                source_error: anyhow::Error::new(err),
            })
    }

    /// Purchases a product.
    ///
    /// On success the transaction is verified, folded into the context and
    /// finalized with the backend before the outcome is returned. Pending
    /// and cancelled outcomes return immediately with no cache mutation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] when direct purchasing is
    /// disabled for this environment, [`Error::InvalidTransaction`] when
    /// the backend reports an unverified transaction, and
    /// [`Error::AdapterError`] when the backend call itself fails.
    pub async fn purchase(&self, product: &Product) -> Result<PurchaseOutcome> {
        if !self.direct_purchase {
            return Err(Error::UnsupportedPlatform {
                message: "purchases must be routed through the platform purchase affordance"
                    .to_owned(),
            });
        }
        let result = self
            .backend
            .purchase(product)
            .await
            .map_err(|err| Error::AdapterError {
                source_error: anyhow::Error::new(err),
            })?;
        match result {
            PurchaseResult::Success(result) => {
                let transaction =
                    handle_transaction(&*self.backend, &self.context, &*self.verifier, result)
                        .await?;
                Ok(PurchaseOutcome::Success(transaction))
            }
            PurchaseResult::Pending => Ok(PurchaseOutcome::Pending),
            PurchaseResult::UserCancelled => Ok(PurchaseOutcome::UserCancelled),
        }
    }

    /// Re-derives the full purchase set from the backend.
    ///
    /// For every tracked product identifier the backend's latest
    /// transaction is verified and kept only while still valid; the
    /// collected set then wholesale replaces the context's transactions.
    /// A product with no transaction, or whose latest transaction is
    /// invalid, is absent from the result and loses its purchased status.
    ///
    /// # Errors
    ///
    /// Fails fast: returns [`Error::InvalidTransaction`] on the first
    /// verification failure and [`Error::AdapterError`] on the first
    /// backend failure, leaving the context untouched.
    pub async fn restore_purchases(&self) -> Result<()> {
        let mut transactions = Vec::new();
        for product_id in &self.product_ids {
            if let Some(transaction) = self.valid_transaction_for(product_id).await? {
                transactions.push(transaction);
            }
        }
        self.context.replace_transactions(transactions).await
    }

    /// Syncs product and purchase information from the backend into the
    /// context: fetches the catalog, replaces the context's products, then
    /// runs a restore pass.
    ///
    /// # Errors
    ///
    /// Propagates the first error from the fetch, the context or the
    /// restore pass.
    pub async fn sync_store_data(&self) -> Result<()> {
        let products = self.fetch_products().await?;
        self.context.set_products(products).await?;
        self.restore_purchases().await
    }

    /// Resolves a valid transaction for a product, if the backend has one.
    async fn valid_transaction_for(&self, product_id: &str) -> Result<Option<Transaction>> {
        let latest = self
            .backend
            .latest_transaction(product_id)
            .await
            .map_err(|err| Error::AdapterError {
                source_error: anyhow::Error::new(err),
            })?;
        let Some(result) = latest else {
            return Ok(None);
        };
        let transaction = self.verifier.verify(result)?;
        Ok(transaction.is_valid().then_some(transaction))
    }
}

impl<B, S> Drop for StoreManager<B, S> {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Runs for the lifetime of the owning manager, folding each delivered
/// transaction into the context in delivery order.
///
/// Updates are processed one at a time: each fold completes, including
/// persistence, before the next update is taken from the stream. Failures
/// are logged and skipped; the subscription itself only ends when the
/// backend closes the stream or the task is aborted.
async fn listen_for_transaction_updates<B, S>(
    backend: Arc<B>,
    context: Arc<StoreContext<S>>,
    verifier: SharedVerifier,
) where
    B: CommerceBackend,
    S: KeyValueStore,
{
    let mut updates = backend.transaction_updates();
    while let Some(result) = updates.next().await {
        if let Err(error) = handle_transaction(&*backend, &context, &*verifier, result).await {
            log::warn!("transaction listener: {error}");
        }
    }
    log::debug!("transaction update stream ended");
}

/// Verifies a delivered result, folds the transaction into the context,
/// and finalizes it with the backend.
async fn handle_transaction<B, S>(
    backend: &B,
    context: &StoreContext<S>,
    verifier: &dyn TransactionVerifier,
    result: VerificationResult,
) -> Result<Transaction>
where
    B: CommerceBackend,
    S: KeyValueStore,
{
    let transaction = verifier.verify(result)?;
    context.fold_transaction(transaction.clone()).await?;
    backend
        .finalize(&transaction)
        .await
        .map_err(|err| Error::AdapterError {
            source_error: anyhow::Error::new(err),
        })?;
    Ok(transaction)
}
