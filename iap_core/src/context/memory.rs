// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory adapter implementations.
//!
//! This module provides in-memory implementations of the
//! [`KeyValueStore`] and [`CommerceBackend`] adapters. They are useful for
//! testing and development purposes: the store exposes its storage map so
//! a second context can be loaded over the same bytes, and the backend is
//! fully scripted — catalog, purchase results, latest transactions and the
//! transaction-update stream are all driven by the test.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, RwLock},
};

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use iap_types::{Product, ProductId, PurchaseResult, Transaction, VerificationResult};
use tokio::sync::mpsc;

use crate::manager::adapters::{CommerceBackend, KeyValueStore};

/// Shared storage map for [`InMemoryStore`], with rwlocks to allow sharing
/// with other components as needed.
pub type SharedStorage = Arc<RwLock<HashMap<String, Vec<u8>>>>;

#[derive(Debug, thiserror::Error)]
pub enum InMemoryError {
    #[error("something went wrong: {error}")]
    AdapterError { error: String },
}

/// An in-memory [`KeyValueStore`].
///
/// Cloning the store, or constructing a second one over the same
/// [`SharedStorage`], yields a view of the same persisted bytes — which is
/// how tests model a process restart.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    storage: SharedStorage,
}

impl InMemoryStore {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// The underlying storage map.
    pub fn storage(&self) -> SharedStorage {
        self.storage.clone()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    type AdapterError = InMemoryError;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::AdapterError> {
        Ok(self.storage.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), Self::AdapterError> {
        self.storage.write().unwrap().insert(key.to_owned(), value);
        Ok(())
    }
}

/// A scripted in-memory [`CommerceBackend`].
///
/// Purchase calls pop results from a queue scripted with
/// [`Self::enqueue_purchase_result`]; restore lookups read the per-product
/// results set with [`Self::set_latest_transaction`]; the update stream
/// delivers whatever is pushed through [`Self::push_update`]. Finalized
/// transaction identifiers are recorded for assertions.
pub struct InMemoryBackend {
    catalog: RwLock<Vec<Product>>,
    purchase_results: Mutex<VecDeque<PurchaseResult>>,
    latest_transactions: RwLock<HashMap<ProductId, VerificationResult>>,
    finalized: RwLock<Vec<u64>>,
    updates_sender: mpsc::UnboundedSender<VerificationResult>,
    updates_receiver: Mutex<Option<mpsc::UnboundedReceiver<VerificationResult>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let (updates_sender, updates_receiver) = mpsc::unbounded_channel();
        Self {
            catalog: RwLock::new(Vec::new()),
            purchase_results: Mutex::new(VecDeque::new()),
            latest_transactions: RwLock::new(HashMap::new()),
            finalized: RwLock::new(Vec::new()),
            updates_sender,
            updates_receiver: Mutex::new(Some(updates_receiver)),
        }
    }

    /// Returns the backend with the provided catalog.
    pub fn with_catalog(self, products: Vec<Product>) -> Self {
        *self.catalog.write().unwrap() = products;
        self
    }

    /// Scripts the result of the next unscripted purchase call.
    pub fn enqueue_purchase_result(&self, result: PurchaseResult) {
        self.purchase_results.lock().unwrap().push_back(result);
    }

    /// Scripts the latest transaction reported for a product.
    pub fn set_latest_transaction(&self, product_id: impl Into<ProductId>, result: VerificationResult) {
        self.latest_transactions
            .write()
            .unwrap()
            .insert(product_id.into(), result);
    }

    /// Forgets all scripted latest transactions.
    pub fn clear_latest_transactions(&self) {
        self.latest_transactions.write().unwrap().clear();
    }

    /// Delivers a verification result on the transaction-update stream.
    pub fn push_update(&self, result: VerificationResult) {
        // ignore send failures: the listener may already be gone
        let _ = self.updates_sender.send(result);
    }

    /// The identifiers of the transactions finalized so far.
    pub fn finalized_transactions(&self) -> Vec<u64> {
        self.finalized.read().unwrap().clone()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommerceBackend for InMemoryBackend {
    type AdapterError = InMemoryError;

    async fn fetch_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, Self::AdapterError> {
        let catalog = self.catalog.read().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| catalog.iter().find(|p| &p.id == id).cloned())
            .collect())
    }

    async fn purchase(&self, _product: &Product) -> Result<PurchaseResult, Self::AdapterError> {
        self.purchase_results
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(InMemoryError::AdapterError {
                error: "no purchase result scripted".to_owned(),
            })
    }

    async fn latest_transaction(
        &self,
        product_id: &str,
    ) -> Result<Option<VerificationResult>, Self::AdapterError> {
        Ok(self
            .latest_transactions
            .read()
            .unwrap()
            .get(product_id)
            .cloned())
    }

    fn transaction_updates(&self) -> BoxStream<'static, VerificationResult> {
        let receiver = self.updates_receiver.lock().unwrap().take();
        match receiver {
            Some(receiver) => Box::pin(futures_util::stream::unfold(
                receiver,
                |mut receiver| async move {
                    receiver.recv().await.map(|result| (result, receiver))
                },
            )),
            // the stream was already claimed; a second subscriber sees
            // nothing rather than stealing deliveries
            None => Box::pin(futures_util::stream::empty()),
        }
    }

    async fn finalize(&self, transaction: &Transaction) -> Result<(), Self::AdapterError> {
        self.finalized.write().unwrap().push(transaction.id);
        Ok(())
    }
}
