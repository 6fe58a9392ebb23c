// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Module containing the purchase state cache.
//!
//! The [`StoreContext`] holds the last-known product catalog and the
//! last-known set of valid purchase transactions, mirrors both into
//! persisted identifier lists, and answers purchase-state queries
//! synchronously from cache.
//!
//! Product and transaction descriptors are opaque backend records and are
//! not persisted. The identifier lists are, which means an app can map a
//! local product catalog to them and keep presenting products — and
//! honoring purchases — while the backend is unreachable.

pub mod memory;
mod repository;

use std::sync::RwLock;

use iap_types::{Product, ProductId, ProductRepresentable, Transaction};
use repository::ContextRepository;
pub use repository::{PRODUCT_IDS_KEY, PURCHASED_PRODUCT_IDS_KEY};
use tokio::sync::Mutex;

use crate::{manager::adapters::KeyValueStore, Result};

#[derive(Default)]
struct ContextState {
    products: Vec<Product>,
    product_ids: Vec<ProductId>,
    purchase_transactions: Vec<Transaction>,
    purchased_product_ids: Vec<ProductId>,
}

/// The purchase state cache.
///
/// Two invariants hold after every mutation:
///
/// - `product_ids` is exactly `products` mapped to identifiers, and
///   `purchased_product_ids` is exactly `purchase_transactions` mapped to
///   product identifiers;
/// - `purchase_transactions` holds at most one entry per product
///   identifier.
///
/// Mutators are serialized onto one mutation context by an internal write
/// lock and persist the derived identifier list before committing, so a
/// persistence failure leaves the readable state unchanged. Reads never
/// block on a mutation in flight; they observe the latest committed state.
pub struct StoreContext<S> {
    repository: ContextRepository<S>,
    /// Serializes mutators; never held by readers.
    write_lock: Mutex<()>,
    /// Committed state; locked only momentarily, never across an await.
    state: RwLock<ContextState>,
}

impl<S: KeyValueStore> StoreContext<S> {
    /// Loads a context from the provided store.
    ///
    /// `initial_product_ids` seeds the product-identifier list when
    /// nothing has been persisted yet; once a list has been persisted the
    /// seed is ignored. The purchased-identifier list always comes from
    /// the store. `products` and `purchase_transactions` start empty and
    /// must be re-synced from the backend each process run.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AdapterError`] when the store cannot be
    /// read.
    pub async fn load(store: S, initial_product_ids: Vec<ProductId>) -> Result<Self> {
        let repository = ContextRepository::new(store);
        let persisted_product_ids = repository.load_product_ids().await?;
        let product_ids = if persisted_product_ids.is_empty() {
            initial_product_ids
        } else {
            persisted_product_ids
        };
        let purchased_product_ids = repository.load_purchased_product_ids().await?;
        Ok(Self {
            repository,
            write_lock: Mutex::new(()),
            state: RwLock::new(ContextState {
                products: Vec::new(),
                product_ids,
                purchase_transactions: Vec::new(),
                purchased_product_ids,
            }),
        })
    }

    /// Replaces the product catalog, recomputing and persisting the
    /// product-identifier list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AdapterError`] when persisting fails; the
    /// readable state is unchanged in that case.
    pub async fn set_products(&self, products: Vec<Product>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let product_ids: Vec<ProductId> = products.iter().map(|p| p.id.clone()).collect();
        self.repository.save_product_ids(&product_ids).await?;
        let mut state = self.state.write().unwrap();
        state.products = products;
        state.product_ids = product_ids;
        Ok(())
    }

    /// Folds a transaction into the purchase set.
    ///
    /// Any existing entry for the same product identifier is removed
    /// before the new transaction is appended: last write wins, a newer
    /// transaction always supersedes an older one regardless of which has
    /// the later expiration. Recomputes and persists the
    /// purchased-identifier list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AdapterError`] when persisting fails; the
    /// readable state is unchanged in that case.
    pub async fn fold_transaction(&self, transaction: Transaction) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut transactions: Vec<Transaction> = {
            let state = self.state.read().unwrap();
            state
                .purchase_transactions
                .iter()
                .filter(|t| t.product_id != transaction.product_id)
                .cloned()
                .collect()
        };
        transactions.push(transaction);
        self.commit_transactions(transactions).await
    }

    /// Wholesale replaces the purchase set, e.g. after a restore pass.
    ///
    /// No deduplication is performed: the caller is responsible for
    /// supplying at most one transaction per product identifier.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AdapterError`] when persisting fails; the
    /// readable state is unchanged in that case.
    pub async fn replace_transactions(&self, transactions: Vec<Transaction>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.commit_transactions(transactions).await
    }

    /// Persists then commits a new purchase set. Caller holds the write
    /// lock.
    async fn commit_transactions(&self, transactions: Vec<Transaction>) -> Result<()> {
        let purchased_product_ids: Vec<ProductId> = transactions
            .iter()
            .map(|t| t.product_id.clone())
            .collect();
        self.repository
            .save_purchased_product_ids(&purchased_product_ids)
            .await?;
        let mut state = self.state.write().unwrap();
        state.purchase_transactions = transactions;
        state.purchased_product_ids = purchased_product_ids;
        Ok(())
    }
}

impl<S> StoreContext<S> {
    /// Whether the product with the provided identifier is purchased.
    pub fn is_purchased(&self, product_id: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .purchased_product_ids
            .iter()
            .any(|id| id == product_id)
    }

    /// The product with the provided identifier, if the catalog has been
    /// synced this run.
    ///
    /// This only consults the live catalog: before [`Self::set_products`]
    /// has been called it returns `None` even when the persisted
    /// identifier list is non-empty. The persisted list is a hint for
    /// callers keeping a local offline catalog; a live [`Product`] is
    /// required to purchase.
    pub fn product_by_id(&self, product_id: &str) -> Option<Product> {
        self.state
            .read()
            .unwrap()
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
    }

    /// The products synced with the context this run.
    pub fn products(&self) -> Vec<Product> {
        self.state.read().unwrap().products.clone()
    }

    /// The identifiers of the products synced with the context. Persisted.
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.state.read().unwrap().product_ids.clone()
    }

    /// The active purchase transactions synced with the context this run.
    pub fn purchase_transactions(&self) -> Vec<Transaction> {
        self.state.read().unwrap().purchase_transactions.clone()
    }

    /// The identifiers of the purchased products. Persisted.
    pub fn purchased_product_ids(&self) -> Vec<ProductId> {
        self.state.read().unwrap().purchased_product_ids.clone()
    }

    /// The entries of a local catalog that are available in this context.
    pub fn available_from<'a, P: ProductRepresentable>(&self, catalog: &'a [P]) -> Vec<&'a P> {
        let ids = self.product_ids();
        catalog
            .iter()
            .filter(|p| ids.iter().any(|id| id == p.product_id()))
            .collect()
    }

    /// The entries of a local catalog that are purchased in this context.
    pub fn purchased_from<'a, P: ProductRepresentable>(&self, catalog: &'a [P]) -> Vec<&'a P> {
        let ids = self.purchased_product_ids();
        catalog
            .iter()
            .filter(|p| ids.iter().any(|id| id == p.product_id()))
            .collect()
    }
}
