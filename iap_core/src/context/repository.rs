// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Explicit persistence for the context's identifier lists.
//!
//! The repository owns the two durable keys and their encoding: each value
//! is an ordered list of identifier strings, JSON-encoded. An absent or
//! corrupt value decodes to the empty list, so a damaged store can never
//! prevent the context from loading.

use iap_types::ProductId;

use crate::{manager::adapters::KeyValueStore, Error, Result};

/// Durable key for the synced product-identifier list.
pub const PRODUCT_IDS_KEY: &str = "com.semiotic.iap.productIds";

/// Durable key for the purchased-product-identifier list.
pub const PURCHASED_PRODUCT_IDS_KEY: &str = "com.semiotic.iap.purchasedProductIds";

/// Loads and saves the context's persisted identifier lists.
///
/// Owned exclusively by [`crate::context::StoreContext`]; no other
/// component touches these keys.
pub(crate) struct ContextRepository<S> {
    store: S,
}

impl<S: KeyValueStore> ContextRepository<S> {
    pub(crate) fn new(store: S) -> Self {
        Self { store }
    }

    pub(crate) async fn load_product_ids(&self) -> Result<Vec<ProductId>> {
        self.load(PRODUCT_IDS_KEY).await
    }

    pub(crate) async fn save_product_ids(&self, ids: &[ProductId]) -> Result<()> {
        self.save(PRODUCT_IDS_KEY, ids).await
    }

    pub(crate) async fn load_purchased_product_ids(&self) -> Result<Vec<ProductId>> {
        self.load(PURCHASED_PRODUCT_IDS_KEY).await
    }

    pub(crate) async fn save_purchased_product_ids(&self, ids: &[ProductId]) -> Result<()> {
        self.save(PURCHASED_PRODUCT_IDS_KEY, ids).await
    }

    async fn load(&self, key: &str) -> Result<Vec<ProductId>> {
        let bytes = self
            .store
            .get(key)
            .await
            .map_err(|err| Error::AdapterError {
                source_error: anyhow::Error::new(err),
            })?;
        let Some(bytes) = bytes else {
            return Ok(Vec::new());
        };
        match serde_json::from_slice(&bytes) {
            Ok(ids) => Ok(ids),
            Err(err) => {
                log::warn!("discarding corrupt persisted value for {key}: {err}");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, key: &str, ids: &[ProductId]) -> Result<()> {
        let bytes = serde_json::to_vec(ids).map_err(|err| Error::AdapterError {
            source_error: anyhow::Error::new(err),
        })?;
        self.store
            .set(key, bytes)
            .await
            .map_err(|err| Error::AdapterError {
                source_error: anyhow::Error::new(err),
            })
    }
}
