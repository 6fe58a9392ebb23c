// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Module containing the purchase transaction record and its validity rule.
//!
//! A transaction is the backend's proof of a completed purchase for a
//! product. Like [`crate::Product`] it is an opaque backend record and is
//! never persisted; only its product identifier is folded into the
//! persisted purchased set by `iap_core`.

use std::time::SystemTime;

use crate::ProductId;

/// Proof of a completed purchase for a product, as issued by the commerce
/// backend after a purchase or restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// The backend-assigned transaction identifier.
    pub id: u64,
    /// The identifier of the purchased product.
    pub product_id: ProductId,
    /// When the transaction expires, for subscription products.
    pub expiration_date: Option<SystemTime>,
    /// When the transaction was revoked, e.g. after a refund.
    pub revocation_date: Option<SystemTime>,
}

impl Transaction {
    /// Returns a transaction with no expiration and no revocation.
    pub fn new(id: u64, product_id: impl Into<ProductId>) -> Self {
        Self {
            id,
            product_id: product_id.into(),
            expiration_date: None,
            revocation_date: None,
        }
    }

    /// Returns the transaction with the provided expiration date.
    pub fn with_expiration_date(mut self, date: SystemTime) -> Self {
        self.expiration_date = Some(date);
        self
    }

    /// Returns the transaction with the provided revocation date.
    pub fn with_revocation_date(mut self, date: SystemTime) -> Self {
        self.revocation_date = Some(date);
        self
    }

    /// Whether the transaction is valid at the provided point in time.
    ///
    /// A valid transaction has no revocation date, and no expiration date
    /// that is not strictly in the future. An expiration date equal to `at`
    /// counts as expired.
    pub fn valid_at(&self, at: SystemTime) -> bool {
        if self.revocation_date.is_some() {
            return false;
        }
        match self.expiration_date {
            None => true,
            Some(date) => date > at,
        }
    }

    /// Whether the transaction is valid right now.
    pub fn is_valid(&self) -> bool {
        self.valid_at(SystemTime::now())
    }
}
