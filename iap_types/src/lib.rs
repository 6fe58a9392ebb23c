// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! # In-app purchase data types
//!
//! These types model what the platform commerce backend hands out — product
//! descriptors, purchase transactions and their verification results — plus
//! the small amount of pure logic that belongs to them (transaction validity,
//! subscription savings math).
//!
//! [`Product`] and [`Transaction`] are deliberately not serializable: they
//! are opaque descriptors owned by the backend, and only their identifiers
//! are ever persisted by `iap_core`.

mod product;
mod purchase;
mod savings;
mod transaction;
mod verification;

pub use product::{BasicProduct, Price, Product, ProductId, ProductRepresentable};
pub use purchase::{PurchaseOutcome, PurchaseResult};
pub use savings::{
    yearly_savings_display_percentage, yearly_savings_display_percentage_for,
    yearly_savings_fraction,
};
pub use transaction::Transaction;
pub use verification::{VerificationError, VerificationResult};
