// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Module containing the product descriptor types handed out by the
//! commerce backend, and the [`ProductRepresentable`] trait used to key a
//! local offline catalog by the same identifiers.

/// The identifier type used for products by the commerce backend.
pub type ProductId = String;

/// A product price as reported by the commerce backend.
///
/// The amount is kept in minor units (cents, pence, …) together with the
/// ISO currency code. Formatting for display is a backend concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    /// Price amount in minor currency units.
    pub amount_minor: u64,
    /// ISO 4217 currency code, e.g. `"USD"`.
    pub currency: String,
}

impl Price {
    /// Returns a price with the provided minor-unit amount and currency.
    pub fn new(amount_minor: u64, currency: impl Into<String>) -> Self {
        Self {
            amount_minor,
            currency: currency.into(),
        }
    }
}

/// A purchasable product as described by the commerce backend.
///
/// Products are opaque backend descriptors and cannot be persisted; a live
/// instance must be re-fetched from the backend every process run, and is
/// required to initiate a purchase. Identity is the [`ProductId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// The backend identifier of the product.
    pub id: ProductId,
    /// The localized display name of the product.
    pub display_name: String,
    /// The localized price of the product.
    pub price: Price,
}

impl Product {
    /// Returns a product descriptor with the provided values.
    pub fn new(id: impl Into<ProductId>, display_name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            price,
        }
    }
}

/// Implemented by types that represent a backend product locally.
///
/// A local catalog that uses the same product identifiers as the backend
/// catalog can present product information even when the backend cannot be
/// reached, and can be filtered against the cached identifier sets with
/// `StoreContext::available_from` and `StoreContext::purchased_from` in
/// `iap_core`.
pub trait ProductRepresentable {
    /// The backend identifier this representation maps to.
    fn product_id(&self) -> &str;
}

impl ProductRepresentable for Product {
    fn product_id(&self) -> &str {
        &self.id
    }
}

/// A minimal local product representation: an identifier and a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicProduct {
    /// The backend identifier of the product.
    pub id: ProductId,
    /// The product display name.
    pub name: String,
}

impl BasicProduct {
    /// Returns a basic product representation with the provided values.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl ProductRepresentable for BasicProduct {
    fn product_id(&self) -> &str {
        &self.id
    }
}
