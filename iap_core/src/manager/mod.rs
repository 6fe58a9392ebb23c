// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Module containing the store manager and its adapter traits.
//!
//! The [`StoreManager`] coordinates the external collaborators — the
//! commerce backend and, through the context, the durable store — into the
//! reconciliation behavior of the crate: a live listener that folds every
//! backend transaction update into the cache, an on-demand restore pass
//! that re-derives the full purchase set, and a purchase operation that
//! verifies and caches its outcome before returning.

pub mod adapters;
mod store_manager;

pub use store_manager::StoreManager;
