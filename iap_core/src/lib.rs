// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0
#![doc = include_str!("../README.md")]
//! ## Getting started
//!
//! Implement the adapter traits in [`manager::adapters`] for your platform's
//! commerce backend and durable store, load a [`context::StoreContext`], and
//! hand both to a [`manager::StoreManager`]. The in-memory adapters in
//! [`context::memory`] show the expected behavior of each adapter.

pub mod context;
mod error;
pub mod manager;
pub mod verification;

pub use error::{Error, Result};
