// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Module containing the transaction verifier seam.
//!
//! The cryptographic check already happened inside the commerce backend;
//! the verifier only decides what to do with its outcome. It is injected
//! into the [`crate::manager::StoreManager`] so tests and platform
//! bindings can tighten or relax the policy without touching the manager.

use std::sync::Arc;

use iap_types::{Transaction, VerificationResult};

use crate::{Error, Result};

/// A shareable, object-safe transaction verifier.
pub type SharedVerifier = Arc<dyn TransactionVerifier>;

/// Turns a backend [`VerificationResult`] into a trusted [`Transaction`]
/// or an error. Pure: no side effects, no state.
pub trait TransactionVerifier: Send + Sync {
    /// Returns the wrapped transaction unchanged when the result is
    /// verified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransaction`] with the rejected transaction
    /// and the backend's cause when the result is unverified.
    fn verify(&self, result: VerificationResult) -> Result<Transaction>;
}

/// The standard verifier: trusts exactly what the backend verified.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardVerifier;

impl TransactionVerifier for StandardVerifier {
    fn verify(&self, result: VerificationResult) -> Result<Transaction> {
        match result {
            VerificationResult::Verified(transaction) => Ok(transaction),
            VerificationResult::Unverified { transaction, error } => {
                Err(Error::InvalidTransaction {
                    transaction,
                    source: error,
                })
            }
        }
    }
}
