// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Module containing the purchase outcome types.

use crate::{Transaction, VerificationResult};

/// The raw outcome of a purchase call against the commerce backend.
///
/// A successful purchase still carries an unexamined [`VerificationResult`];
/// it is the caller's job to verify it before trusting the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseResult {
    /// The purchase completed and the backend returned a verification
    /// result for the new transaction.
    Success(VerificationResult),
    /// The purchase needs further action outside the app, e.g. parental
    /// approval. A transaction may arrive later on the update stream.
    Pending,
    /// The user cancelled the purchase.
    UserCancelled,
}

/// The outcome of a purchase after verification and cache reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// The purchase completed with a verified transaction.
    Success(Transaction),
    /// The purchase is pending external action; nothing was cached.
    Pending,
    /// The user cancelled the purchase; nothing was cached.
    UserCancelled,
}
