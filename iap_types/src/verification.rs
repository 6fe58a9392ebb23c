// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Module containing the verification result delivered by the commerce
//! backend alongside every transaction.
//!
//! Verification itself is cryptographic and happens inside the backend;
//! this crate only models its outcome. Every transaction that reaches the
//! reconciliation layer — from a purchase call, a restore lookup or the
//! live update stream — arrives wrapped in a [`VerificationResult`].

use serde::{Deserialize, Serialize};

use crate::Transaction;

/// The reason the backend's trust mechanism rejected a transaction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationError {
    #[error("the transaction signature does not match the signed payload")]
    InvalidSignature,
    #[error("the certificate chain used to sign the transaction is invalid")]
    InvalidCertificateChain,
    #[error("the transaction payload could not be decoded")]
    InvalidEncoding,
    #[error("the transaction was signed for a different device")]
    InvalidDeviceVerification,
    #[error("the certificate used to sign the transaction has been revoked")]
    RevokedCertificate,
}

/// The outcome of the backend's cryptographic check of a transaction.
///
/// An `Unverified` result still carries the transaction it rejected, so
/// callers can report what was rejected and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// The transaction is authentic and untampered.
    Verified(Transaction),
    /// The transaction failed the backend's trust check.
    Unverified {
        /// The rejected transaction.
        transaction: Transaction,
        /// Why the transaction was rejected.
        error: VerificationError,
    },
}
