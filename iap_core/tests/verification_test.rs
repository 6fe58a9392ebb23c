// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use iap_core::{
    verification::{StandardVerifier, TransactionVerifier},
    Error,
};
use iap_types::{Transaction, VerificationError, VerificationResult};

#[test]
fn verified_transactions_pass_through_unchanged() {
    let transaction = Transaction::new(42, "p1");

    let verified = StandardVerifier
        .verify(VerificationResult::Verified(transaction.clone()))
        .unwrap();

    assert_eq!(verified, transaction);
}

#[test]
fn unverified_transactions_are_rejected_with_their_cause() {
    let transaction = Transaction::new(42, "p1");

    let error = StandardVerifier
        .verify(VerificationResult::Unverified {
            transaction: transaction.clone(),
            error: VerificationError::InvalidSignature,
        })
        .unwrap_err();

    match error {
        Error::InvalidTransaction {
            transaction: rejected,
            source,
        } => {
            assert_eq!(rejected, transaction);
            assert_eq!(source, VerificationError::InvalidSignature);
        }
        other => panic!("expected InvalidTransaction, got {other}"),
    }
}
