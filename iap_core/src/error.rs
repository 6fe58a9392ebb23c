// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use iap_types::{Transaction, VerificationError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The backend's trust mechanism rejected a transaction.
    ///
    /// Recoverable: the live listener logs it and keeps listening, while
    /// purchase and restore calls propagate it to the caller.
    #[error("transaction {} for product {} failed verification", .transaction.id, .transaction.product_id)]
    InvalidTransaction {
        transaction: Transaction,
        source: VerificationError,
    },

    /// A purchase was initiated in an execution environment that forbids
    /// direct purchase initiation. Purchases must be routed through the
    /// environment-provided purchase affordance instead. Never retried.
    #[error("direct purchases are not supported on this platform: {message}")]
    UnsupportedPlatform { message: String },

    /// An error from a storage or backend adapter, passed through unchanged.
    #[error("error from adapter: {source_error}")]
    AdapterError { source_error: anyhow::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
