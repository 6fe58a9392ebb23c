// Copyright 2023-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use iap_core::{
    context::{
        memory::{InMemoryBackend, InMemoryStore},
        StoreContext,
    },
    manager::StoreManager,
    Error,
};
use iap_types::{
    Price, Product, PurchaseOutcome, PurchaseResult, Transaction, VerificationError,
    VerificationResult,
};
use rstest::*;

struct Harness {
    backend: Arc<InMemoryBackend>,
    context: Arc<StoreContext<InMemoryStore>>,
    manager: StoreManager<InMemoryBackend, InMemoryStore>,
}

fn product(id: &str) -> Product {
    Product::new(id, id.to_uppercase(), Price::new(499, "USD"))
}

fn verified(transaction_id: u64, product_id: &str) -> VerificationResult {
    VerificationResult::Verified(Transaction::new(transaction_id, product_id))
}

fn unverified(transaction_id: u64, product_id: &str) -> VerificationResult {
    VerificationResult::Unverified {
        transaction: Transaction::new(transaction_id, product_id),
        error: VerificationError::InvalidSignature,
    }
}

async fn harness(product_ids: &[&str]) -> Harness {
    let backend = Arc::new(InMemoryBackend::new());
    let context = Arc::new(
        StoreContext::load(InMemoryStore::default(), Vec::new())
            .await
            .unwrap(),
    );
    let manager = StoreManager::new(
        backend.clone(),
        context.clone(),
        product_ids.iter().map(|id| id.to_string()).collect(),
    );
    Harness {
        backend,
        context,
        manager,
    }
}

/// Polls until `condition` holds, for listener tests that race the
/// background task.
async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

#[rstest]
#[tokio::test]
async fn successful_purchase_folds_and_finalizes_the_transaction() {
    let harness = harness(&["p1"]).await;
    harness
        .backend
        .enqueue_purchase_result(PurchaseResult::Success(verified(7, "p1")));

    let outcome = harness.manager.purchase(&product("p1")).await.unwrap();

    assert_eq!(outcome, PurchaseOutcome::Success(Transaction::new(7, "p1")));
    assert!(harness.context.is_purchased("p1"));
    assert_eq!(harness.backend.finalized_transactions(), vec![7]);
}

#[rstest]
#[case::pending(PurchaseResult::Pending, PurchaseOutcome::Pending)]
#[case::cancelled(PurchaseResult::UserCancelled, PurchaseOutcome::UserCancelled)]
#[tokio::test]
async fn non_successful_purchases_leave_the_cache_untouched(
    #[case] result: PurchaseResult,
    #[case] expected: PurchaseOutcome,
) {
    let harness = harness(&["p1"]).await;
    harness.backend.enqueue_purchase_result(result);

    let outcome = harness.manager.purchase(&product("p1")).await.unwrap();

    assert_eq!(outcome, expected);
    assert!(!harness.context.is_purchased("p1"));
    assert!(harness.backend.finalized_transactions().is_empty());
}

#[rstest]
#[tokio::test]
async fn unverified_purchase_fails_and_leaves_the_cache_untouched() {
    let harness = harness(&["p1"]).await;
    harness
        .backend
        .enqueue_purchase_result(PurchaseResult::Success(unverified(7, "p1")));

    let error = harness.manager.purchase(&product("p1")).await.unwrap_err();

    match error {
        Error::InvalidTransaction {
            transaction,
            source,
        } => {
            assert_eq!(transaction.id, 7);
            assert_eq!(source, VerificationError::InvalidSignature);
        }
        other => panic!("expected InvalidTransaction, got {other}"),
    }
    assert!(!harness.context.is_purchased("p1"));
    assert!(harness.backend.finalized_transactions().is_empty());
}

#[rstest]
#[tokio::test]
async fn purchase_fails_where_direct_purchases_are_unsupported() {
    let harness = harness(&["p1"]).await;
    let manager = harness.manager.with_direct_purchase(false);

    let error = manager.purchase(&product("p1")).await.unwrap_err();

    assert!(matches!(error, Error::UnsupportedPlatform { .. }));
    assert!(!harness.context.is_purchased("p1"));
}

#[rstest]
#[tokio::test]
async fn restore_keeps_only_valid_latest_transactions() {
    let harness = harness(&["p1", "p2", "p3"]).await;
    harness
        .backend
        .set_latest_transaction("p1", verified(1, "p1"));
    // p2 has no transaction at all
    harness.backend.set_latest_transaction(
        "p3",
        VerificationResult::Verified(
            Transaction::new(3, "p3")
                .with_expiration_date(SystemTime::now() - Duration::from_secs(1_000)),
        ),
    );

    harness.manager.restore_purchases().await.unwrap();

    assert_eq!(harness.context.purchased_product_ids(), vec!["p1"]);
    assert_eq!(harness.context.purchase_transactions().len(), 1);
}

#[rstest]
#[tokio::test]
async fn restore_clears_purchases_the_backend_no_longer_reports() {
    let harness = harness(&["p1"]).await;
    harness
        .context
        .fold_transaction(Transaction::new(1, "p1"))
        .await
        .unwrap();

    harness.manager.restore_purchases().await.unwrap();

    assert!(harness.context.purchased_product_ids().is_empty());
    assert!(harness.context.purchase_transactions().is_empty());
}

#[rstest]
#[tokio::test]
async fn restore_fails_fast_on_an_unverified_transaction() {
    let harness = harness(&["p1", "p2"]).await;
    harness
        .backend
        .set_latest_transaction("p1", unverified(1, "p1"));
    harness
        .backend
        .set_latest_transaction("p2", verified(2, "p2"));
    harness
        .context
        .fold_transaction(Transaction::new(9, "p2"))
        .await
        .unwrap();

    let error = harness.manager.restore_purchases().await.unwrap_err();

    assert!(matches!(error, Error::InvalidTransaction { .. }));
    // the aborted pass must not have replaced anything
    assert_eq!(harness.context.purchased_product_ids(), vec!["p2"]);
}

#[rstest]
#[tokio::test]
async fn listener_folds_delivered_transactions() {
    let harness = harness(&["p1"]).await;

    harness.backend.push_update(verified(1, "p1"));

    assert!(eventually(|| harness.context.is_purchased("p1")).await);
    assert!(eventually(|| harness.backend.finalized_transactions() == vec![1]).await);
}

#[rstest]
#[tokio::test]
async fn listener_applies_updates_last_write_wins() {
    let harness = harness(&["p1"]).await;

    harness.backend.push_update(verified(1, "p1"));
    harness.backend.push_update(verified(2, "p1"));

    assert!(
        eventually(|| {
            let transactions = harness.context.purchase_transactions();
            transactions.len() == 1 && transactions[0].id == 2
        })
        .await
    );
}

#[rstest]
#[tokio::test]
async fn listener_survives_a_bad_update() {
    let harness = harness(&["p1", "p2"]).await;

    harness.backend.push_update(unverified(1, "p1"));
    harness.backend.push_update(verified(2, "p2"));

    assert!(eventually(|| harness.context.is_purchased("p2")).await);
    assert!(!harness.context.is_purchased("p1"));
    assert_eq!(harness.backend.finalized_transactions(), vec![2]);
}

#[rstest]
#[tokio::test]
async fn dropping_the_manager_stops_the_listener() {
    let harness = harness(&["p1"]).await;
    drop(harness.manager);

    harness.backend.push_update(verified(1, "p1"));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!harness.context.is_purchased("p1"));
}

#[rstest]
#[tokio::test]
async fn sync_store_data_syncs_catalog_and_purchases() {
    let backend = Arc::new(
        InMemoryBackend::new().with_catalog(vec![product("p1"), product("p2")]),
    );
    let context = Arc::new(
        StoreContext::load(InMemoryStore::default(), Vec::new())
            .await
            .unwrap(),
    );
    let manager = StoreManager::new(
        backend.clone(),
        context.clone(),
        vec!["p1".to_owned(), "p2".to_owned()],
    );
    backend.set_latest_transaction("p1", verified(1, "p1"));

    manager.sync_store_data().await.unwrap();

    assert_eq!(context.product_ids(), vec!["p1", "p2"]);
    assert!(context.product_by_id("p2").is_some());
    assert_eq!(context.purchased_product_ids(), vec!["p1"]);
}

#[rstest]
#[tokio::test]
async fn fetch_products_does_not_touch_the_context() {
    let backend = Arc::new(InMemoryBackend::new().with_catalog(vec![product("p1")]));
    let context = Arc::new(
        StoreContext::load(InMemoryStore::default(), Vec::new())
            .await
            .unwrap(),
    );
    let manager = StoreManager::new(backend, context.clone(), vec!["p1".to_owned()]);

    let products = manager.fetch_products().await.unwrap();

    assert_eq!(products.len(), 1);
    assert!(context.products().is_empty());
    assert!(context.product_ids().is_empty());
}
