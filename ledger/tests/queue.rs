//! Submission queue behaviour against the in-memory ledger.

use std::sync::Arc;

use admit_codec::{Taxon, TokenFlags};
use admit_ledger::{LedgerClient, LedgerError, RejectCode, SubmissionQueue};
use admit_nullables::NullLedger;
use admit_transactions::{MintTx, Transaction};
use admit_types::Address;

fn mint(account: &Address) -> Transaction {
    Transaction::Mint(MintTx {
        account: account.clone(),
        sequence: 0,
        taxon: Taxon::new(42),
        flags: TokenFlags::TRANSFERABLE,
        transfer_fee: 0,
        uri: None,
        metadata_digest: [0u8; 32],
        memo: None,
    })
}

fn queue_for(ledger: &Arc<NullLedger>) -> SubmissionQueue {
    SubmissionQueue::new(ledger.clone(), ledger.clock())
}

#[tokio::test]
async fn assigns_consecutive_sequences() {
    let ledger = Arc::new(NullLedger::new());
    let issuer = ledger.create_account([1u8; 32]);
    let queue = queue_for(&ledger);

    let first = queue.submit(mint(&issuer)).await.unwrap();
    let second = queue.submit(mint(&issuer)).await.unwrap();
    assert_eq!(first.signed.tx.sequence(), 1);
    assert_eq!(second.signed.tx.sequence(), 2);
    assert_eq!(queue.cached_sequence(&issuer).await, Some(3));
}

#[tokio::test]
async fn concurrent_submissions_from_one_account_do_not_collide() {
    let ledger = Arc::new(NullLedger::new());
    let issuer = ledger.create_account([1u8; 32]);
    let queue = Arc::new(queue_for(&ledger));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let queue = Arc::clone(&queue);
        let tx = mint(&issuer);
        handles.push(tokio::spawn(async move { queue.submit(tx).await }));
    }
    let mut sequences = Vec::new();
    for h in handles {
        sequences.push(h.await.unwrap().unwrap().signed.tx.sequence());
    }
    sequences.sort();
    assert_eq!(sequences, (1..=8).collect::<Vec<_>>());
    assert_eq!(ledger.submitted("mint"), 8);
}

#[tokio::test]
async fn stale_sequence_resyncs_once() {
    let ledger = Arc::new(NullLedger::new());
    let issuer = ledger.create_account([1u8; 32]);
    let queue = queue_for(&ledger);

    queue.submit(mint(&issuer)).await.unwrap();
    ledger.advance_sequence(&issuer, 3);

    let submitted = queue.submit(mint(&issuer)).await.unwrap();
    assert_eq!(submitted.signed.tx.sequence(), 5);
    assert_eq!(ledger.account_sequence(&issuer).await.unwrap(), 6);
}

#[tokio::test]
async fn transport_failure_drops_cached_sequence() {
    let ledger = Arc::new(NullLedger::new());
    let issuer = ledger.create_account([1u8; 32]);
    let queue = queue_for(&ledger);

    queue.submit(mint(&issuer)).await.unwrap();
    ledger.fail_next_submissions(1);
    let err = queue.submit(mint(&issuer)).await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(queue.cached_sequence(&issuer).await, None);

    let next = queue.submit(mint(&issuer)).await.unwrap();
    assert_eq!(next.signed.tx.sequence(), 2);
}

#[tokio::test]
async fn rejection_is_reported() {
    let ledger = Arc::new(NullLedger::new());
    let issuer = ledger.create_account([1u8; 32]);
    let queue = queue_for(&ledger);

    ledger.fail_mint_at(1, RejectCode::InsufficientReserve);
    let err = queue.submit(mint(&issuer)).await.unwrap_err();
    assert_eq!(err.reject_code(), Some(&RejectCode::InsufficientReserve));
}

#[tokio::test]
async fn account_without_wallet_cannot_submit() {
    let ledger = Arc::new(NullLedger::new());
    let stranger = admit_crypto::derive_address(&admit_crypto::keypair_from_seed(&[9u8; 32]).public);
    let queue = queue_for(&ledger);

    let err = queue.submit(mint(&stranger)).await.unwrap_err();
    assert!(matches!(err, LedgerError::NoSigningCapability(_)));
}

#[tokio::test]
async fn cleanup_forgets_idle_accounts() {
    let ledger = Arc::new(NullLedger::new());
    let a = ledger.create_account([1u8; 32]);
    let b = ledger.create_account([2u8; 32]);
    let queue = queue_for(&ledger);

    queue.submit(mint(&a)).await.unwrap();
    queue.submit(mint(&b)).await.unwrap();
    assert_eq!(queue.active_accounts().await, 2);
    queue.cleanup().await;
    assert_eq!(queue.active_accounts().await, 0);
}
