use std::collections::HashMap;
use std::sync::Arc;

use admit_crypto::decode_address;
use admit_transactions::{signing_payload, validate_transaction, SignedTransaction, Transaction};
use admit_types::{Address, Clock};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::client::{LedgerClient, SubmitReceipt};
use crate::error::LedgerError;

/// Per-account submission queue.
///
/// Owns each account's next sequence number. Submissions from one account
/// are serialized and reach the ledger in call order; submissions from
/// different accounts run in parallel. The lock covers sign and submit only,
/// so finality waits never block the next submission.
pub struct SubmissionQueue {
    client: Arc<dyn LedgerClient>,
    clock: Arc<dyn Clock>,
    accounts: Mutex<HashMap<Address, Arc<Mutex<AccountSequence>>>>,
}

/// Cached sequence state. `None` means reload from the ledger before use.
#[derive(Debug, Default)]
struct AccountSequence {
    next: Option<u32>,
}

/// A transaction the ledger accepted for processing.
#[derive(Clone, Debug)]
pub struct Submitted {
    /// The transaction as signed, with the sequence the queue assigned.
    pub signed: SignedTransaction,
    pub receipt: SubmitReceipt,
}

impl SubmissionQueue {
    pub fn new(client: Arc<dyn LedgerClient>, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            clock,
            accounts: Mutex::new(HashMap::new()),
        }
    }

    async fn account_lock(&self, account: &Address) -> Arc<Mutex<AccountSequence>> {
        let mut accounts = self.accounts.lock().await;
        accounts
            .entry(account.clone())
            .or_insert_with(|| Arc::new(Mutex::new(AccountSequence::default())))
            .clone()
    }

    /// Assign the account's next sequence, have the account sign, check the
    /// result locally and submit.
    ///
    /// The sequence in `tx` is overwritten. A stale-sequence rejection
    /// reloads the sequence from the ledger and retries once. Any other
    /// failure drops the cached sequence so the next call starts from
    /// ledger state.
    pub async fn submit(&self, tx: Transaction) -> Result<Submitted, LedgerError> {
        let account = tx.account().clone();
        let lock = self.account_lock(&account).await;
        let mut state = lock.lock().await;
        let mut resynced = false;

        loop {
            let sequence = match state.next {
                Some(sequence) => sequence,
                None => self.client.account_sequence(&account).await?,
            };
            let signed = match self.sign(tx.clone().with_sequence(sequence)).await {
                Ok(signed) => signed,
                Err(e) => {
                    state.next = None;
                    return Err(e);
                }
            };

            match self.client.submit_transaction(&signed).await {
                Ok(receipt) => {
                    debug!(
                        account = %account,
                        sequence,
                        kind = signed.tx.kind(),
                        hash = %receipt.hash,
                        "transaction submitted"
                    );
                    state.next = Some(sequence.wrapping_add(1));
                    return Ok(Submitted { signed, receipt });
                }
                Err(LedgerError::StaleSequence { expected, .. }) if !resynced => {
                    warn!(
                        account = %account,
                        submitted = sequence,
                        expected,
                        "stale sequence, resyncing"
                    );
                    state.next = None;
                    resynced = true;
                }
                Err(e) => {
                    state.next = None;
                    return Err(e);
                }
            }
        }
    }

    async fn sign(&self, tx: Transaction) -> Result<SignedTransaction, LedgerError> {
        let account = tx.account().clone();
        let signing_key = decode_address(account.as_str())
            .ok_or_else(|| LedgerError::NoSigningCapability(account.to_string()))?;
        let payload = signing_payload(&tx)?;
        let signature = self.client.sign_message(&account, &payload).await?;
        let signed = SignedTransaction::from_parts(tx, signing_key, signature)?;
        validate_transaction(&signed, self.clock.now())?;
        Ok(signed)
    }

    /// The cached next sequence for `account`, if any.
    pub async fn cached_sequence(&self, account: &Address) -> Option<u32> {
        let lock = self.account_lock(account).await;
        let state = lock.lock().await;
        state.next
    }

    /// Number of accounts with queue state.
    pub async fn active_accounts(&self) -> usize {
        self.accounts.lock().await.len()
    }

    /// Drop state for accounts nobody is submitting from.
    pub async fn cleanup(&self) {
        let mut accounts = self.accounts.lock().await;
        accounts.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}
