//! Waiting for transactions to settle, and bounding ledger reads.

use std::future::Future;
use std::time::Duration;

use admit_ledger::{CancelToken, FinalityResult, LedgerClient, LedgerError, RejectCode, TxEffects};
use admit_types::TxHash;
use admit_utils::format_duration;
use tracing::warn;

use crate::IssuanceError;

/// Final outcome of a submitted transaction.
#[derive(Debug)]
pub enum Settled {
    Applied(TxEffects),
    Refused(RejectCode),
}

/// Wait up to `timeout` for `hash` to become final.
///
/// Cancelling stops the wait only; whatever the ledger does with the
/// transaction still happens.
pub async fn settle(
    ledger: &dyn LedgerClient,
    hash: &TxHash,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<Settled, IssuanceError> {
    let result = tokio::select! {
        result = ledger.wait_for_finality(hash, timeout) => result?,
        _ = cancel.cancelled() => return Err(IssuanceError::Cancelled { hash: *hash }),
    };
    match result {
        FinalityResult::Validated { effects, .. } => Ok(Settled::Applied(effects)),
        FinalityResult::Failed { code } => Ok(Settled::Refused(code)),
        FinalityResult::Pending => {
            warn!(hash = %hash, waited = %format_duration(timeout), "finality not observed");
            Err(IssuanceError::FinalityTimeout {
                hash: *hash,
                waited: timeout,
            })
        }
    }
}

/// Run a ledger read with an upper bound on its duration.
pub async fn bounded<T>(
    limit: Duration,
    query: impl Future<Output = Result<T, LedgerError>>,
) -> Result<T, LedgerError> {
    tokio::time::timeout(limit, query)
        .await
        .map_err(|_| LedgerError::Timeout)?
}
