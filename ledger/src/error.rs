use admit_transactions::TransactionError;
use thiserror::Error;

use crate::client::RejectCode;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger unreachable: {0}")]
    Transport(String),

    #[error("ledger request timed out")]
    Timeout,

    #[error("transaction rejected ({code}): {message}")]
    Rejected { code: RejectCode, message: String },

    #[error("sequence {submitted} is stale for {account}, ledger expects {expected}")]
    StaleSequence {
        account: String,
        submitted: u32,
        expected: u32,
    },

    #[error("no signing capability for {0}")]
    NoSigningCapability(String),

    #[error("invalid transaction: {0}")]
    Transaction(#[from] TransactionError),
}

impl LedgerError {
    /// Transport-level failures where the request may not have reached the
    /// ledger. Anything else is a definite answer.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }

    /// The rejection code, if the ledger rejected the transaction outright.
    pub fn reject_code(&self) -> Option<&RejectCode> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}
