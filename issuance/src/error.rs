use std::time::Duration;

use admit_codec::{CodecError, TokenId};
use admit_ledger::{LedgerError, RejectCode};
use admit_types::{AdmitError, EventId, TxHash};
use thiserror::Error;

use crate::claim::OwnershipRecord;

/// Whether a failed operation may still have changed the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxEffect {
    /// Nothing was applied; retrying is safe.
    NotApplied,
    /// The transaction may or may not have landed. Re-query before retrying.
    Unknown,
    /// Part of the operation landed; the error names what is left over.
    Applied,
}

#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("ledger rejected the transaction ({code}): {message}")]
    Submission { code: RejectCode, message: String },

    #[error("transaction {hash} not final after {waited:?}")]
    FinalityTimeout { hash: TxHash, waited: Duration },

    #[error("token {0} not found")]
    TokenNotFound(TokenId),

    #[error("token {} is already owned by {}", .0.token, .0.owner)]
    AlreadyOwned(OwnershipRecord),

    #[error("offer for token {token} expired ({attempts} attempts)")]
    OfferExpired { token: TokenId, attempts: u32 },

    #[error("transfer of token {token} rejected ({code})")]
    TransferRejected { token: TokenId, code: RejectCode },

    #[error("malformed signature: {0}")]
    InvalidSignatureFormat(String),

    #[error("event {0} is private")]
    AccessDenied(EventId),

    #[error("malformed token identity: {0}")]
    MalformedIdentity(String),

    #[error("event {event} has issued {issued} of {quantity} tokens, {requested} more requested")]
    BudgetExhausted {
        event: EventId,
        issued: u32,
        quantity: u32,
        requested: u32,
    },

    #[error("token {token} minted but not transferred: {source}")]
    MintedNotTransferred {
        token: TokenId,
        source: Box<IssuanceError>,
    },

    #[error("wait for transaction {hash} cancelled")]
    Cancelled { hash: TxHash },

    #[error("config error: {0}")]
    Config(String),

    #[error("ledger error: {0}")]
    Ledger(LedgerError),
}

impl IssuanceError {
    pub fn effect(&self) -> TxEffect {
        match self {
            Self::MintedNotTransferred { .. } => TxEffect::Applied,
            Self::FinalityTimeout { .. } | Self::Cancelled { .. } => TxEffect::Unknown,
            Self::Ledger(e) if e.is_transient() => TxEffect::Unknown,
            _ => TxEffect::NotApplied,
        }
    }

    /// The token left behind when a mint landed but its hand-over did not.
    pub fn minted_token(&self) -> Option<&TokenId> {
        match self {
            Self::MintedNotTransferred { token, .. } => Some(token),
            _ => None,
        }
    }

    /// `AlreadyOwned` is informational: the caller's goal already holds.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AlreadyOwned(_))
    }
}

impl From<LedgerError> for IssuanceError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Rejected { code, message } => Self::Submission { code, message },
            LedgerError::Transaction(e) => Self::Validation(e.to_string()),
            other => Self::Ledger(other),
        }
    }
}

impl From<CodecError> for IssuanceError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::MalformedIdentity(msg) => Self::MalformedIdentity(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<AdmitError> for IssuanceError {
    fn from(e: AdmitError) -> Self {
        match e {
            AdmitError::MalformedSignature(msg) => Self::InvalidSignatureFormat(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}
