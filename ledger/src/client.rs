//! The async ledger client trait and its result types.

use std::fmt;
use std::time::Duration;

use admit_codec::TokenId;
use admit_transactions::{OfferId, SignedTransaction};
use admit_types::{Address, Signature, TxHash};
use async_trait::async_trait;

use crate::error::LedgerError;

/// Ledger acknowledgement of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub hash: TxHash,
    /// Ledger index the transaction was provisionally applied to.
    pub ledger_index: u64,
}

/// Side effects of a validated transaction that the core cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxEffects {
    /// Identity assigned by a mint.
    pub minted: Option<TokenId>,
    /// Offer created by a create-offer.
    pub offer: Option<OfferId>,
}

/// Why the ledger refused a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectCode {
    InsufficientReserve,
    Malformed,
    NoPermission,
    TokenNotFound,
    NotOwner,
    NotTransferable,
    OfferNotFound,
    OfferExpired,
    WrongDestination,
    Other(String),
}

impl RejectCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::InsufficientReserve => "insufficient_reserve",
            Self::Malformed => "malformed",
            Self::NoPermission => "no_permission",
            Self::TokenNotFound => "token_not_found",
            Self::NotOwner => "not_owner",
            Self::NotTransferable => "not_transferable",
            Self::OfferNotFound => "offer_not_found",
            Self::OfferExpired => "offer_expired",
            Self::WrongDestination => "wrong_destination",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for RejectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of waiting for a transaction to become final.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinalityResult {
    /// Final and applied.
    Validated { ledger_index: u64, effects: TxEffects },
    /// Final and not applied.
    Failed { code: RejectCode },
    /// Not final within the wait; the outcome is unknown.
    Pending,
}

/// What the issuance core consumes from the ledger.
///
/// Every method is a suspension point. Implementations must be usable from
/// several tasks at once; the core serializes same-account submissions
/// itself through [`crate::SubmissionQueue`].
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn submit_transaction(&self, tx: &SignedTransaction) -> Result<SubmitReceipt, LedgerError>;

    /// Wait at most `timeout` for `hash` to become final.
    async fn wait_for_finality(
        &self,
        hash: &TxHash,
        timeout: Duration,
    ) -> Result<FinalityResult, LedgerError>;

    async fn query_account_tokens(&self, account: &Address) -> Result<Vec<TokenId>, LedgerError>;

    /// Current owner, or `None` if the token does not exist (or was burned).
    async fn query_token_owner(&self, token: &TokenId) -> Result<Option<Address>, LedgerError>;

    /// Every token ever minted by `issuer`, in mint order.
    async fn query_issued_tokens(&self, issuer: &Address) -> Result<Vec<TokenId>, LedgerError>;

    /// Next sequence number the ledger will accept from `account`.
    async fn account_sequence(&self, account: &Address) -> Result<u32, LedgerError>;

    /// Have the wallet holding `account`'s key sign `message`.
    async fn sign_message(&self, account: &Address, message: &[u8]) -> Result<Signature, LedgerError>;
}
