//! Admission-token transaction types and their validation logic.
//!
//! Transaction types:
//! - **Mint**: Issuer creates a token tagged with an event taxon
//! - **CreateOffer**: Current owner offers a token to a named destination, with expiry
//! - **AcceptOffer**: Destination accepts an offer, taking ownership
//!
//! Every transaction names the submitting account and that account's next
//! sequence number. The ledger applies transactions from one account strictly
//! in sequence order.

pub mod error;
pub mod mint;
pub mod offer;
pub mod signed;
pub mod validation;

pub use error::TransactionError;
pub use mint::MintTx;
pub use offer::{AcceptOfferTx, CreateOfferTx, OfferId};
pub use signed::{sign_transaction, signing_payload, SignedTransaction};
pub use validation::validate_transaction;

use admit_types::Address;
use serde::{Deserialize, Serialize};

/// The unified transaction enum wrapping all transaction types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Mint(MintTx),
    CreateOffer(CreateOfferTx),
    AcceptOffer(AcceptOfferTx),
}

impl Transaction {
    /// The submitting account.
    pub fn account(&self) -> &Address {
        match self {
            Self::Mint(tx) => &tx.account,
            Self::CreateOffer(tx) => &tx.account,
            Self::AcceptOffer(tx) => &tx.account,
        }
    }

    /// The submitting account's sequence number for this transaction.
    pub fn sequence(&self) -> u32 {
        match self {
            Self::Mint(tx) => tx.sequence,
            Self::CreateOffer(tx) => tx.sequence,
            Self::AcceptOffer(tx) => tx.sequence,
        }
    }

    /// Return a copy with the sequence number replaced.
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        match &mut self {
            Self::Mint(tx) => tx.sequence = sequence,
            Self::CreateOffer(tx) => tx.sequence = sequence,
            Self::AcceptOffer(tx) => tx.sequence = sequence,
        }
        self
    }

    /// The offer a create-offer transaction will open.
    pub fn created_offer(&self) -> Option<OfferId> {
        match self {
            Self::CreateOffer(tx) => Some(tx.offer_id()),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mint(_) => "mint",
            Self::CreateOffer(_) => "create_offer",
            Self::AcceptOffer(_) => "accept_offer",
        }
    }
}
