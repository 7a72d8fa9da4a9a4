//! Offer/accept handshake transactions for ownership transfer.

use admit_codec::TokenId;
use admit_crypto::blake2b_256_multi;
use admit_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger identifier of a standing offer.
///
/// Derived from the offering account and the sequence of the transaction
/// that created it, so both sides can compute it without a ledger query.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OfferId([u8; 32]);

impl OfferId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn derive(owner: &Address, sequence: u32) -> Self {
        Self(blake2b_256_multi(&[
            b"admit-offer",
            owner.as_str().as_bytes(),
            &sequence.to_be_bytes(),
        ]))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OfferId({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

/// Current owner offers a token to exactly one destination, free of charge,
/// until `expiration`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOfferTx {
    pub account: Address,
    pub sequence: u32,
    pub token_id: TokenId,
    pub destination: Address,
    pub expiration: Timestamp,
}

impl CreateOfferTx {
    /// The id the ledger will assign to the offer this transaction creates.
    pub fn offer_id(&self) -> OfferId {
        OfferId::derive(&self.account, self.sequence)
    }
}

/// Destination accepts a standing offer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptOfferTx {
    pub account: Address,
    pub sequence: u32,
    pub offer_id: OfferId,
}
