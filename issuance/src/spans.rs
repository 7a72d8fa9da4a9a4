//! Pre-built [`tracing::Span`] constructors for issuance operations.
//!
//! Consistent span names and field sets make it easy to filter and
//! correlate one token's journey across mint, claim and verify.

use admit_codec::TokenId;
use admit_types::{Address, EventId};
use tracing::{info_span, Span};

/// Span covering a single mint, including any chained transfer.
pub fn mint_span(event: EventId) -> Span {
    info_span!("mint", event = %event)
}

/// Span covering a bulk mint.
pub fn bulk_mint_span(event: EventId, quantity: u32) -> Span {
    info_span!("bulk_mint", event = %event, quantity)
}

/// Span covering an ownership transfer.
pub fn claim_span(token: &TokenId, to: &Address) -> Span {
    info_span!("claim", token = %token, to = %to)
}

pub fn verify_span(account: &Address, token: &TokenId) -> Span {
    info_span!("verify", account = %account, token = %token)
}

pub fn lookup_span(event: EventId) -> Span {
    info_span!("lookup", event = %event)
}
