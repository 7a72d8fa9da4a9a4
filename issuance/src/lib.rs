//! Admission-token lifecycle core.
//!
//! - [`Minter`]: issue one or many tokens for an event.
//! - [`ClaimCoordinator`]: move a token to a holder through the ledger's
//!   offer/accept handshake.
//! - [`Verifier`]: check that an account both owns a token and can sign the
//!   token's challenge.
//! - [`LookupService`]: list the accounts holding an event's tokens.
//!
//! All four read and write through an [`admit_ledger::LedgerClient`] and
//! never cache ledger state. [`Issuer`] wires them together for one issuing
//! account.

pub mod claim;
pub mod config;
pub mod error;
pub mod finality;
pub mod lookup;
pub mod minter;
pub mod service;
pub mod spans;
pub mod verifier;

pub use claim::{ClaimCoordinator, OwnershipRecord};
pub use config::IssuanceConfig;
pub use error::{IssuanceError, TxEffect};
pub use lookup::{IssuerCapability, LookupService};
pub use minter::{BulkFailure, BulkMint, Minter};
pub use service::Issuer;
pub use verifier::{challenge_message, sign_challenge, Verifier};
