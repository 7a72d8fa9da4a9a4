//! Ledger collaborator contract.
//!
//! The ledger itself (consensus, finality, fees) lives outside this
//! workspace. This crate defines what the issuance core needs from it:
//! submit a signed transaction, query token and account state, wait for
//! finality and have an account sign a message. On top of that contract sit
//! the [`SubmissionQueue`], which owns each account's sequence counter, and
//! a [`Cancellation`] handle for abandoning finality waits.

pub mod cancel;
pub mod client;
pub mod error;
pub mod queue;

pub use cancel::{CancelToken, Cancellation};
pub use client::{FinalityResult, LedgerClient, RejectCode, SubmitReceipt, TxEffects};
pub use error::LedgerError;
pub use queue::{SubmissionQueue, Submitted};
