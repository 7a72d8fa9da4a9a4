//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the issuance core (clock, ledger, signature
//! verification) sits behind a trait. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including fault injection
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod ledger;
pub mod verifier;

pub use clock::NullClock;
pub use ledger::NullLedger;
pub use verifier::CountingVerifier;
