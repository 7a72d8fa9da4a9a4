//! Fundamental types for admission tokens.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account addresses, account ids, transaction hashes, keys and signatures,
//! timestamps and clocks, and the validated event descriptor bound into tokens.

pub mod account;
pub mod address;
pub mod error;
pub mod event;
pub mod hash;
pub mod keys;
pub mod time;

pub use account::AccountId;
pub use address::Address;
pub use error::AdmitError;
pub use event::{EventBuilder, EventDescriptor, EventId, RawEvent};
pub use hash::TxHash;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use time::{Clock, SystemClock, Timestamp};
