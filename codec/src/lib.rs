//! Token identity codec.
//!
//! A token identity is a 32-byte value, written as 64 uppercase hex characters:
//!
//! ```text
//! | flags (2) | transfer fee (2) | issuer account id (20) | ciphered taxon (4) | sequence (4) |
//! ```
//!
//! All integers are big-endian. The taxon is stored XOR-ed with a value
//! derived from the sequence, so tokens of the same event do not share a
//! visible byte pattern; [`decode`] reverses it. Everything here is pure: no
//! ledger access is needed to recover issuer, taxon and sequence.

pub mod error;
pub mod flags;
pub mod taxon;
pub mod token_id;

pub use error::CodecError;
pub use flags::TokenFlags;
pub use taxon::{cipher_taxon, encode, Taxon};
pub use token_id::{compose, decode, decode_str, matches_event, DecodedToken, TokenId};
