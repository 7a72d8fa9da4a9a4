//! Cryptographic primitives for admission tokens.
//!
//! - **Ed25519** for signing and signature verification
//! - **Blake2b** for hashing (transaction hashes, account ids, metadata digests)
//! - Address derivation with `adm_` prefix and base32 encoding

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{account_id_of, decode_address, derive_address, validate_address};
pub use hash::{account_id_from_public, blake2b_256, blake2b_256_multi};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature, Ed25519Verifier, SignatureVerifier};
