//! Blake2b-256, used for account ids, metadata digests, offer ids and
//! transaction hashes.

use admit_types::{AccountId, PublicKey};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Digest of several byte strings fed in order, as if concatenated.
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let digest = parts
        .iter()
        .fold(Blake2b256::new(), |hasher, part| hasher.chain_update(part))
        .finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// The account id embedded in token identities: the first 20 bytes of the
/// key's digest.
pub fn account_id_from_public(public_key: &PublicKey) -> AccountId {
    let digest = blake2b_256(public_key.as_bytes());
    let mut id = [0u8; AccountId::LEN];
    id.copy_from_slice(&digest[..AccountId::LEN]);
    AccountId::new(id)
}
