//! `adm_` account addresses.
//!
//! An address is `adm_`, then the 32-byte public key in base32 (52 chars),
//! then a 5-byte Blake2b checksum of the key in base32 (8 chars). The
//! alphabet leaves out characters that are easy to misread (`0`, `2`, `l`,
//! `v`), so every address is lowercase ASCII.

use admit_types::address::address_from_encoded;
use admit_types::{AccountId, Address, PublicKey};

const ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";
const KEY_CHARS: usize = 52;
const CHECKSUM_LEN: usize = 5;

fn symbol_value(c: u8) -> Option<u8> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u8)
}

/// Base32 with the address alphabet, most significant bits first. The tail
/// is zero-padded to a whole symbol.
fn to_base32(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut acc: u16 = 0;
    let mut pending = 0u32;
    for &byte in bytes {
        acc = (acc << 8) | u16::from(byte);
        pending += 8;
        while pending >= 5 {
            pending -= 5;
            out.push(ALPHABET[usize::from((acc >> pending) & 0x1F)] as char);
        }
        acc &= (1 << pending) - 1;
    }
    if pending > 0 {
        out.push(ALPHABET[usize::from((acc << (5 - pending)) & 0x1F)] as char);
    }
    out
}

/// Inverse of [`to_base32`] for exactly `N` bytes. Padding bits are ignored.
fn from_base32<const N: usize>(text: &str) -> Option<[u8; N]> {
    if text.len() != (N * 8).div_ceil(5) {
        return None;
    }
    let mut out = [0u8; N];
    let mut filled = 0;
    let mut acc: u16 = 0;
    let mut pending = 0u32;
    for c in text.bytes() {
        acc = (acc << 5) | u16::from(symbol_value(c)?);
        pending += 5;
        if pending >= 8 {
            pending -= 8;
            if filled < N {
                out[filled] = (acc >> pending) as u8;
                filled += 1;
            }
        }
        acc &= (1 << pending) - 1;
    }
    Some(out)
}

fn checksum(key: &[u8; 32]) -> [u8; CHECKSUM_LEN] {
    let mut sum = [0u8; CHECKSUM_LEN];
    sum.copy_from_slice(&crate::blake2b_256(key)[..CHECKSUM_LEN]);
    sum
}

pub fn derive_address(public_key: &PublicKey) -> Address {
    let mut encoded = to_base32(public_key.as_bytes());
    encoded.push_str(&to_base32(&checksum(public_key.as_bytes())));
    address_from_encoded(encoded)
}

/// Recover the public key behind an address.
///
/// `None` for anything that is not a well-formed address with a matching
/// checksum.
pub fn decode_address(address: &str) -> Option<PublicKey> {
    let body = address.strip_prefix(Address::PREFIX)?;
    if body.len() != Address::ENCODED_LEN || !body.is_ascii() {
        return None;
    }
    let (key_part, sum_part) = body.split_at(KEY_CHARS);
    let key: [u8; 32] = from_base32(key_part)?;
    let sum: [u8; CHECKSUM_LEN] = from_base32(sum_part)?;
    (sum == checksum(&key)).then_some(PublicKey(key))
}

pub fn validate_address(address: &str) -> bool {
    decode_address(address).is_some()
}

/// The issuer field a token minted by `address` carries.
pub fn account_id_of(address: &Address) -> Option<AccountId> {
    decode_address(address.as_str()).map(|key| crate::account_id_from_public(&key))
}
