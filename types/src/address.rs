//! Account address type with `adm_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AdmitError;

/// A ledger account address, always prefixed with `adm_`.
///
/// Encodes the account's Ed25519 public key plus a Blake2b checksum in
/// base32. Use `admit_crypto::derive_address` to build one from a key and
/// `admit_crypto::decode_address` to recover the key and check the checksum.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// The standard prefix for all account addresses.
    pub const PREFIX: &'static str = "adm_";

    /// Length of the encoded part after the prefix: 52 key chars + 8 checksum chars.
    pub const ENCODED_LEN: usize = 60;

    /// Parse an address string, checking prefix, length and alphabet.
    ///
    /// The checksum is not verified here; that needs the hash function from
    /// `admit-crypto`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, AdmitError> {
        let s = raw.into();
        let Some(encoded) = s.strip_prefix(Self::PREFIX) else {
            return Err(AdmitError::InvalidAddress(format!(
                "{s}: missing {} prefix",
                Self::PREFIX
            )));
        };
        if encoded.len() != Self::ENCODED_LEN {
            return Err(AdmitError::InvalidAddress(format!(
                "{s}: expected {} characters after prefix, got {}",
                Self::ENCODED_LEN,
                encoded.len()
            )));
        }
        if !encoded
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
        {
            return Err(AdmitError::InvalidAddress(format!(
                "{s}: contains characters outside the address alphabet"
            )));
        }
        Ok(Self(s))
    }

    /// Build an address from a string that is already known to be well formed.
    pub(crate) fn from_trusted(raw: String) -> Self {
        Self(raw)
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The encoded part after the prefix.
    pub fn encoded(&self) -> &str {
        &self.0[Self::PREFIX.len()..]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = AdmitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AdmitError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Construct an address from a pre-encoded string, bypassing validation.
///
/// Only `admit-crypto` address derivation should need this.
#[doc(hidden)]
pub fn address_from_encoded(encoded: String) -> Address {
    Address::from_trusted(format!("{}{}", Address::PREFIX, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sixty(c: char) -> String {
        std::iter::repeat(c).take(Address::ENCODED_LEN).collect()
    }

    #[test]
    fn parse_accepts_well_formed() {
        let raw = format!("adm_{}", sixty('3'));
        let addr = Address::parse(raw.clone()).unwrap();
        assert_eq!(addr.as_str(), raw);
        assert_eq!(addr.encoded().len(), Address::ENCODED_LEN);
    }

    #[test]
    fn parse_rejects_wrong_prefix() {
        let raw = format!("brst_{}", sixty('3'));
        assert!(matches!(
            Address::parse(raw),
            Err(AdmitError::InvalidAddress(_))
        ));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(Address::parse("adm_short").is_err());
        assert!(Address::parse("adm_").is_err());
    }

    #[test]
    fn parse_rejects_uppercase() {
        let raw = format!("adm_{}", sixty('A'));
        assert!(Address::parse(raw).is_err());
    }

    #[test]
    fn serde_rejects_malformed() {
        let json = "\"adm_nope\"";
        assert!(serde_json::from_str::<Address>(json).is_err());
    }
}
