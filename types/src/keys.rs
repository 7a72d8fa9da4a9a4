//! Ed25519 key and signature types.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::AdmitError;
use crate::hash::hex_array;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

/// An Ed25519 secret. Not `Clone`, `Debug` or `Serialize`; wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

/// A 64-byte Ed25519 signature.
///
/// Holders present signatures as hex text. Human-readable formats carry that
/// hex string; binary formats carry the raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

/// Plain data. Build one with `admit_crypto::generate_keypair` or
/// `admit_crypto::keypair_from_seed`.
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, AdmitError> {
        hex_array(s.trim())
            .map(Self)
            .ok_or_else(|| AdmitError::Serialization(format!("invalid public key hex: {s:?}")))
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl PrivateKey {
    /// The input is not echoed in the error.
    pub fn from_hex(s: &str) -> Result<Self, AdmitError> {
        hex_array(s.trim())
            .map(Self)
            .ok_or_else(|| AdmitError::Serialization("invalid private key hex".into()))
    }
}

impl Signature {
    pub const LEN: usize = 64;

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Decode a holder-supplied hex signature.
    ///
    /// Fails on non-hex input or a blob that is not exactly 64 bytes.
    pub fn from_hex(s: &str) -> Result<Self, AdmitError> {
        let bytes = hex::decode(s.trim()).map_err(|e| {
            AdmitError::MalformedSignature(format!("signature is not valid hexadecimal: {e}"))
        })?;
        Self::from_slice(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, AdmitError> {
        <[u8; 64]>::try_from(bytes).map(Self).map_err(|_| {
            AdmitError::MalformedSignature(format!(
                "expected {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

struct SignatureVisitor;

impl<'de> Visitor<'de> for SignatureVisitor {
    type Value = Signature;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a 64-byte signature as hex or bytes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Signature, E> {
        Signature::from_hex(v).map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Signature, E> {
        Signature::from_slice(v).map_err(|_| E::invalid_length(v.len(), &self))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Signature, A::Error> {
        let mut out = [0u8; 64];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        Ok(Signature(out))
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(SignatureVisitor)
        } else {
            deserializer.deserialize_bytes(SignatureVisitor)
        }
    }
}
