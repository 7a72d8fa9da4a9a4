//! The token identity itself and its layout.

use admit_types::{AccountId, EventId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;
use crate::flags::TokenFlags;
use crate::taxon::{cipher_taxon, Taxon};

/// Byte length of a token identity.
pub const TOKEN_ID_LEN: usize = 32;
/// Hex length of a token identity.
pub const TOKEN_ID_HEX_LEN: usize = TOKEN_ID_LEN * 2;
/// Highest transfer fee, in hundredths of a basis point (50%).
pub const MAX_TRANSFER_FEE: u16 = 50_000;

const FLAGS: std::ops::Range<usize> = 0..2;
const FEE: std::ops::Range<usize> = 2..4;
const ISSUER: std::ops::Range<usize> = 4..24;
const TAXON: std::ops::Range<usize> = 24..28;
const SEQUENCE: std::ops::Range<usize> = 28..32;

/// Opaque, ledger-assigned token identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenId([u8; TOKEN_ID_LEN]);

impl TokenId {
    pub fn from_bytes(bytes: [u8; TOKEN_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TOKEN_ID_LEN] {
        &self.0
    }

    /// Decode the fields packed into this identity.
    pub fn decode(&self) -> DecodedToken {
        decode(self)
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", hex::encode_upper(&self.0[SEQUENCE]))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

impl FromStr for TokenId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != TOKEN_ID_HEX_LEN {
            return Err(CodecError::MalformedIdentity(format!(
                "expected {TOKEN_ID_HEX_LEN} hex characters, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; TOKEN_ID_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| CodecError::MalformedIdentity(format!("{s}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for TokenId {
    type Error = CodecError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TokenId> for String {
    fn from(id: TokenId) -> Self {
        id.to_string()
    }
}

/// The fields packed into a [`TokenId`], with the taxon deciphered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecodedToken {
    pub flags: TokenFlags,
    pub transfer_fee: u16,
    pub issuer: AccountId,
    pub taxon: Taxon,
    pub sequence: u32,
}

/// Pack token fields into an identity, ciphering the taxon with the sequence.
///
/// This is how the ledger assigns identities; the core only calls it through
/// test doubles and tooling.
pub fn compose(parts: &DecodedToken) -> Result<TokenId, CodecError> {
    if parts.transfer_fee > MAX_TRANSFER_FEE {
        return Err(CodecError::TransferFeeTooHigh(parts.transfer_fee));
    }
    let mut bytes = [0u8; TOKEN_ID_LEN];
    bytes[FLAGS].copy_from_slice(&parts.flags.bits().to_be_bytes());
    bytes[FEE].copy_from_slice(&parts.transfer_fee.to_be_bytes());
    bytes[ISSUER].copy_from_slice(parts.issuer.as_bytes());
    let ciphered = cipher_taxon(parts.taxon.as_u32(), parts.sequence);
    bytes[TAXON].copy_from_slice(&ciphered.to_be_bytes());
    bytes[SEQUENCE].copy_from_slice(&parts.sequence.to_be_bytes());
    Ok(TokenId(bytes))
}

fn field<const N: usize>(id: &TokenId, range: std::ops::Range<usize>) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&id.0[range]);
    out
}

/// Unpack a token identity.
pub fn decode(id: &TokenId) -> DecodedToken {
    let sequence = u32::from_be_bytes(field(id, SEQUENCE));
    let ciphered = u32::from_be_bytes(field(id, TAXON));
    DecodedToken {
        flags: TokenFlags::from_bits(u16::from_be_bytes(field(id, FLAGS))),
        transfer_fee: u16::from_be_bytes(field(id, FEE)),
        issuer: AccountId::new(field(id, ISSUER)),
        taxon: Taxon::new(cipher_taxon(ciphered, sequence)),
        sequence,
    }
}

/// Parse and unpack a hex token identity.
pub fn decode_str(s: &str) -> Result<DecodedToken, CodecError> {
    Ok(decode(&s.parse()?))
}

/// Whether a token was minted for the given event.
pub fn matches_event(id: &TokenId, event: EventId) -> bool {
    decode(id).taxon == Taxon::from(event)
}
