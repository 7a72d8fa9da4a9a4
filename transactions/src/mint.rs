//! Mint transaction: issue a new token bound to event metadata.

use admit_codec::{Taxon, TokenFlags};
use admit_types::Address;
use serde::{Deserialize, Serialize};

/// Ledger URI fields hold at most 256 bytes.
pub const MAX_URI_BYTES: usize = 256;
/// Memo payloads are capped so a mint stays a single small transaction.
pub const MAX_MEMO_BYTES: usize = 4096;

/// A token mint transaction.
///
/// The content URI travels hex-encoded, matching ledger URI fields. The memo
/// carries the canonical event JSON and `metadata_digest` is its Blake2b-256
/// hash, so anyone holding the token can check the metadata it was minted with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintTx {
    /// Issuer submitting the mint; also the initial owner.
    pub account: Address,
    pub sequence: u32,
    pub taxon: Taxon,
    pub flags: TokenFlags,
    /// Transfer fee in hundredths of a basis point.
    pub transfer_fee: u16,
    /// Hex-encoded content URI.
    pub uri: Option<String>,
    pub metadata_digest: [u8; 32],
    pub memo: Option<String>,
}

impl MintTx {
    /// Hex-encode a URI for the `uri` field.
    pub fn encode_uri(uri: &str) -> String {
        hex::encode_upper(uri.as_bytes())
    }

    /// Decode the `uri` field back to text, if present and valid UTF-8.
    pub fn decoded_uri(&self) -> Option<String> {
        let bytes = hex::decode(self.uri.as_ref()?).ok()?;
        String::from_utf8(bytes).ok()
    }
}
