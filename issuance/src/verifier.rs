//! Proof that an account holds a token.
//!
//! The holder signs a challenge derived from their account and the token
//! identity. The challenge carries both, so a signature cannot be replayed
//! for another token or by another account.

use std::sync::Arc;

use admit_codec::TokenId;
use admit_crypto::{decode_address, sign_message, SignatureVerifier};
use admit_ledger::LedgerClient;
use admit_types::{Address, KeyPair, Signature};
use tracing::{debug, Instrument};

use crate::finality::bounded;
use crate::{spans, IssuanceConfig, IssuanceError};

const CHALLENGE_DOMAIN: &str = "admit-ownership-challenge-v1";

/// The exact bytes a holder signs to prove control of `account` for `token`.
pub fn challenge_message(account: &Address, token: &TokenId) -> Vec<u8> {
    format!("{CHALLENGE_DOMAIN}\naccount:{account}\ntoken:{token}").into_bytes()
}

/// Sign the challenge for (`account`, `token`) with a locally held key.
pub fn sign_challenge(keys: &KeyPair, account: &Address, token: &TokenId) -> Signature {
    sign_message(&challenge_message(account, token), &keys.private)
}

pub struct Verifier {
    ledger: Arc<dyn LedgerClient>,
    signatures: Arc<dyn SignatureVerifier>,
    config: Arc<IssuanceConfig>,
}

impl Verifier {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        signatures: Arc<dyn SignatureVerifier>,
        config: Arc<IssuanceConfig>,
    ) -> Self {
        Self {
            ledger,
            signatures,
            config,
        }
    }

    /// Check a hex-encoded signature over the challenge for (`account`, `token`).
    ///
    /// A malformed signature is an error and costs no ledger call. A
    /// well-formed signature that does not prove ownership is `Ok(false)`.
    pub async fn verify(
        &self,
        account: &Address,
        token: &TokenId,
        signature: &str,
    ) -> Result<bool, IssuanceError> {
        let signature = Signature::from_hex(signature)?;
        self.verify_signature(account, token, &signature).await
    }

    /// [`verify`](Self::verify) for an already decoded signature.
    pub async fn verify_signature(
        &self,
        account: &Address,
        token: &TokenId,
        signature: &Signature,
    ) -> Result<bool, IssuanceError> {
        async {
            let owner = bounded(
                self.config.query_timeout(),
                self.ledger.query_token_owner(token),
            )
            .await?;
            if owner.as_ref() != Some(account) {
                debug!(owner = ?owner.as_ref().map(Address::as_str), "not the owner");
                return Ok(false);
            }

            let Some(public_key) = decode_address(account.as_str()) else {
                debug!("address does not carry a valid key");
                return Ok(false);
            };
            let valid = self.signatures.verify(
                &challenge_message(account, token),
                signature,
                &public_key,
            );
            debug!(valid, "signature checked");
            Ok(valid)
        }
        .instrument(spans::verify_span(account, token))
        .await
    }
}
