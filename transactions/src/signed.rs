//! Signing and hashing of transactions.

use admit_crypto::{blake2b_256_multi, sign_message, verify_signature};
use admit_types::{KeyPair, PublicKey, Signature, TxHash};
use serde::{Deserialize, Serialize};

use crate::error::TransactionError;
use crate::Transaction;

/// Domain separator so transaction signatures can never double as challenge
/// signatures or anything else signed with the same key.
const TX_DOMAIN: &[u8] = b"admit-tx-v1";

/// A transaction with its signature and hash, ready to submit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: Transaction,
    pub signing_key: PublicKey,
    pub signature: Signature,
    pub hash: TxHash,
}

/// The exact bytes an account signs for a transaction.
pub fn signing_payload(tx: &Transaction) -> Result<Vec<u8>, TransactionError> {
    let body = bincode::serialize(tx).map_err(|e| TransactionError::Serialization(e.to_string()))?;
    let mut payload = Vec::with_capacity(TX_DOMAIN.len() + body.len());
    payload.extend_from_slice(TX_DOMAIN);
    payload.extend_from_slice(&body);
    Ok(payload)
}

/// Sign a transaction with a locally held key pair.
pub fn sign_transaction(tx: Transaction, keys: &KeyPair) -> Result<SignedTransaction, TransactionError> {
    let payload = signing_payload(&tx)?;
    let signature = sign_message(&payload, &keys.private);
    SignedTransaction::from_parts(tx, keys.public.clone(), signature)
}

impl SignedTransaction {
    /// Assemble a signed transaction from a signature produced elsewhere
    /// (e.g. by a collaborator holding the account's key).
    pub fn from_parts(
        tx: Transaction,
        signing_key: PublicKey,
        signature: Signature,
    ) -> Result<Self, TransactionError> {
        let payload = signing_payload(&tx)?;
        let hash = TxHash::new(blake2b_256_multi(&[&payload, signature.as_bytes()]));
        Ok(Self {
            tx,
            signing_key,
            signature,
            hash,
        })
    }

    /// Check the signature over the transaction body.
    pub fn has_valid_signature(&self) -> bool {
        match signing_payload(&self.tx) {
            Ok(payload) => verify_signature(&payload, &self.signature, &self.signing_key),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AcceptOfferTx;
    use crate::OfferId;
    use admit_crypto::{derive_address, keypair_from_seed};

    fn accept(keys: &KeyPair) -> Transaction {
        Transaction::AcceptOffer(AcceptOfferTx {
            account: derive_address(&keys.public),
            sequence: 3,
            offer_id: OfferId::new([9u8; 32]),
        })
    }

    #[test]
    fn signed_transaction_verifies() {
        let keys = keypair_from_seed(&[1u8; 32]);
        let signed = sign_transaction(accept(&keys), &keys).unwrap();
        assert!(signed.has_valid_signature());
        assert!(!signed.hash.is_zero());
    }

    #[test]
    fn tampered_body_fails() {
        let keys = keypair_from_seed(&[1u8; 32]);
        let mut signed = sign_transaction(accept(&keys), &keys).unwrap();
        signed.tx = signed.tx.with_sequence(4);
        assert!(!signed.has_valid_signature());
    }

    #[test]
    fn hash_changes_with_sequence() {
        let keys = keypair_from_seed(&[1u8; 32]);
        let a = sign_transaction(accept(&keys), &keys).unwrap();
        let b = sign_transaction(accept(&keys).with_sequence(4), &keys).unwrap();
        assert_ne!(a.hash, b.hash);
    }
}
