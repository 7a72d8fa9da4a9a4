//! Ed25519 signatures over ownership challenges and transactions.

use admit_types::{PrivateKey, PublicKey, Signature};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};

pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    Signature(SigningKey::from_bytes(&private_key.0).sign(message).to_bytes())
}

/// Strict Ed25519 check. Keys that are not valid curve points, small-order
/// keys and non-canonical signatures all fail.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    VerifyingKey::from_bytes(&public_key.0)
        .map(|key| {
            key.verify_strict(message, &ed25519_dalek::Signature::from_bytes(&signature.0))
                .is_ok()
        })
        .unwrap_or(false)
}

/// Signature checking as a component, so holder verification can be handed
/// a double that records whether it was consulted.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        verify_signature(message, signature, public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;

    const CHALLENGE: &[u8] = b"admit-ownership-challenge-v1\naccount:a\ntoken:t";

    #[test]
    fn holder_signature_verifies() {
        let holder = keypair_from_seed(&[5u8; 32]);
        let sig = sign_message(CHALLENGE, &holder.private);
        assert!(Ed25519Verifier.verify(CHALLENGE, &sig, &holder.public));
        assert_eq!(sig, sign_message(CHALLENGE, &holder.private));
    }

    #[test]
    fn signature_is_bound_to_message_and_key() {
        let holder = keypair_from_seed(&[5u8; 32]);
        let other = keypair_from_seed(&[6u8; 32]);
        let sig = sign_message(CHALLENGE, &holder.private);
        assert!(!verify_signature(b"admit-ownership-challenge-v1\naccount:a\ntoken:u", &sig, &holder.public));
        assert!(!verify_signature(CHALLENGE, &sig, &other.public));
    }

    #[test]
    fn garbage_key_or_signature_is_rejected() {
        let holder = keypair_from_seed(&[5u8; 32]);
        let sig = sign_message(CHALLENGE, &holder.private);
        assert!(!verify_signature(CHALLENGE, &sig, &PublicKey([0xFF; 32])));
        assert!(!verify_signature(CHALLENGE, &Signature([0u8; 64]), &holder.public));
    }
}
