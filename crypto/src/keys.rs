//! Ed25519 key material for issuers and holders.

use admit_types::{KeyPair, PrivateKey, PublicKey};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

fn pair_of(signing: SigningKey) -> KeyPair {
    KeyPair {
        public: PublicKey(signing.verifying_key().to_bytes()),
        private: PrivateKey(signing.to_bytes()),
    }
}

/// Fresh key pair from the operating system's RNG.
pub fn generate_keypair() -> KeyPair {
    pair_of(SigningKey::generate(&mut OsRng))
}

/// Key pair for a known secret. Test fixtures and wallets restored from a
/// stored secret both go through here.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    pair_of(SigningKey::from_bytes(seed))
}

pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    PublicKey(SigningKey::from_bytes(&private.0).verifying_key().to_bytes())
}

/// Rebuild the pair around an owned secret, without copying it again.
pub fn keypair_from_private(private: PrivateKey) -> KeyPair {
    KeyPair {
        public: public_from_private(&private),
        private,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_pairs_are_reproducible() {
        let issuer = keypair_from_seed(&[1u8; 32]);
        let again = keypair_from_seed(&[1u8; 32]);
        let holder = keypair_from_seed(&[2u8; 32]);
        assert_eq!(issuer.public, again.public);
        assert_ne!(issuer.public, holder.public);
    }

    #[test]
    fn restored_secret_yields_same_public_key() {
        let original = generate_keypair();
        let restored = keypair_from_private(PrivateKey(original.private.0));
        assert_eq!(restored.public, original.public);
        assert_eq!(public_from_private(&original.private), original.public);
    }

    #[test]
    fn generated_pairs_differ() {
        assert_ne!(generate_keypair().public, generate_keypair().public);
    }
}
