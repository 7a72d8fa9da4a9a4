//! Signature verifier that counts how often it is consulted.

use admit_crypto::{Ed25519Verifier, SignatureVerifier};
use admit_types::{PublicKey, Signature};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps a real verifier and records every call.
#[derive(Debug, Default)]
pub struct CountingVerifier<V = Ed25519Verifier> {
    inner: V,
    calls: AtomicUsize,
}

impl CountingVerifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V> CountingVerifier<V> {
    pub fn wrapping(inner: V) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<V: SignatureVerifier> SignatureVerifier for CountingVerifier<V> {
    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(message, signature, public_key)
    }
}
