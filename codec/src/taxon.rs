//! Taxon derivation and ciphering.

use admit_types::{EventDescriptor, EventId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Multiplier of the linear congruential step used to cipher taxons.
const TAXON_MULTIPLIER: u32 = 384_160_001;
/// Increment of the linear congruential step used to cipher taxons.
const TAXON_INCREMENT: u32 = 2_459;

/// Classification tag grouping tokens; here one taxon per event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Taxon(u32);

impl Taxon {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<EventId> for Taxon {
    fn from(id: EventId) -> Self {
        Self(id.as_u32())
    }
}

impl fmt::Display for Taxon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Taxon seed for an event: the event id itself.
///
/// Deterministic, so every token minted for the event carries the same taxon.
pub fn encode(event: &EventDescriptor) -> Taxon {
    Taxon::from(event.event_id())
}

/// Cipher (or decipher; the operation is its own inverse) a taxon with the
/// token's sequence number.
pub fn cipher_taxon(taxon: u32, sequence: u32) -> u32 {
    taxon ^ TAXON_MULTIPLIER
        .wrapping_mul(sequence)
        .wrapping_add(TAXON_INCREMENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use admit_types::Timestamp;

    #[test]
    fn cipher_is_involution() {
        for seq in [0u32, 1, 7, 1_000, u32::MAX] {
            let ciphered = cipher_taxon(12_345_678, seq);
            assert_eq!(cipher_taxon(ciphered, seq), 12_345_678);
        }
    }

    #[test]
    fn consecutive_sequences_cipher_differently() {
        assert_ne!(cipher_taxon(42, 1), cipher_taxon(42, 2));
    }

    #[test]
    fn encode_uses_event_id() {
        let event = EventDescriptor::builder(12_345_678, "Soccer Game")
            .starts_at(Timestamp::new(1))
            .quantity(1000)
            .build()
            .unwrap();
        assert_eq!(encode(&event), Taxon::new(12_345_678));
        assert_eq!(encode(&event), encode(&event.clone()));
    }
}
