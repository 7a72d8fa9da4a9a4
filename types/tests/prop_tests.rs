use proptest::prelude::*;

use admit_types::{EventDescriptor, Signature, Timestamp, TxHash};

proptest! {
    /// Display and parse agree for every hash, in either case.
    #[test]
    fn tx_hash_text_form(bytes in prop::array::uniform32(any::<u8>()), lower in any::<bool>()) {
        let hash = TxHash::new(bytes);
        let text = if lower { hash.to_string().to_lowercase() } else { hash.to_string() };
        prop_assert_eq!(text.parse::<TxHash>().unwrap(), hash);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// Signatures keep their bytes through both serde forms.
    #[test]
    fn signature_serde_forms(bytes in prop::collection::vec(any::<u8>(), 64)) {
        let sig = Signature(bytes.as_slice().try_into().unwrap());
        let json = serde_json::to_string(&sig).unwrap();
        prop_assert_eq!(serde_json::from_str::<Signature>(&json).unwrap(), sig.clone());
        let bin = bincode::serialize(&sig).unwrap();
        prop_assert_eq!(bincode::deserialize::<Signature>(&bin).unwrap(), sig);
    }

    /// Any string that is not 128 hex digits fails as a signature.
    #[test]
    fn signature_rejects_short_hex(len in 0usize..127) {
        let text = "A".repeat(len);
        prop_assert!(Signature::from_hex(&text).is_err());
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// plus_secs never wraps and never goes backwards.
    #[test]
    fn timestamp_plus_secs_monotonic(start in any::<u64>(), secs in any::<u64>()) {
        let t = Timestamp::new(start);
        let later = t.plus_secs(secs);
        prop_assert!(later >= t);
        prop_assert_eq!(later.as_secs(), start.saturating_add(secs));
    }

    /// Any descriptor that builds survives its canonical JSON form unchanged.
    #[test]
    fn event_canonical_json_is_stable(
        id in 0u64..=u64::from(u32::MAX),
        quantity in 1u64..=u64::from(u32::MAX),
        start in 0u64..4_000_000_000,
        private in any::<bool>(),
        name in "[A-Za-z][A-Za-z0-9 ]{0,30}",
    ) {
        let event = EventDescriptor::builder(id, name)
            .starts_at(Timestamp::new(start))
            .quantity(quantity)
            .private(private)
            .build()
            .unwrap();
        let json = event.to_canonical_json().unwrap();
        let parsed = EventDescriptor::from_json(&json).unwrap();
        prop_assert_eq!(&parsed, &event);
        prop_assert_eq!(parsed.to_canonical_json().unwrap(), json);
    }

    /// Quantity zero never builds, whatever else is set.
    #[test]
    fn event_zero_quantity_always_rejected(id in 0u64..1_000_000, start in 0u64..1_000_000) {
        let result = EventDescriptor::builder(id, "Gig")
            .starts_at(Timestamp::new(start))
            .quantity(0)
            .build();
        prop_assert!(result.is_err());
    }
}
