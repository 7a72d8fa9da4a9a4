use proptest::prelude::*;

use admit_codec::{compose, decode, decode_str, DecodedToken, Taxon, TokenFlags, TokenId};
use admit_types::AccountId;

fn decoded_token() -> impl Strategy<Value = DecodedToken> {
    (
        any::<u16>(),
        0u16..=50_000,
        prop::array::uniform20(0u8..),
        any::<u32>(),
        any::<u32>(),
    )
        .prop_map(|(flags, fee, issuer, taxon, sequence)| DecodedToken {
            flags: TokenFlags::from_bits(flags),
            transfer_fee: fee,
            issuer: AccountId::new(issuer),
            taxon: Taxon::new(taxon),
            sequence,
        })
}

proptest! {
    /// Decoding recovers every field that went into an identity.
    #[test]
    fn decode_inverts_compose(parts in decoded_token()) {
        let id = compose(&parts).unwrap();
        prop_assert_eq!(decode(&id), parts);
    }

    /// The hex form is always 64 uppercase characters and parses back.
    #[test]
    fn hex_form_is_fixed_width(parts in decoded_token()) {
        let id = compose(&parts).unwrap();
        let hex = id.to_string();
        prop_assert_eq!(hex.len(), 64);
        prop_assert!(hex.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        prop_assert_eq!(hex.parse::<TokenId>().unwrap(), id);
    }

    /// Distinct sequences from one issuer never collide.
    #[test]
    fn distinct_sequences_distinct_ids(parts in decoded_token(), other_seq in any::<u32>()) {
        prop_assume!(other_seq != parts.sequence);
        let a = compose(&parts).unwrap();
        let b = compose(&DecodedToken { sequence: other_seq, ..parts }).unwrap();
        prop_assert_ne!(a, b);
    }

    /// Arbitrary strings either decode or fail cleanly; never panic.
    #[test]
    fn decode_never_panics(s in "\\PC{0,80}") {
        let _ = decode_str(&s);
    }
}
