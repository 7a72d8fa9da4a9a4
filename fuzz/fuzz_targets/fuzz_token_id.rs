#![no_main]

use admit_codec::{compose, decode_str, TokenId};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary text never panics.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = decode_str(text);
    }

    // Any 32 bytes decode, and recompose to the same identity when the fee is legal.
    if let Ok(bytes) = <[u8; 32]>::try_from(data) {
        let id = TokenId::from_bytes(bytes);
        let decoded = id.decode();
        if let Ok(again) = compose(&decoded) {
            assert_eq!(again, id);
        }
        assert_eq!(id.to_string().parse::<TokenId>().ok(), Some(id));
    }
});
