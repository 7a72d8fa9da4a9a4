#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Deserializing untrusted bytes must fail cleanly, never panic.
    let _ = bincode::deserialize::<admit_transactions::Transaction>(data);
    let _ = bincode::deserialize::<admit_transactions::SignedTransaction>(data);

    if let Ok(signed) = bincode::deserialize::<admit_transactions::SignedTransaction>(data) {
        let _ = signed.has_valid_signature();
    }
});
