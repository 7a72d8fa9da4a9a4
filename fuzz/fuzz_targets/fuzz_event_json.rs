#![no_main]

use admit_types::EventDescriptor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(event) = EventDescriptor::from_json(text) {
        // A descriptor that validated once must survive its own canonical form.
        let canonical = event.to_canonical_json().unwrap();
        let again = EventDescriptor::from_json(&canonical).unwrap();
        assert_eq!(again.to_canonical_json().unwrap(), canonical);
    }
});
