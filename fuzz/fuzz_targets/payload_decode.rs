#![no_main]

use bigboard_board::{decode_payload, encode_payload, MESSAGE_MARKER};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(message) = decode_payload(data) else {
        return;
    };

    // A decoded payload always had a marker
    assert!(data.windows(MESSAGE_MARKER.len()).any(|w| w == MESSAGE_MARKER));

    // Re-encoding a decoded message decodes to the same message
    let again = decode_payload(&encode_payload(message.origin, &message.text))
        .expect("re-encoded payload must decode");
    assert_eq!(again, message);
});
