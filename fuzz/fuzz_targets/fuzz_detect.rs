#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let detected = am_parser::detect_content_type(input);
    assert!((0.0..=1.0).contains(&detected.confidence));
});
