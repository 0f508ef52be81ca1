#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let result = am_parser::parse(input);
    let _ = am_parser::parse_summary_json(&result);
});
