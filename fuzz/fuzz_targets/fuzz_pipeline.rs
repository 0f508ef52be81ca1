#![no_main]

use am_core::RenderContext;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let mut parser = am_parser::MessageParser::new();
    let first = parser.parse(input);
    let second = parser.parse(input);
    assert_eq!(first, second);

    let context = RenderContext::default().with_image_base_url("https://cdn.test/");
    let _ = am_render_text::render_text(&first, &context);
});
