//! Fuzz target for reading back a single YOLO label line.

#![no_main]

use libfuzzer_sys::fuzz_target;
use voc2yolo::convert::fuzz_parse_label_line;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_parse_label_line(line);
});
