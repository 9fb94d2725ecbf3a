//! Fuzz target for VOC annotation parsing.
//!
//! Arbitrary bytes go through the same parser the converter uses; any panic
//! or hang is a bug.

#![no_main]

use libfuzzer_sys::fuzz_target;
use voc2yolo::convert::from_voc_xml_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_voc_xml_slice(data);
});
