#![no_main]

use libfuzzer_sys::fuzz_target;
use spscheck::parse::parse_library;

fuzz_target!(|data: &str| {
    if let Ok(library) = parse_library(data) {
        let _ = library.into_registry();
    }
});
