#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use spscheck::registry::{ALL_PHASE, builtin};
use spscheck::tree::{Document, Element};
use spscheck::validate::validate;

const NAMES: &[&str] = &[
    "article", "front", "journal-meta", "article-meta", "journal-id", "counts",
    "table-count", "page-count", "fpage", "lpage", "aff", "institution", "abstract",
    "kwd-group", "body", "table", "fig",
];
const ATTRS: &[&str] = &["count", "journal-id-type", "content-type", "xml:lang", "article-type"];

/// Generate an arbitrary element tree over SPS vocabulary from fuzzer bytes.
fn arbitrary_element(u: &mut Unstructured<'_>, depth: u32) -> arbitrary::Result<Element> {
    let mut el = Element::new(*u.choose(NAMES)?);
    for _ in 0..u.int_in_range(0..=2)? {
        el = el.attr(*u.choose(ATTRS)?, String::arbitrary(u)?);
    }
    if depth > 0 {
        for _ in 0..u.int_in_range(0..=3)? {
            if bool::arbitrary(u)? {
                el = el.text(String::arbitrary(u)?);
            } else {
                el = el.child(arbitrary_element(u, depth - 1)?);
            }
        }
    }
    Ok(el)
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(root) = arbitrary_element(&mut u, 5) else {
        return;
    };
    let doc = Document::new(root);
    let registry = builtin().expect("packaged library compiles");
    // Document content never yields an error.
    let report = validate(&doc, registry, ALL_PHASE).expect("reserved phase resolves");
    assert_eq!(report.valid, report.results.iter().all(|r| r.passed));
    for result in report.failures() {
        assert!(result.message.is_some());
    }
});
