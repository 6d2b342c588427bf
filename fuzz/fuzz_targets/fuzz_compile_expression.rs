#![no_main]

use libfuzzer_sys::fuzz_target;
use spscheck::query::{Expr, select_from_root};
use spscheck::tree::{Document, Element};

fuzz_target!(|data: &str| {
    // Must either compile or report an error, never panic.
    let Ok(expr) = Expr::compile(data) else {
        return;
    };
    let doc = Document::new(
        Element::new("article")
            .attr("article-type", "research-article")
            .child(Element::new("front").child(Element::new("article-meta").text("x"))),
    );
    let found = select_from_root(&doc, &expr);
    assert!(found.windows(2).all(|w| w[0] < w[1]));
});
