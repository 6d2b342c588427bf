use proptest::prelude::*;
use spscheck::tree::Element;

fn arb_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["a", "b", "c"])
}

/// Optional `t` attribute; the blank value exercises whitespace handling.
fn arb_type() -> impl Strategy<Value = Option<&'static str>> {
    prop::option::of(prop::sample::select(vec!["x", "y", " "]))
}

fn build(name: &str, kind: Option<&str>, text: bool, children: Vec<Element>) -> Element {
    let mut el = Element::new(name);
    if let Some(kind) = kind {
        el = el.attr("t", kind);
    }
    if text {
        el = el.text("v");
    }
    for child in children {
        el = el.child(child);
    }
    el
}

/// Strategy for element trees over a small vocabulary, nested up to `depth`.
pub fn arb_element(depth: u32) -> impl Strategy<Value = Element> {
    let leaf = (arb_name(), arb_type(), any::<bool>())
        .prop_map(|(name, kind, text)| build(name, kind, text, Vec::new()));

    leaf.prop_recursive(depth, 48, 4, |inner| {
        (
            arb_name(),
            arb_type(),
            any::<bool>(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(name, kind, text, children)| build(name, kind, text, children))
    })
}

/// Elements named `name` in the tree, the root included.
pub fn count_named(el: &Element, name: &str) -> usize {
    let own = usize::from(el.name == name);
    own + el
        .children
        .iter()
        .map(|c| match c {
            spscheck::tree::Content::Element(child) => count_named(child, name),
            spscheck::tree::Content::Text(_) => 0,
        })
        .sum::<usize>()
}
