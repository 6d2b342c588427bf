use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use spscheck::tree::{Content, Document, Element};
use std::path::PathBuf;

pub fn conformance_dir() -> PathBuf {
    std::env::var("SPSCHECK_CONFORMANCE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/conformance"))
}

/// Builds a tree from XML text. Comments, processing instructions and the
/// XML declaration are dropped; text and CDATA are kept verbatim.
pub fn parse_xml(xml: &str) -> Document {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().expect("well-formed XML") {
            Event::Start(start) => stack.push(element(&start)),
            Event::Empty(start) => close(element(&start), &mut stack, &mut root),
            Event::End(_) => {
                let done = stack.pop().expect("balanced tags");
                close(done, &mut stack, &mut root);
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    push_text(parent, &text.unescape().expect("valid text"));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    push_text(parent, &String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Document::new(root.expect("a document element"))
}

fn element(start: &BytesStart<'_>) -> Element {
    let mut el = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.expect("valid attribute");
        let value = attr.unescape_value().expect("valid attribute value");
        el = el.attr(String::from_utf8_lossy(attr.key.as_ref()), value);
    }
    el
}

fn close(done: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.push(Content::Element(done)),
        None => *root = Some(done),
    }
}

/// Adjacent text runs are merged so entity references do not split a text
/// node.
fn push_text(parent: &mut Element, text: &str) {
    if let Some(Content::Text(last)) = parent.children.last_mut() {
        last.push_str(text);
    } else {
        parent.push(Content::Text(text.to_string()));
    }
}
