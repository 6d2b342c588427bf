//! Immutable document tree handed to the engine by a loading collaborator.
//!
//! Nodes live in an arena in document order, so a [`NodeId`] doubles as a
//! document-order key and every subtree occupies a contiguous index range.
//! The tree is built once from an owned [`Element`] and never mutated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index of a node in its [`Document`]; ordering follows document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node above the document element (XPath `/`).
    Root,
    Element {
        name: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// One past the last arena index of this node's subtree.
    end: usize,
}

/// A parsed document.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
}

// ─── Builder ────────────────────────────────────────────────────────────────

/// Child content of an [`Element`] under construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    Element(Element),
    Text(String),
}

/// Owned element used to assemble a [`Document`].
///
/// ```rust
/// use spscheck::tree::{Document, Element};
///
/// let doc = Document::new(
///     Element::new("article").child(
///         Element::new("front").child(Element::new("journal-meta")),
///     ),
/// );
/// assert_eq!(doc.document_element().unwrap().name(), Some("article"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Content>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Content::Element(child));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Content::Text(text.into()));
        self
    }

    pub fn push(&mut self, content: Content) {
        self.children.push(content);
    }
}

impl Document {
    /// Builds a document whose document element is `root`.
    pub fn new(root: Element) -> Self {
        let mut doc = Document {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                end: 1,
            }],
        };
        let top = doc.append(NodeId(0), Content::Element(root));
        doc.nodes[0].children.push(top);
        doc.nodes[0].end = doc.nodes.len();
        doc
    }

    fn append(&mut self, parent: NodeId, content: Content) -> NodeId {
        let id = NodeId(self.nodes.len());
        match content {
            Content::Text(text) => {
                self.nodes.push(NodeData {
                    kind: NodeKind::Text(text),
                    parent: Some(parent),
                    children: Vec::new(),
                    end: id.0 + 1,
                });
            }
            Content::Element(element) => {
                self.nodes.push(NodeData {
                    kind: NodeKind::Element {
                        name: element.name,
                        attributes: element.attributes,
                    },
                    parent: Some(parent),
                    children: Vec::new(),
                    end: id.0 + 1,
                });
                for child in element.children {
                    let child_id = self.append(id, child);
                    self.nodes[id.0].children.push(child_id);
                }
                self.nodes[id.0].end = self.nodes.len();
            }
        }
        id
    }

    /// The document node (XPath `/`).
    pub fn root(&self) -> Node<'_> {
        self.node(NodeId(0))
    }

    pub fn document_element(&self) -> Option<Node<'_>> {
        self.root().children().find(|n| n.is_element())
    }

    /// Panics if `id` was not produced by this document.
    pub fn node(&self, id: NodeId) -> Node<'_> {
        assert!(id.0 < self.nodes.len(), "node id out of range");
        Node { doc: self, id }
    }

    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.nodes.len()).then_some(Node { doc: self, id })
    }

    /// Number of nodes, including the document node and text nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

// ─── Node handle ────────────────────────────────────────────────────────────

/// Borrowed view of one node.
#[derive(Clone, Copy, Debug)]
pub struct Node<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.data().kind
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind(), NodeKind::Root)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind(), NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind(), NodeKind::Text(_))
    }

    /// Element name; `None` for the document node and text nodes.
    pub fn name(&self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(|v| v.as_str()),
            _ => None,
        }
    }

    /// Attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let attributes = match self.kind() {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        };
        attributes
            .into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn has_attributes(&self) -> bool {
        self.attributes().next().is_some()
    }

    /// Content of a text node.
    pub fn text(&self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        let doc = self.doc;
        self.data().parent.map(|id| Node { doc, id })
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let doc = self.doc;
        self.data().children.iter().map(move |&id| Node { doc, id })
    }

    pub fn element_children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.children().filter(|n| n.is_element())
    }

    /// Proper descendants in document order.
    pub fn descendants(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let doc = self.doc;
        (self.id.0 + 1..self.data().end).map(move |i| Node { doc, id: NodeId(i) })
    }

    /// Proper ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    pub fn following_siblings(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let position = self.sibling_position();
        let siblings = self.parent().map(|p| p.data().children.as_slice());
        let doc = self.doc;
        siblings
            .unwrap_or(&[])
            .iter()
            .skip(position + 1)
            .map(move |&id| Node { doc, id })
    }

    /// Preceding siblings, nearest first.
    pub fn preceding_siblings(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let position = self.sibling_position();
        let siblings = self.parent().map(|p| p.data().children.as_slice());
        let doc = self.doc;
        siblings
            .unwrap_or(&[])
            .iter()
            .take(position)
            .rev()
            .map(move |&id| Node { doc, id })
    }

    fn sibling_position(&self) -> usize {
        self.parent()
            .and_then(|p| p.data().children.iter().position(|&c| c == self.id))
            .unwrap_or(0)
    }

    /// Concatenation of all descendant text, in document order.
    pub fn string_value(&self) -> String {
        match self.kind() {
            NodeKind::Text(text) => text.clone(),
            _ => self.descendants().filter_map(|n| n.text()).collect(),
        }
    }

    /// Positional path such as `/article[1]/front[1]/journal-meta[1]`.
    pub fn location(&self) -> String {
        let mut steps = Vec::new();
        let mut current = Some(*self);
        while let Some(node) = current {
            match node.kind() {
                NodeKind::Root => break,
                NodeKind::Element { name, .. } => {
                    let position = node
                        .preceding_siblings()
                        .filter(|s| s.name() == Some(name.as_str()))
                        .count()
                        + 1;
                    steps.push(format!("{}[{}]", name, position));
                }
                NodeKind::Text(_) => {
                    let position = node.preceding_siblings().filter(|s| s.is_text()).count() + 1;
                    steps.push(format!("text()[{}]", position));
                }
            }
            current = node.parent();
        }
        if steps.is_empty() {
            return "/".to_string();
        }
        steps.reverse();
        format!("/{}", steps.join("/"))
    }
}
