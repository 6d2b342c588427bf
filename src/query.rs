//! Tree query layer: a compiled XPath 1.0 subset.
//!
//! Expressions are compiled once into an [`Expr`] and evaluated with
//! [`select`] against a context [`Item`]. Results are ordered by document
//! order and free of duplicates. Anything outside the supported grammar is a
//! [`ConfigErrorKind::UnsupportedExpression`] at compile time; nothing is
//! skipped or approximated at evaluation time.
//!
//! ```text
//! union      = path ('|' path)*
//! path       = '/' relative? | '//' relative | relative
//! relative   = step (('/' | '//') step)*
//! step       = '.' | '..' | '@' name-test predicate*
//!            | (axis '::')? node-test predicate*
//! node-test  = name | '*' | 'text()' | 'node()'
//! predicate  = '[' or-expr ']'
//! or-expr    = and-expr ('or' and-expr)*
//! and-expr   = unary ('and' unary)*
//! unary      = 'not(' or-expr ')' | 'count(' union ')' op number
//!            | '(' or-expr ')' | number | union (op (literal | number))?
//! ```

use crate::error::{ConfigError, ConfigErrorKind};
use crate::tree::{Document, Node, NodeId, NodeKind};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;

// ─── Items ──────────────────────────────────────────────────────────────────

/// One member of a query result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Item {
    /// The document node, an element, or a text node.
    Node(NodeId),
    Attribute { owner: NodeId, name: String },
}

impl Item {
    fn order_key(&self) -> (usize, u8, &str) {
        match self {
            Item::Node(id) => (id.index(), 0, ""),
            Item::Attribute { owner, name } => (owner.index(), 1, name.as_str()),
        }
    }

    /// The node itself, or the element owning the attribute.
    pub fn node_id(&self) -> NodeId {
        match self {
            Item::Node(id) => *id,
            Item::Attribute { owner, .. } => *owner,
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, Item::Attribute { .. })
    }

    /// XPath string value: attribute value, text content, or the
    /// concatenated descendant text of an element.
    pub fn string_value(&self, doc: &Document) -> String {
        match self {
            Item::Node(id) => doc.node(*id).string_value(),
            Item::Attribute { owner, name } => doc
                .node(*owner)
                .attribute(name)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl Ord for Item {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ─── AST ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    SelfAxis,
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    Attribute,
}

impl Axis {
    fn from_name(name: &str) -> Option<Axis> {
        Some(match name {
            "self" => Axis::SelfAxis,
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "parent" => Axis::Parent,
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "following-sibling" => Axis::FollowingSibling,
            "preceding-sibling" => Axis::PrecedingSibling,
            "attribute" => Axis::Attribute,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum NodeTest {
    Name(String),
    Wildcard,
    Text,
    AnyNode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn holds<T: PartialOrd>(self, left: T, right: T) -> bool {
        match self {
            CmpOp::Eq => left == right,
            CmpOp::Ne => left != right,
            CmpOp::Lt => left < right,
            CmpOp::Le => left <= right,
            CmpOp::Gt => left > right,
            CmpOp::Ge => left >= right,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Operand {
    Literal(String),
    Number(i64),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Filter {
    Or(Box<Filter>, Box<Filter>),
    And(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
    Exists(Union),
    Compare {
        path: Union,
        op: CmpOp,
        operand: Operand,
    },
    Count {
        path: Union,
        op: CmpOp,
        value: i64,
    },
    Position(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    filters: Vec<Filter>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PathExpr {
    absolute: bool,
    steps: Vec<Step>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Union(Vec<PathExpr>);

/// A compiled path expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    source: String,
    union: Union,
}

impl Expr {
    /// Compiles `source`, failing with `UnsupportedExpression` on anything
    /// outside the supported grammar.
    pub fn compile(source: &str) -> Result<Expr, ConfigError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            source,
            tokens,
            pos: 0,
        };
        let union = parser.union()?;
        if let Some(tok) = parser.peek() {
            return Err(ConfigError::unsupported(
                source,
                tok.offset,
                "unexpected trailing input",
            ));
        }
        Ok(Expr {
            source: source.to_string(),
            union,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when every branch of the union starts at the document node.
    pub fn is_absolute(&self) -> bool {
        self.union.0.iter().all(|p| p.absolute)
    }

    /// Pattern form of the expression: relative branches are anchored to
    /// match anywhere below the document node, as `//` would.
    pub fn anchored(&self) -> Expr {
        let paths = self
            .union
            .0
            .iter()
            .map(|p| {
                if p.absolute {
                    return p.clone();
                }
                let mut steps = vec![descendant_or_self()];
                steps.extend(p.steps.iter().cloned());
                PathExpr {
                    absolute: true,
                    steps,
                }
            })
            .collect();
        Expr {
            source: self.source.clone(),
            union: Union(paths),
        }
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Expr::compile(&source).map_err(serde::de::Error::custom)
    }
}

// ─── Tokenizer ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
enum Tok {
    Slash,
    DoubleSlash,
    LBracket,
    RBracket,
    LParen,
    RParen,
    At,
    Dot,
    DotDot,
    Pipe,
    ColonColon,
    Star,
    Op(CmpOp),
    Literal(String),
    Number(i64),
    Name(String),
}

#[derive(Clone, Debug)]
struct Token {
    tok: Tok,
    offset: usize,
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn tokenize(source: &str) -> Result<Vec<Token>, ConfigError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let at = |i: usize| chars.get(i).map(|&(_, c)| c);

    while i < chars.len() {
        let (offset, c) = chars[i];
        let push = |tokens: &mut Vec<Token>, tok: Tok| tokens.push(Token { tok, offset });

        match c {
            c if c.is_whitespace() => {
                i += 1;
            }
            '/' => {
                if at(i + 1) == Some('/') {
                    push(&mut tokens, Tok::DoubleSlash);
                    i += 2;
                } else {
                    push(&mut tokens, Tok::Slash);
                    i += 1;
                }
            }
            '[' => {
                push(&mut tokens, Tok::LBracket);
                i += 1;
            }
            ']' => {
                push(&mut tokens, Tok::RBracket);
                i += 1;
            }
            '(' => {
                push(&mut tokens, Tok::LParen);
                i += 1;
            }
            ')' => {
                push(&mut tokens, Tok::RParen);
                i += 1;
            }
            '@' => {
                push(&mut tokens, Tok::At);
                i += 1;
            }
            '|' => {
                push(&mut tokens, Tok::Pipe);
                i += 1;
            }
            '*' => {
                push(&mut tokens, Tok::Star);
                i += 1;
            }
            '.' => {
                if at(i + 1) == Some('.') {
                    push(&mut tokens, Tok::DotDot);
                    i += 2;
                } else {
                    push(&mut tokens, Tok::Dot);
                    i += 1;
                }
            }
            ':' if at(i + 1) == Some(':') => {
                push(&mut tokens, Tok::ColonColon);
                i += 2;
            }
            '=' => {
                push(&mut tokens, Tok::Op(CmpOp::Eq));
                i += 1;
            }
            '!' if at(i + 1) == Some('=') => {
                push(&mut tokens, Tok::Op(CmpOp::Ne));
                i += 2;
            }
            '<' | '>' => {
                let or_equal = at(i + 1) == Some('=');
                let op = match (c, or_equal) {
                    ('<', false) => CmpOp::Lt,
                    ('<', true) => CmpOp::Le,
                    ('>', false) => CmpOp::Gt,
                    _ => CmpOp::Ge,
                };
                push(&mut tokens, Tok::Op(op));
                i += if or_equal { 2 } else { 1 };
            }
            '\'' | '"' => {
                let quote = c;
                let mut j = i + 1;
                let mut literal = String::new();
                while let Some(ch) = at(j) {
                    if ch == quote {
                        break;
                    }
                    literal.push(ch);
                    j += 1;
                }
                if at(j).is_none() {
                    return Err(ConfigError::unsupported(
                        source,
                        offset,
                        "unterminated string literal",
                    ));
                }
                push(&mut tokens, Tok::Literal(literal));
                i = j + 1;
            }
            c if c.is_ascii_digit() => {
                let mut j = i;
                while at(j).is_some_and(|ch| ch.is_ascii_digit()) {
                    j += 1;
                }
                let end = chars.get(j).map(|&(o, _)| o).unwrap_or(source.len());
                let value: i64 = source[offset..end].parse().map_err(|_| {
                    ConfigError::unsupported(source, offset, "number out of range")
                })?;
                push(&mut tokens, Tok::Number(value));
                i = j;
            }
            c if is_name_start(c) => {
                let mut j = i + 1;
                loop {
                    match at(j) {
                        Some(ch) if is_name_char(ch) => j += 1,
                        // A single colon joins a prefixed name such as xml:lang.
                        Some(':') if at(j + 1).is_some_and(is_name_start) => j += 2,
                        _ => break,
                    }
                }
                let end = chars.get(j).map(|&(o, _)| o).unwrap_or(source.len());
                push(&mut tokens, Tok::Name(source[offset..end].to_string()));
                i = j;
            }
            other => {
                return Err(ConfigError::unsupported(
                    source,
                    offset,
                    &format!("unexpected character '{}'", other),
                ));
            }
        }
    }

    Ok(tokens)
}

// ─── Parser ─────────────────────────────────────────────────────────────────

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_tok(&self) -> Option<&Tok> {
        self.peek().map(|t| &t.tok)
    }

    fn peek_nth(&self, n: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + n).map(|t| &t.tok)
    }

    fn offset(&self) -> usize {
        self.peek().map(|t| t.offset).unwrap_or(self.source.len())
    }

    fn error(&self, detail: &str) -> ConfigError {
        ConfigError::unsupported(self.source, self.offset(), detail)
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek_tok() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok, what: &str) -> Result<(), ConfigError> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", what)))
        }
    }

    fn union(&mut self) -> Result<Union, ConfigError> {
        let mut paths = vec![self.path()?];
        while self.eat(&Tok::Pipe) {
            paths.push(self.path()?);
        }
        Ok(Union(paths))
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek_tok(),
            Some(Tok::Dot | Tok::DotDot | Tok::At | Tok::Star | Tok::Name(_))
        )
    }

    fn path(&mut self) -> Result<PathExpr, ConfigError> {
        if self.eat(&Tok::Slash) {
            let steps = if self.starts_step() {
                self.relative()?
            } else {
                Vec::new()
            };
            return Ok(PathExpr {
                absolute: true,
                steps,
            });
        }
        if self.eat(&Tok::DoubleSlash) {
            let mut steps = vec![descendant_or_self()];
            steps.extend(self.relative()?);
            return Ok(PathExpr {
                absolute: true,
                steps,
            });
        }
        Ok(PathExpr {
            absolute: false,
            steps: self.relative()?,
        })
    }

    fn relative(&mut self) -> Result<Vec<Step>, ConfigError> {
        let mut steps = vec![self.step()?];
        loop {
            if self.eat(&Tok::Slash) {
                steps.push(self.step()?);
            } else if self.eat(&Tok::DoubleSlash) {
                steps.push(descendant_or_self());
                steps.push(self.step()?);
            } else {
                return Ok(steps);
            }
        }
    }

    fn step(&mut self) -> Result<Step, ConfigError> {
        if self.eat(&Tok::Dot) {
            return Ok(Step {
                axis: Axis::SelfAxis,
                test: NodeTest::AnyNode,
                filters: Vec::new(),
            });
        }
        if self.eat(&Tok::DotDot) {
            return Ok(Step {
                axis: Axis::Parent,
                test: NodeTest::AnyNode,
                filters: Vec::new(),
            });
        }

        let axis = if self.eat(&Tok::At) {
            Axis::Attribute
        } else if let (Some(Tok::Name(name)), Some(Tok::ColonColon)) =
            (self.peek_tok(), self.peek_nth(1))
        {
            let axis = Axis::from_name(name)
                .ok_or_else(|| self.error(&format!("unsupported axis '{}'", name)))?;
            self.pos += 2;
            axis
        } else {
            Axis::Child
        };

        let test = self.node_test()?;
        let mut filters = Vec::new();
        while self.eat(&Tok::LBracket) {
            filters.push(self.or_expr()?);
            self.expect(&Tok::RBracket, "']'")?;
        }
        Ok(Step {
            axis,
            test,
            filters,
        })
    }

    fn node_test(&mut self) -> Result<NodeTest, ConfigError> {
        match self.peek_tok().cloned() {
            Some(Tok::Star) => {
                self.pos += 1;
                Ok(NodeTest::Wildcard)
            }
            Some(Tok::Name(name)) => {
                if self.peek_nth(1) == Some(&Tok::LParen) {
                    let test = match name.as_str() {
                        "text" => NodeTest::Text,
                        "node" => NodeTest::AnyNode,
                        other => {
                            return Err(self.error(&format!("unsupported function '{}()'", other)));
                        }
                    };
                    self.pos += 2;
                    self.expect(&Tok::RParen, "')'")?;
                    Ok(test)
                } else {
                    self.pos += 1;
                    Ok(NodeTest::Name(name))
                }
            }
            _ => Err(self.error("expected a node test")),
        }
    }

    fn keyword(&self, word: &str) -> bool {
        matches!(self.peek_tok(), Some(Tok::Name(n)) if n == word)
    }

    fn or_expr(&mut self) -> Result<Filter, ConfigError> {
        let mut left = self.and_expr()?;
        while self.keyword("or") {
            self.pos += 1;
            let right = self.and_expr()?;
            left = Filter::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Filter, ConfigError> {
        let mut left = self.unary()?;
        while self.keyword("and") {
            self.pos += 1;
            let right = self.unary()?;
            left = Filter::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Filter, ConfigError> {
        let call = self.peek_nth(1) == Some(&Tok::LParen);
        match (self.peek_tok().cloned(), call) {
            (Some(Tok::Name(name)), true) if name == "not" => {
                self.pos += 2;
                let inner = self.or_expr()?;
                self.expect(&Tok::RParen, "')'")?;
                Ok(Filter::Not(Box::new(inner)))
            }
            (Some(Tok::Name(name)), true) if name == "count" => {
                self.pos += 2;
                let path = self.union()?;
                self.expect(&Tok::RParen, "')'")?;
                let op = self.comparison()?.ok_or_else(|| {
                    self.error("count() must be compared against a number")
                })?;
                match self.peek_tok().cloned() {
                    Some(Tok::Number(value)) => {
                        self.pos += 1;
                        Ok(Filter::Count { path, op, value })
                    }
                    _ => Err(self.error("count() must be compared against a number")),
                }
            }
            (Some(Tok::Name(name)), true) if name != "text" && name != "node" => {
                Err(self.error(&format!("unsupported function '{}()'", name)))
            }
            (Some(Tok::LParen), _) => {
                self.pos += 1;
                let inner = self.or_expr()?;
                self.expect(&Tok::RParen, "')'")?;
                Ok(inner)
            }
            (Some(Tok::Number(n)), _) => {
                self.pos += 1;
                if n < 1 {
                    return Err(self.error("positions start at 1"));
                }
                Ok(Filter::Position(n as usize))
            }
            (Some(Tok::Literal(_)), _) => Err(self.error("bare literals are not supported")),
            _ => {
                let path = self.union()?;
                let Some(op) = self.comparison()? else {
                    return Ok(Filter::Exists(path));
                };
                let operand = match self.peek_tok().cloned() {
                    Some(Tok::Literal(s)) => Operand::Literal(s),
                    Some(Tok::Number(n)) => Operand::Number(n),
                    _ => return Err(self.error("expected a literal or number")),
                };
                if matches!(operand, Operand::Literal(_)) && !matches!(op, CmpOp::Eq | CmpOp::Ne) {
                    return Err(self.error("ordering comparison against a string literal"));
                }
                self.pos += 1;
                Ok(Filter::Compare { path, op, operand })
            }
        }
    }

    fn comparison(&mut self) -> Result<Option<CmpOp>, ConfigError> {
        match self.peek_tok() {
            Some(Tok::Op(op)) => {
                let op = *op;
                self.pos += 1;
                Ok(Some(op))
            }
            _ => Ok(None),
        }
    }
}

fn descendant_or_self() -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        test: NodeTest::AnyNode,
        filters: Vec::new(),
    }
}

// ─── Evaluation ─────────────────────────────────────────────────────────────

/// Evaluates `expr` with `context` as the context item.
///
/// Absolute branches start at the document node regardless of `context`.
pub fn select(doc: &Document, context: &Item, expr: &Expr) -> Vec<Item> {
    eval_union(doc, context, &expr.union)
}

/// Convenience wrapper: evaluates `expr` from the document node.
pub fn select_from_root(doc: &Document, expr: &Expr) -> Vec<Item> {
    select(doc, &Item::Node(doc.root().id()), expr)
}

fn eval_union(doc: &Document, context: &Item, union: &Union) -> Vec<Item> {
    let mut out = Vec::new();
    for path in &union.0 {
        out.extend(eval_path(doc, context, path));
    }
    if union.0.len() > 1 {
        out.sort();
        out.dedup();
    }
    out
}

fn eval_path(doc: &Document, context: &Item, path: &PathExpr) -> Vec<Item> {
    let mut current = if path.absolute {
        vec![Item::Node(doc.root().id())]
    } else {
        vec![context.clone()]
    };

    for step in &path.steps {
        let mut next = Vec::new();
        for item in &current {
            next.extend(eval_step(doc, item, step));
        }
        next.sort();
        next.dedup();
        current = next;
        if current.is_empty() {
            break;
        }
    }
    current
}

fn eval_step(doc: &Document, item: &Item, step: &Step) -> Vec<Item> {
    let mut candidates: Vec<Item> = axis_items(doc, item, step.axis)
        .into_iter()
        .filter(|candidate| node_test(doc, candidate, step.axis, &step.test))
        .collect();

    for filter in &step.filters {
        let size = candidates.len();
        candidates = candidates
            .into_iter()
            .enumerate()
            .filter(|(i, candidate)| eval_filter(doc, candidate, i + 1, size, filter))
            .map(|(_, candidate)| candidate)
            .collect();
    }
    candidates
}

/// Items along `axis` in axis order (reverse axes nearest first).
fn axis_items(doc: &Document, item: &Item, axis: Axis) -> Vec<Item> {
    let node = match item {
        Item::Node(id) => doc.node(*id),
        Item::Attribute { owner, .. } => {
            let owner = doc.node(*owner);
            return match axis {
                Axis::SelfAxis => vec![item.clone()],
                Axis::Parent => vec![Item::Node(owner.id())],
                Axis::Ancestor | Axis::AncestorOrSelf => {
                    let mut out = Vec::new();
                    if axis == Axis::AncestorOrSelf {
                        out.push(item.clone());
                    }
                    out.push(Item::Node(owner.id()));
                    out.extend(owner.ancestors().map(|n| Item::Node(n.id())));
                    out
                }
                _ => Vec::new(),
            };
        }
    };

    match axis {
        Axis::SelfAxis => vec![item.clone()],
        Axis::Child => node_items(node.children()),
        Axis::Descendant => node_items(node.descendants()),
        Axis::DescendantOrSelf => node_items(std::iter::once(node).chain(node.descendants())),
        Axis::Parent => node_items(node.parent()),
        Axis::Ancestor => node_items(node.ancestors()),
        Axis::AncestorOrSelf => node_items(std::iter::once(node).chain(node.ancestors())),
        Axis::FollowingSibling => node_items(node.following_siblings()),
        Axis::PrecedingSibling => node_items(node.preceding_siblings()),
        Axis::Attribute => node
            .attributes()
            .map(|(name, _)| Item::Attribute {
                owner: node.id(),
                name: name.to_string(),
            })
            .collect(),
    }
}

fn node_items<'a>(nodes: impl IntoIterator<Item = Node<'a>>) -> Vec<Item> {
    nodes.into_iter().map(|n| Item::Node(n.id())).collect()
}

fn node_test(doc: &Document, item: &Item, axis: Axis, test: &NodeTest) -> bool {
    match item {
        Item::Attribute { name, .. } => match test {
            NodeTest::Name(wanted) => wanted == name,
            NodeTest::Wildcard | NodeTest::AnyNode => true,
            NodeTest::Text => false,
        },
        Item::Node(id) => {
            // The attribute axis never yields nodes.
            if axis == Axis::Attribute {
                return false;
            }
            let node = doc.node(*id);
            match (test, node.kind()) {
                (NodeTest::AnyNode, _) => true,
                (NodeTest::Text, NodeKind::Text(_)) => true,
                (NodeTest::Wildcard, NodeKind::Element { .. }) => true,
                (NodeTest::Name(wanted), NodeKind::Element { name, .. }) => wanted == name,
                _ => false,
            }
        }
    }
}

fn eval_filter(doc: &Document, item: &Item, position: usize, size: usize, filter: &Filter) -> bool {
    match filter {
        Filter::Or(a, b) => {
            eval_filter(doc, item, position, size, a) || eval_filter(doc, item, position, size, b)
        }
        Filter::And(a, b) => {
            eval_filter(doc, item, position, size, a) && eval_filter(doc, item, position, size, b)
        }
        Filter::Not(inner) => !eval_filter(doc, item, position, size, inner),
        Filter::Exists(path) => !eval_union(doc, item, path).is_empty(),
        Filter::Compare { path, op, operand } => {
            eval_union(doc, item, path)
                .iter()
                .any(|found| compare_value(&found.string_value(doc), *op, operand))
        }
        Filter::Count { path, op, value } => {
            let count = eval_union(doc, item, path).len() as i64;
            op.holds(count, *value)
        }
        Filter::Position(n) => position == *n && *n <= size,
    }
}

fn compare_value(value: &str, op: CmpOp, operand: &Operand) -> bool {
    match operand {
        Operand::Literal(literal) => op.holds(value, literal.as_str()),
        Operand::Number(number) => match value.trim().parse::<i64>() {
            Ok(parsed) => op.holds(parsed, *number),
            Err(_) => false,
        },
    }
}
