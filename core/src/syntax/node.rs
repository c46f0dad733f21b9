use std::fmt;

use indexmap::IndexMap;

use crate::location;

use super::kind::NodeKind;

/// A leaf value stored in a syntax tree field.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// The value of one field of a [`SyntaxNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(Scalar),
    Node(Box<SyntaxNode>),
    List(Vec<FieldValue>),
    /// A foreign value from an imported tree that is neither a scalar, a
    /// sequence nor a tagged node.
    Opaque(serde_json::Value),
}

impl FieldValue {
    pub fn none() -> Self {
        FieldValue::Scalar(Scalar::None)
    }

    pub fn str(value: impl Into<String>) -> Self {
        FieldValue::Scalar(Scalar::Str(value.into()))
    }

    pub fn list(items: Vec<SyntaxNode>) -> Self {
        FieldValue::List(items.into_iter().map(FieldValue::from).collect())
    }

    pub fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            FieldValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(Scalar::Str(value)) => Some(value),
            _ => None,
        }
    }

    fn shift_lines(&mut self, delta: isize) {
        match self {
            FieldValue::Node(node) => node.increment_lineno(delta),
            FieldValue::List(items) => items.iter_mut().for_each(|item| item.shift_lines(delta)),
            FieldValue::Scalar(_) | FieldValue::Opaque(_) => {}
        }
    }
}

impl From<SyntaxNode> for FieldValue {
    fn from(node: SyntaxNode) -> Self {
        FieldValue::Node(Box::new(node))
    }
}

impl From<Scalar> for FieldValue {
    fn from(scalar: Scalar) -> Self {
        FieldValue::Scalar(scalar)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }
}

impl From<Option<SyntaxNode>> for FieldValue {
    fn from(node: Option<SyntaxNode>) -> Self {
        match node {
            Some(node) => FieldValue::from(node),
            None => FieldValue::none(),
        }
    }
}

/// One node of a parsed syntax tree: a kind, its fields in declaration
/// order, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    id: usize,
    pub kind: NodeKind,
    pub fields: IndexMap<String, FieldValue>,
    pub location: Option<location::Location>,
    pub span: Option<location::Span>,
}

impl SyntaxNode {
    fn create_id() -> usize {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(1);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }

    pub fn new(
        kind: NodeKind,
        location: Option<location::Location>,
        span: Option<location::Span>,
    ) -> Self {
        SyntaxNode {
            id: Self::create_id(),
            kind,
            fields: IndexMap::new(),
            location,
            span,
        }
    }

    /// Append a field. Fields keep the order they are added in.
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_location(mut self, location: location::Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_span(mut self, span: location::Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn get_id(&self) -> usize {
        self.id
    }
    pub fn get_kind(&self) -> &NodeKind {
        &self.kind
    }
    pub fn get_location(&self) -> Option<&location::Location> {
        self.location.as_ref()
    }
    pub fn get_span(&self) -> Option<&location::Span> {
        self.span.as_ref()
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(name)
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldValue::as_str)
    }

    pub fn field_list(&self, name: &str) -> Option<&[FieldValue]> {
        self.field(name).and_then(FieldValue::as_list)
    }

    pub fn field_node(&self, name: &str) -> Option<&SyntaxNode> {
        self.field(name).and_then(FieldValue::as_node)
    }

    pub fn line(&self) -> Option<usize> {
        self.location.as_ref().map(|loc| loc.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.location.as_ref().map(|loc| loc.column)
    }

    /// Shift the line numbers of this node and every node below it by
    /// `delta`, like Python's `ast.increment_lineno`.
    pub fn increment_lineno(&mut self, delta: isize) {
        if let Some(loc) = self.location.as_mut() {
            loc.shift_lines(delta);
        }
        if let Some(span) = self.span.as_mut() {
            span.shift_lines(delta);
        }
        for value in self.fields.values_mut() {
            value.shift_lines(delta);
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::None => write!(f, "None"),
            Scalar::Bool(true) => write!(f, "True"),
            Scalar::Bool(false) => write!(f, "False"),
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Float(value) => write!(f, "{:?}", value),
            Scalar::Str(value) => write!(f, "{:?}", value),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(scalar) => write!(f, "{}", scalar),
            FieldValue::Node(node) => write!(f, "{}", node),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            FieldValue::Opaque(raw) => write!(f, "<opaque {}>", raw),
        }
    }
}

/// Renders in the style of Python's `ast.dump`:
/// `FunctionDef(name="f", args=arguments(...), ...)`.
impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, ")")
    }
}
