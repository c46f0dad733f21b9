//! file: core/src/ir/node.rs
//! description: IR fragments produced by the builder.
//!
//! A translation yields a `FunctionNode` whose body is a tree of
//! `IrValue`s. Generic nodes keep a reference to the syntax node they were
//! built from, so IR never outlives its tree.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::syntax::{Scalar, SyntaxNode};

use super::{builder::TranslateResult, err::ExportError};

/// Identity token of an IR node.
pub type NodeId = u64;

/// Hand out the next identity token. Tokens are unique for the life of the
/// process, across builders and threads.
pub fn next_node_id() -> NodeId {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub enum IrValue<'ast> {
    Function(Box<FunctionNode<'ast>>),
    Node(GenericNode<'ast>),
    List(Vec<IrValue<'ast>>),
    Scalar(Scalar),
}

impl<'ast> IrValue<'ast> {
    pub fn as_function(&self) -> Option<&FunctionNode<'ast>> {
        match self {
            IrValue::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&GenericNode<'ast>> {
        match self {
            IrValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[IrValue<'ast>]> {
        match self {
            IrValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            IrValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Structural equality that ignores identity tokens: the same kinds,
    /// fields, names, positions and leaf values in the same order.
    pub fn same_shape(&self, other: &IrValue<'_>) -> bool {
        match (self, other) {
            (IrValue::Function(a), IrValue::Function(b)) => a.same_shape(b),
            (IrValue::Node(a), IrValue::Node(b)) => a.same_shape(b),
            (IrValue::List(a), IrValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            (IrValue::Scalar(a), IrValue::Scalar(b)) => a == b,
            _ => false,
        }
    }

    /// Call `visit` with the origin of every function and generic node in
    /// this fragment, parents before children.
    pub fn walk<F: FnMut(&'ast SyntaxNode)>(&self, visit: &mut F) {
        match self {
            IrValue::Function(function) => function.walk(visit),
            IrValue::Node(node) => {
                visit(node.origin);
                node.fields.values().for_each(|value| value.walk(visit));
            }
            IrValue::List(items) => items.iter().for_each(|item| item.walk(visit)),
            IrValue::Scalar(_) => {}
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}

/// Fallback translation of a syntax node: an identity, the node it came
/// from and every field of it, translated, in the original order.
#[derive(Debug, Clone)]
pub struct GenericNode<'ast> {
    pub id: NodeId,
    pub origin: &'ast SyntaxNode,
    pub fields: IndexMap<String, IrValue<'ast>>,
}

impl<'ast> GenericNode<'ast> {
    pub fn new(origin: &'ast SyntaxNode) -> Self {
        GenericNode {
            id: next_node_id(),
            origin,
            fields: IndexMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&IrValue<'ast>> {
        self.fields.get(name)
    }

    pub fn same_shape(&self, other: &GenericNode<'_>) -> bool {
        self.origin.kind == other.origin.kind
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|((name_a, a), (name_b, b))| name_a == name_b && a.same_shape(b))
    }
}

impl PartialEq for GenericNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GenericNode<'_> {}

/// A translated function definition.
#[derive(Debug, Clone)]
pub struct FunctionNode<'ast> {
    pub id: NodeId,
    pub name: String,
    /// Qualified name of the scope the function is declared in. Empty for a
    /// function with no enclosing scope.
    pub qualified_name: String,
    pub line: usize,
    /// 0-based; 0 when the tree carries no position.
    pub column: usize,
    pub arguments: IrValue<'ast>,
    pub decorators: IrValue<'ast>,
    pub returns: IrValue<'ast>,
    pub body: Vec<IrValue<'ast>>,
    pub origin: &'ast SyntaxNode,
}

impl<'ast> FunctionNode<'ast> {
    pub fn same_shape(&self, other: &FunctionNode<'_>) -> bool {
        self.name == other.name
            && self.qualified_name == other.qualified_name
            && self.line == other.line
            && self.column == other.column
            && self.arguments.same_shape(&other.arguments)
            && self.decorators.same_shape(&other.decorators)
            && self.returns.same_shape(&other.returns)
            && self.body.len() == other.body.len()
            && self.body.iter().zip(&other.body).all(|(a, b)| a.same_shape(b))
    }

    pub fn walk<F: FnMut(&'ast SyntaxNode)>(&self, visit: &mut F) {
        visit(self.origin);
        self.decorators.walk(visit);
        self.arguments.walk(visit);
        self.returns.walk(visit);
        self.body.iter().for_each(|stmt| stmt.walk(visit));
    }

    /// Number of IR nodes in this function, itself included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Node counts per syntax kind, keyed by kind name.
    pub fn kind_histogram(&self) -> BTreeMap<String, usize> {
        let mut histogram = BTreeMap::new();
        self.walk(&mut |origin| {
            *histogram.entry(origin.kind.tag().to_string()).or_insert(0) += 1;
        });
        histogram
    }

    /// Nested function definitions, in body order at any depth.
    pub fn nested_functions(&self) -> Vec<&FunctionNode<'ast>> {
        fn collect<'a, 'ast>(value: &'a IrValue<'ast>, out: &mut Vec<&'a FunctionNode<'ast>>) {
            match value {
                IrValue::Function(function) => {
                    out.push(function);
                    function.body.iter().for_each(|stmt| collect(stmt, out));
                }
                IrValue::Node(node) => node.fields.values().for_each(|v| collect(v, out)),
                IrValue::List(items) => items.iter().for_each(|item| collect(item, out)),
                IrValue::Scalar(_) => {}
            }
        }

        let mut out = Vec::new();
        self.body.iter().for_each(|stmt| collect(stmt, &mut out));
        out
    }

    /// Detach this function from the tree it borrows as a JSON value.
    pub fn to_json(&self) -> TranslateResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|err| {
            let error: Box<dyn crate::CanopyErrorExt> =
                Box::new(ExportError::new(&self.name, &err, self.origin.location.clone()));
            error
        })
    }
}

impl PartialEq for FunctionNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FunctionNode<'_> {}

/// The `node` entry of a serialized generic node.
struct OriginRef<'a> {
    id: NodeId,
    origin: &'a SyntaxNode,
}

impl Serialize for OriginRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("_type", self.origin.kind.tag())?;
        map.serialize_entry("syntax_id", &self.origin.get_id())?;
        if let Some(location) = self.origin.get_location() {
            map.serialize_entry("lineno", &location.line)?;
            map.serialize_entry("col_offset", &location.column)?;
        }
        map.end()
    }
}

impl Serialize for GenericNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(
            "node",
            &OriginRef {
                id: self.id,
                origin: self.origin,
            },
        )?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for FunctionNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(10))?;
        map.serialize_entry("_type", "Function")?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("qualified_name", &self.qualified_name)?;
        map.serialize_entry("line", &self.line)?;
        map.serialize_entry("column", &self.column)?;
        map.serialize_entry("decorators", &self.decorators)?;
        map.serialize_entry("arguments", &self.arguments)?;
        map.serialize_entry("returns", &self.returns)?;
        map.serialize_entry("body", &self.body)?;
        map.end()
    }
}

impl Serialize for IrValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IrValue::Function(function) => function.serialize(serializer),
            IrValue::Node(node) => node.serialize(serializer),
            IrValue::List(items) => items.serialize(serializer),
            IrValue::Scalar(scalar) => scalar.serialize(serializer),
        }
    }
}
