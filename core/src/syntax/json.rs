//! JSON form of syntax trees.
//!
//! Nodes are objects tagged with `_type` (the Python `ast` class name);
//! their remaining members are fields, in document order. The position
//! members `lineno`, `col_offset`, `end_lineno` and `end_col_offset` are
//! lifted into the node's location and span. An object without `_type`
//! is kept as an opaque value.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::{
    CanopyErrorExt,
    location::{Location, Span},
    syntax::{FieldValue, NodeKind, Scalar, SyntaxNode, rules},
};

const TYPE_KEY: &str = "_type";
const POSITION_KEYS: [&str; 4] = ["lineno", "col_offset", "end_lineno", "end_col_offset"];

/// Import a tree serialized as JSON. The root must be a tagged node.
pub fn tree_from_json(text: &str, file: &str) -> Result<SyntaxNode, Box<dyn CanopyErrorExt>> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        let location = Location::new(file.to_string(), err.line(), err.column().saturating_sub(1));
        rules::syntax_error(
            format!("Invalid JSON tree: {}", err),
            "canopy.syntax.json.tree_from_json",
            Some(location),
            None,
        )
    })?;

    match &value {
        Value::Object(map) if map.contains_key(TYPE_KEY) => node_from_object(map, file),
        _ => Err(rules::syntax_error(
            "The root of a JSON tree must be an object with a `_type` member.".into(),
            "canopy.syntax.json.tree_from_json",
            Some(Location::new(file.to_string(), 1, 0)),
            None,
        )),
    }
}

fn node_from_object(map: &Map<String, Value>, file: &str) -> Result<SyntaxNode, Box<dyn CanopyErrorExt>> {
    let tag = match map.get(TYPE_KEY) {
        Some(Value::String(tag)) => tag.as_str(),
        other => {
            return Err(rules::syntax_error(
                format!("`_type` must be a string, found {:?}", other),
                "canopy.syntax.json.node_from_object",
                None,
                None,
            ));
        }
    };

    let position = |key: &str| map.get(key).and_then(Value::as_u64).map(|v| v as usize);
    let location = match (position("lineno"), position("col_offset")) {
        (Some(line), Some(column)) => Some(Location::new(file.to_string(), line, column)),
        (Some(line), None) => Some(Location::new(file.to_string(), line, 0)),
        _ => None,
    };
    let span = match (&location, position("end_lineno"), position("end_col_offset")) {
        (Some(start), Some(end_line), Some(end_column)) => Some(Span::new(
            start.clone(),
            Location::new(file.to_string(), end_line, end_column),
        )),
        _ => None,
    };

    let mut node = SyntaxNode::new(NodeKind::from_tag(tag), location, span);
    for (name, value) in map {
        if name == TYPE_KEY || POSITION_KEYS.contains(&name.as_str()) {
            continue;
        }
        node.fields.insert(name.clone(), field_from_value(value, file)?);
    }
    Ok(node)
}

fn field_from_value(value: &Value, file: &str) -> Result<FieldValue, Box<dyn CanopyErrorExt>> {
    let field = match value {
        Value::Null => FieldValue::none(),
        Value::Bool(b) => FieldValue::Scalar(Scalar::Bool(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => FieldValue::Scalar(Scalar::Int(i)),
            (None, Some(f)) => FieldValue::Scalar(Scalar::Float(f)),
            (None, None) => FieldValue::Opaque(value.clone()),
        },
        Value::String(s) => FieldValue::str(s.clone()),
        Value::Array(items) => FieldValue::List(
            items
                .iter()
                .map(|item| field_from_value(item, file))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Object(map) if map.contains_key(TYPE_KEY) => FieldValue::from(node_from_object(map, file)?),
        Value::Object(_) => FieldValue::Opaque(value.clone()),
    };
    Ok(field)
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::None => serializer.serialize_none(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Scalar(scalar) => scalar.serialize(serializer),
            FieldValue::Node(node) => node.serialize(serializer),
            FieldValue::List(items) => items.serialize(serializer),
            FieldValue::Opaque(raw) => raw.serialize(serializer),
        }
    }
}

impl Serialize for SyntaxNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(TYPE_KEY, self.kind.tag())?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        if let Some(location) = &self.location {
            map.serialize_entry("lineno", &location.line)?;
            map.serialize_entry("col_offset", &location.column)?;
        }
        if let Some(span) = &self.span {
            map.serialize_entry("end_lineno", &span.end.line)?;
            map.serialize_entry("end_col_offset", &span.end.column)?;
        }
        map.end()
    }
}

/// Render a tree in the format [`tree_from_json`] reads.
pub fn tree_to_json(tree: &SyntaxNode) -> Result<String, Box<dyn CanopyErrorExt>> {
    serde_json::to_string_pretty(tree).map_err(|err| {
        rules::syntax_error(
            format!("Cannot serialize tree: {}", err),
            "canopy.syntax.json.tree_to_json",
            tree.location.clone(),
            None,
        )
    })
}
