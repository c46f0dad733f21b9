//! Errors raised while translating a syntax tree into IR.
//!
//! Each implements `CanopyErrorExt` so the CLI can report them through
//! `generate_error_report` alongside front-end errors.

use crate::error::{CanopyErrorExt, Level};
use crate::location::{Location, Span};

/// A value in the tree fits none of the shapes the builder understands.
#[derive(Debug, Clone)]
pub struct UnsupportedShapeError {
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl UnsupportedShapeError {
    /// `parent` and `field` name where the value was met, when known.
    pub fn new(
        parent: Option<&str>,
        field: Option<&str>,
        raw: &serde_json::Value,
        location: Option<Location>,
        span: Option<Span>,
    ) -> Self {
        let site = match (parent, field) {
            (Some(parent), Some(field)) => format!(" in field `{}` of {}", field, parent),
            (Some(parent), None) => format!(" under {}", parent),
            _ => String::new(),
        };
        UnsupportedShapeError {
            message: format!("Unsupported node shape{}: {}", site, raw),
            issuer: "canopy.ir.builder.generate".to_string(),
            location,
            span,
        }
    }
}

impl std::fmt::Display for UnsupportedShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UnsupportedShapeError {}

impl CanopyErrorExt for UnsupportedShapeError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        self.issuer.clone()
    }

    fn span(&self) -> Option<Span> {
        self.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

/// The tree is missing something a translation rule requires.
#[derive(Debug, Clone)]
pub struct MalformedTreeError {
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl MalformedTreeError {
    pub fn with(message: String, issuer: String, location: Option<Location>, span: Option<Span>) -> Self {
        MalformedTreeError {
            message,
            issuer,
            location,
            span,
        }
    }
}

impl std::fmt::Display for MalformedTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} (at {})", self.message, loc),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for MalformedTreeError {}

impl CanopyErrorExt for MalformedTreeError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        self.issuer.clone()
    }

    fn span(&self) -> Option<Span> {
        self.span.clone()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

#[derive(Debug, Clone)]
pub struct DepthLimitError {
    limit: usize,
    location: Option<Location>,
}

impl DepthLimitError {
    pub fn new(limit: usize, location: Option<Location>) -> Self {
        DepthLimitError { limit, location }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl std::fmt::Display for DepthLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tree is nested deeper than {} levels.", self.limit)
    }
}

impl std::error::Error for DepthLimitError {}

impl CanopyErrorExt for DepthLimitError {
    fn level(&self) -> Level {
        Level::Critical
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "canopy.ir.builder.generate_node".to_string()
    }

    fn span(&self) -> Option<Span> {
        None
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

/// A translated function could not be turned into JSON.
#[derive(Debug, Clone)]
pub struct ExportError {
    function: String,
    cause: String,
    location: Option<Location>,
}

impl ExportError {
    pub fn new(function: &str, cause: &serde_json::Error, location: Option<Location>) -> Self {
        ExportError {
            function: function.to_string(),
            cause: cause.to_string(),
            location,
        }
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cannot export function `{}`: {}", self.function, self.cause)
    }
}

impl std::error::Error for ExportError {}

impl CanopyErrorExt for ExportError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "canopy.ir.node.to_json".to_string()
    }

    fn span(&self) -> Option<Span> {
        None
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}
