//! Errors raised by the front-ends before any tree exists.

use crate::error::{CanopyErrorExt, Level};
use crate::location::{Location, Span};

use super::rules::Rule;

/// Declares a front-end error: the struct, its `Display` and the
/// `CanopyErrorExt` accessors. Constructors are written per error.
macro_rules! front_end_error {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            level: Level,
            message: String,
            issuer: String,
            location: Option<Location>,
            span: Option<Span>,
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match &self.location {
                    Some(loc) => write!(f, "{} (at {})", self.message, loc),
                    None => write!(f, "{}", self.message),
                }
            }
        }

        impl std::error::Error for $name {}

        impl CanopyErrorExt for $name {
            fn level(&self) -> Level {
                self.level
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
    };
}

front_end_error!(
    /// The callable has no content to parse.
    EmptySourceError
);

front_end_error!(
    /// Source text or a serialized tree cannot be parsed.
    SyntaxError
);

impl EmptySourceError {
    /// Points at the start of the named source.
    pub fn for_source(name: &str) -> Self {
        EmptySourceError {
            level: Level::Error,
            message: format!("The source of `{}` is empty.", name),
            issuer: "canopy.syntax.generate_tree_from_source".to_string(),
            location: Some(Location::new(name.to_string(), 1, 0)),
            span: None,
        }
    }
}

impl SyntaxError {
    pub fn with(level: Level, message: String, issuer: String, location: Option<Location>, span: Option<Span>) -> Self {
        SyntaxError {
            level,
            message,
            issuer,
            location,
            span,
        }
    }

    /// Convert a pest failure. pest columns are 1-based, ours are 0-based.
    pub fn from_pest(error: &pest::error::Error<Rule>, file: &str) -> Self {
        let (start, end) = match error.line_col {
            pest::error::LineColLocation::Pos(pos) => (pos, pos),
            pest::error::LineColLocation::Span(start, end) => (start, end),
        };
        let location = Location::new(file.to_string(), start.0, start.1.saturating_sub(1));
        let span = Span::new(
            location.clone(),
            Location::new(file.to_string(), end.0, end.1.saturating_sub(1)),
        );
        SyntaxError {
            level: Level::Error,
            message: format!("Invalid syntax: {}", error.variant.message()),
            issuer: "canopy.syntax.parse_python".to_string(),
            location: Some(location),
            span: Some(span),
        }
    }
}
