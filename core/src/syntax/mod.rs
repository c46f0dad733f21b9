//! Syntax trees: the node model, the pest front-end for Python source and
//! the JSON tree importer.

pub mod err;
pub mod json;
pub mod kind;
pub mod node;
pub mod rules;

mod expr;
mod stmt;

use pest::Parser;

pub use err::{EmptySourceError, SyntaxError};
pub use kind::NodeKind;
pub use node::{FieldValue, Scalar, SyntaxNode};
pub use rules::{Rule, RulesParser};

use crate::{
    CanopyErrorExt, Level,
    source::{Callable, SourceFormat},
};

/// Parse the content of `callable` into a `Module` tree, using the
/// front-end that matches its format.
pub fn generate_tree_from_source(callable: &Callable) -> Result<SyntaxNode, Box<dyn CanopyErrorExt>> {
    if callable.is_empty() {
        return Err(Box::new(EmptySourceError::for_source(&callable.name)));
    }

    match callable.format {
        SourceFormat::Python => parse_python(callable),
        SourceFormat::JsonTree => json::tree_from_json(&callable.content, &callable.name),
    }
}

fn parse_python(callable: &Callable) -> Result<SyntaxNode, Box<dyn CanopyErrorExt>> {
    let mut pairs = match RulesParser::parse(Rule::module, &callable.content) {
        Ok(pairs) => pairs,
        Err(error) => {
            log::debug!("pest rejected {}: {}", callable.name, error);
            return Err(Box::new(SyntaxError::from_pest(&error, &callable.name)));
        }
    };

    match pairs.next() {
        Some(module) => stmt::parse_module_rule(module, callable),
        None => Err(Box::<dyn CanopyErrorExt>::from(Box::new(SyntaxError::with(
            Level::Error,
            "Parser produced no module.".into(),
            "canopy.syntax.parse_python".into(),
            None,
            None,
        )))),
    }
}
