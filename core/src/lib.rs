pub mod error;
pub mod graph;
pub mod ir;
pub mod location;
pub mod source;
pub mod syntax;

pub use error::{CanopyErrorExt, Level};
pub use graph::{GraphRegistry, MemoryRegistry, NullRegistry, RegisteredFunction};
pub use ir::{BuilderConfig, FunctionNode, GenericNode, IrBuilder, IrValue, ScopeTracker};
pub use location::{Location, Span};
pub use source::{Callable, SourceFormat};
pub use syntax::{NodeKind, SyntaxNode, generate_tree_from_source};

pub fn generate_error_report<E: CanopyErrorExt + ?Sized>(error: &E) -> String {
    let level = error.level();
    let location = match error.location() {
        Some(loc) => loc.to_string(),
        None => "unknown location".to_string(),
    };
    let message = error.message();

    format!("CANOPY | {} | {} | {}", level, location, message)
}

/// Parse `callable` and prepare its tree for translation with `config`.
/// The returned tree is what [`IrBuilder::translate`] expects.
pub fn load_function(callable: &Callable, config: &BuilderConfig) -> Result<SyntaxNode, Box<dyn CanopyErrorExt>> {
    let mut tree = generate_tree_from_source(callable)?;
    IrBuilder::new(config.clone()).prepare_tree(&mut tree);
    Ok(tree)
}
