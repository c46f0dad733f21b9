//! file: core/src/graph/mod.rs
//! description: the hook that receives finished function translations.
//!
//! `IrBuilder::translate` hands every top-level `FunctionNode` it completes
//! to a `GraphRegistry`. What a registry does with it (graph insertion,
//! deduplication, edges) is up to the implementation; the two provided here
//! either ignore the function or record a summary of it.

use crate::ir::{FunctionNode, NodeId};

pub trait GraphRegistry {
    fn register(&mut self, function: &FunctionNode<'_>);
}

impl<R: GraphRegistry + ?Sized> GraphRegistry for &mut R {
    fn register(&mut self, function: &FunctionNode<'_>) {
        (**self).register(function);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRegistry;

impl GraphRegistry for NullRegistry {
    fn register(&mut self, _function: &FunctionNode<'_>) {}
}

/// What `MemoryRegistry` keeps of a function. Owns its data, so it outlives
/// the syntax tree the function was translated from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RegisteredFunction {
    pub id: NodeId,
    pub name: String,
    pub qualified_name: String,
    pub line: usize,
    pub column: usize,
    pub node_count: usize,
}

/// Records functions in registration order. Registering the same function
/// twice records it twice.
#[derive(Debug, Default, Clone)]
pub struct MemoryRegistry {
    functions: Vec<RegisteredFunction>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        MemoryRegistry::default()
    }

    pub fn functions(&self) -> &[RegisteredFunction] {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&RegisteredFunction> {
        self.functions.iter().find(|function| function.name == name)
    }
}

impl GraphRegistry for MemoryRegistry {
    fn register(&mut self, function: &FunctionNode<'_>) {
        log::debug!("registering function `{}` (id {})", function.name, function.id);
        self.functions.push(RegisteredFunction {
            id: function.id,
            name: function.name.clone(),
            qualified_name: function.qualified_name.clone(),
            line: function.line,
            column: function.column,
            node_count: function.node_count(),
        });
    }
}
