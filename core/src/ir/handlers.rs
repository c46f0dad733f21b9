//! Translation rules for the node kinds that do not take the generic path.
//!
//! Rules are named `on_<kind>` after the lower-cased kind they handle and
//! are dispatched from `IrBuilder::generate_node`.

use crate::{
    graph::GraphRegistry,
    syntax::{Scalar, SyntaxNode},
};

use super::{
    builder::{IrBuilder, TranslateResult, malformed_tree},
    node::{FunctionNode, IrValue, next_node_id},
    scope::ScopeTracker,
};

impl<R: GraphRegistry> IrBuilder<R> {
    /// A module stands for its first statement.
    pub(super) fn on_module<'ast>(
        &mut self,
        node: &'ast SyntaxNode,
        scope: &mut ScopeTracker,
        depth: usize,
    ) -> TranslateResult<IrValue<'ast>> {
        let Some(body) = node.field("body") else {
            return Err(malformed_tree(
                "Module has no `body` field.".to_string(),
                "canopy.ir.handlers.on_module",
                node,
            ));
        };
        let Some(items) = body.as_list() else {
            return Err(malformed_tree(
                "Module `body` is not a sequence.".to_string(),
                "canopy.ir.handlers.on_module",
                node,
            ));
        };
        match items.first() {
            Some(first) => self.generate_at(first, scope, depth + 1),
            None => Err(malformed_tree(
                "Module has no statements.".to_string(),
                "canopy.ir.handlers.on_module",
                node,
            )),
        }
    }

    /// A function definition becomes a `FunctionNode` qualified by the
    /// scope it is declared in. Decorators, arguments and the return
    /// annotation are translated in that scope; the body inside the
    /// function's own.
    pub(super) fn on_functiondef<'ast>(
        &mut self,
        node: &'ast SyntaxNode,
        scope: &mut ScopeTracker,
        depth: usize,
    ) -> TranslateResult<FunctionNode<'ast>> {
        let Some(name) = node.field_str("name") else {
            return Err(malformed_tree(
                "FunctionDef has no `name`.".to_string(),
                "canopy.ir.handlers.on_functiondef",
                node,
            ));
        };
        let Some(body) = node.field_list("body") else {
            return Err(malformed_tree(
                format!("FunctionDef `{}` has no `body` sequence.", name),
                "canopy.ir.handlers.on_functiondef",
                node,
            ));
        };

        let qualified_name = scope.current();
        let decorators = match node.field("decorator_list") {
            Some(value) => self.generate_at(value, scope, depth + 1)?,
            None => IrValue::List(Vec::new()),
        };
        let arguments = self.optional_field(node, "args", scope, depth)?;
        let returns = self.optional_field(node, "returns", scope, depth)?;

        let mut function = FunctionNode {
            id: next_node_id(),
            name: name.to_string(),
            qualified_name,
            line: node.line().unwrap_or(0),
            column: node.column().unwrap_or(0),
            arguments,
            decorators,
            returns,
            body: Vec::with_capacity(body.len()),
            origin: node,
        };

        let mut inner = scope.enter(name);
        self.trace.scope_entered(&inner.current());
        for stmt in body {
            function.body.push(self.generate_at(stmt, &mut inner, depth + 1)?);
        }
        self.trace.scope_completed(&inner.current());

        Ok(function)
    }

    fn optional_field<'ast>(
        &mut self,
        node: &'ast SyntaxNode,
        field: &str,
        scope: &mut ScopeTracker,
        depth: usize,
    ) -> TranslateResult<IrValue<'ast>> {
        match node.field(field) {
            Some(value) => self.generate_at(value, scope, depth + 1),
            None => Ok(IrValue::Scalar(Scalar::None)),
        }
    }
}
