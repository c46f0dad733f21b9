//! file: core/src/ir/builder.rs
//! description: recursive translation of syntax trees into IR.
//!
//! `IrBuilder` walks a tree depth first. Kinds with a translation rule
//! (see `handlers.rs`) are handed to it; every other node becomes a
//! `GenericNode` holding all of its fields, translated in order. A
//! `ScopeTracker` is threaded through the recursion so function rules can
//! qualify the names they declare.

use crate::{
    CanopyErrorExt,
    graph::{GraphRegistry, NullRegistry},
    syntax::{FieldValue, NodeKind, SyntaxNode},
};

use super::{
    config::BuilderConfig,
    err::{DepthLimitError, MalformedTreeError, UnsupportedShapeError},
    node::{FunctionNode, GenericNode, IrValue},
    scope::ScopeTracker,
    trace::{LogTrace, TraceSink},
};

pub type TranslateResult<T> = Result<T, Box<dyn CanopyErrorExt>>;

/// Grow the stack when less than this remains before descending a level.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const STACK_SEGMENT: usize = 1024 * 1024;

/// Run `f` with at least [`RED_ZONE`] bytes of stack available, so a tree
/// up to `max_depth` levels deep cannot exhaust a small thread stack.
#[inline]
fn ensure_sufficient_stack<T>(f: impl FnOnce() -> T) -> T {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}

pub struct IrBuilder<R: GraphRegistry = NullRegistry> {
    pub(super) config: BuilderConfig,
    pub(super) trace: Box<dyn TraceSink>,
    pub(super) registry: R,
}

impl Default for IrBuilder {
    fn default() -> Self {
        IrBuilder::new(BuilderConfig::default())
    }
}

impl IrBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        IrBuilder {
            config,
            trace: Box::new(LogTrace),
            registry: NullRegistry,
        }
    }
}

impl<R: GraphRegistry> IrBuilder<R> {
    /// Swap the registry that receives completed translations.
    pub fn with_registry<Q: GraphRegistry>(self, registry: Q) -> IrBuilder<Q> {
        IrBuilder {
            config: self.config,
            trace: self.trace,
            registry,
        }
    }

    pub fn with_trace(mut self, trace: impl TraceSink + 'static) -> Self {
        self.trace = Box::new(trace);
        self
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn into_registry(self) -> R {
        self.registry
    }

    /// Move every line number of a decorated function up so that the
    /// `def` line takes the place of its first decorator. `tree` is either
    /// the function definition or a module whose first statement is one.
    pub fn prepare_tree(&self, tree: &mut SyntaxNode) {
        if !self.config.discount_decorators {
            return;
        }
        if let Some(offset) = decorator_offset(tree) {
            log::debug!("discounting {} decorator line(s)", offset);
            tree.increment_lineno(-(offset as isize));
        }
    }

    /// Translate the function at the root of `tree` with no enclosing
    /// scope and register the result.
    ///
    /// Line numbers are taken from `tree` as given: decorator discounting
    /// happens in [`prepare_tree`](Self::prepare_tree), which callers run
    /// first (or use [`load_function`](crate::load_function), which does).
    pub fn translate<'ast>(&mut self, tree: &'ast SyntaxNode) -> TranslateResult<FunctionNode<'ast>> {
        let mut scope = ScopeTracker::with_separator(self.config.separator.clone());
        self.translate_in(&mut scope, tree)
    }

    /// Like [`translate`](Self::translate), but qualified by the scopes
    /// already entered on `scope`. The scope is back at its prior depth when
    /// this returns, whether or not translation succeeded.
    pub fn translate_in<'ast>(
        &mut self,
        scope: &mut ScopeTracker,
        tree: &'ast SyntaxNode,
    ) -> TranslateResult<FunctionNode<'ast>> {
        let depth_before = scope.depth();
        let result = self.generate_node(tree, scope, 0);
        debug_assert_eq!(depth_before, scope.depth(), "unbalanced scope stack");

        match result? {
            IrValue::Function(function) => {
                self.registry.register(&function);
                Ok(*function)
            }
            other => Err(malformed_tree(
                format!(
                    "Root of the tree does not resolve to a function definition (got {}).",
                    describe(&other)
                ),
                "canopy.ir.builder.translate_in",
                tree,
            )),
        }
    }

    /// Translate any field value met in a tree.
    pub fn generate<'ast>(
        &mut self,
        value: &'ast FieldValue,
        scope: &mut ScopeTracker,
    ) -> TranslateResult<IrValue<'ast>> {
        self.generate_at(value, scope, 0)
    }

    /// Sequences keep the depth of their owner; only nodes count.
    pub(super) fn generate_at<'ast>(
        &mut self,
        value: &'ast FieldValue,
        scope: &mut ScopeTracker,
        depth: usize,
    ) -> TranslateResult<IrValue<'ast>> {
        match value {
            FieldValue::List(items) => {
                let mut translated = Vec::with_capacity(items.len());
                for item in items {
                    translated.push(self.generate_at(item, scope, depth)?);
                }
                Ok(IrValue::List(translated))
            }
            FieldValue::Node(node) => self.generate_node(node, scope, depth),
            FieldValue::Scalar(scalar) => Ok(IrValue::Scalar(scalar.clone())),
            FieldValue::Opaque(raw) => Err(unsupported_shape(None, None, raw, None)),
        }
    }

    pub(super) fn generate_node<'ast>(
        &mut self,
        node: &'ast SyntaxNode,
        scope: &mut ScopeTracker,
        depth: usize,
    ) -> TranslateResult<IrValue<'ast>> {
        if depth > self.config.max_depth {
            return Err(depth_limit(self.config.max_depth, node));
        }

        ensure_sufficient_stack(|| match node.kind {
            NodeKind::Module => {
                log::trace!("{} at depth {}", node.kind.handler_name(), depth);
                self.on_module(node, scope, depth)
            }
            NodeKind::FunctionDef => {
                log::trace!("{} at depth {}", node.kind.handler_name(), depth);
                let function = self.on_functiondef(node, scope, depth)?;
                Ok(IrValue::Function(Box::new(function)))
            }
            _ => self.generic_node(node, scope, depth),
        })
    }

    fn generic_node<'ast>(
        &mut self,
        node: &'ast SyntaxNode,
        scope: &mut ScopeTracker,
        depth: usize,
    ) -> TranslateResult<IrValue<'ast>> {
        let mut generic = GenericNode::new(node);
        for (name, value) in &node.fields {
            let translated = match value {
                FieldValue::Opaque(raw) => {
                    return Err(unsupported_shape(Some(node), Some(name.as_str()), raw, node.location.clone()));
                }
                other => self.generate_at(other, scope, depth + 1)?,
            };
            generic.fields.insert(name.clone(), translated);
        }
        Ok(IrValue::Node(generic))
    }
}

/// Lines between the first decorator and the `def` of the function at the
/// root of `tree`.
fn decorator_offset(tree: &SyntaxNode) -> Option<usize> {
    let function = match tree.kind {
        NodeKind::FunctionDef => tree,
        NodeKind::Module => tree.field_list("body")?.first()?.as_node()?,
        _ => return None,
    };
    if function.kind != NodeKind::FunctionDef {
        return None;
    }

    let def_line = function.line()?;
    let first_decorator = function
        .field_list("decorator_list")?
        .iter()
        .filter_map(FieldValue::as_node)
        .filter_map(SyntaxNode::line)
        .min()?;
    def_line.checked_sub(first_decorator).filter(|offset| *offset > 0)
}

fn describe(value: &IrValue<'_>) -> String {
    match value {
        IrValue::Function(function) => format!("function `{}`", function.name),
        IrValue::Node(node) => node.origin.kind.to_string(),
        IrValue::List(_) => "a sequence".to_string(),
        IrValue::Scalar(scalar) => format!("scalar {}", scalar),
    }
}

pub(super) fn malformed_tree(message: String, issuer: &str, node: &SyntaxNode) -> Box<dyn CanopyErrorExt> {
    Box::new(MalformedTreeError::with(
        message,
        issuer.to_string(),
        node.location.clone(),
        node.span.clone(),
    ))
}

fn unsupported_shape(
    parent: Option<&SyntaxNode>,
    field: Option<&str>,
    raw: &serde_json::Value,
    location: Option<crate::location::Location>,
) -> Box<dyn CanopyErrorExt> {
    Box::new(UnsupportedShapeError::new(
        parent.map(|node| node.kind.tag()),
        field,
        raw,
        location,
        parent.and_then(|node| node.span.clone()),
    ))
}

fn depth_limit(limit: usize, node: &SyntaxNode) -> Box<dyn CanopyErrorExt> {
    Box::new(DepthLimitError::new(limit, node.location.clone()))
}
