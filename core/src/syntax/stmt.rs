//! file: core/src/syntax/stmt.rs
//! description: parsing helpers for the module and its statements.
//!
//! Turns `module`, `statement` and suite pairs from the pest-generated
//! `RulesParser` into `SyntaxNode`s laid out like Python's `ast` classes
//! (`FunctionDef`, `If`, `Assign`, ...). Every node gets the location and
//! span of the pair it was built from.
//!
use crate::{
    CanopyErrorExt,
    source::Callable,
    syntax::{
        FieldValue, NodeKind, SyntaxNode,
        expr,
        rules::{self, Pair, Rule},
    },
};

type ParseResult<T> = Result<T, Box<dyn CanopyErrorExt>>;

/// Parse the root `module` rule. The resulting `Module` node has no
/// position of its own, like Python's.
pub(crate) fn parse_module_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let mut body = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::statement => body.extend(parse_statement_rule(inner, callable)?),
            Rule::EOI => {}
            other => {
                return Err(rules::syntax_error(
                    format!("Unexpected rule at module level: {:?}", other),
                    "canopy.stmt.parse_module_rule",
                    rules::get_location_from_pair(&inner, callable),
                    rules::get_span_from_pair(&inner, callable),
                ));
            }
        }
    }

    Ok(SyntaxNode::new(NodeKind::Module, None, None)
        .with_field("body", FieldValue::list(body))
        .with_field("type_ignores", FieldValue::List(Vec::new())))
}

/// A single `statement` pair can hold several `;`-separated simple
/// statements, hence the vector.
fn parse_statement_rule(pair: Pair, callable: &Callable) -> ParseResult<Vec<SyntaxNode>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let next_rule = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    match next_rule.as_rule() {
        Rule::simple_statements => parse_simple_statements_rule(next_rule, callable),
        Rule::decorated => Ok(vec![parse_decorated_rule(next_rule, callable)?]),
        Rule::function_def => Ok(vec![parse_function_def_rule(next_rule, Vec::new(), callable)?]),
        Rule::if_statement => Ok(vec![parse_if_rule(next_rule, callable)?]),
        Rule::while_statement => Ok(vec![parse_while_rule(next_rule, callable)?]),
        Rule::for_statement => Ok(vec![parse_for_rule(next_rule, callable)?]),
        other => Err(rules::syntax_error(
            format!("Unexpected statement type: {:?}", other),
            "canopy.stmt.parse_statement_rule",
            location,
            span,
        )),
    }
}

/// Parse the body after a `:`, either an indented block or simple
/// statements on the same line.
fn parse_suite_rule(pair: Pair, callable: &Callable) -> ParseResult<Vec<SyntaxNode>> {
    match pair.as_rule() {
        Rule::block => {
            let mut body = Vec::new();
            for statement in pair.into_inner() {
                body.extend(parse_statement_rule(statement, callable)?);
            }
            Ok(body)
        }
        Rule::simple_statements => parse_simple_statements_rule(pair, callable),
        other => Err(rules::syntax_error(
            format!("Expected a block, found {:?}", other),
            "canopy.stmt.parse_suite_rule",
            rules::get_location_from_pair(&pair, callable),
            rules::get_span_from_pair(&pair, callable),
        )),
    }
}

fn parse_simple_statements_rule(pair: Pair, callable: &Callable) -> ParseResult<Vec<SyntaxNode>> {
    pair.into_inner()
        .map(|statement| parse_simple_statement_rule(statement, callable))
        .collect()
}

fn parse_simple_statement_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    match pair.as_rule() {
        Rule::pass_statement => Ok(rules::node_at(NodeKind::Pass, &pair, callable)),
        Rule::break_statement => Ok(rules::node_at(NodeKind::Break, &pair, callable)),
        Rule::continue_statement => Ok(rules::node_at(NodeKind::Continue, &pair, callable)),
        Rule::return_statement => {
            let value = match inner_pairs.into_iter().next() {
                Some(value_pair) => Some(expr::parse_expression_list_rule(value_pair, callable)?),
                None => None,
            };
            Ok(rules::node_at(NodeKind::Return, &pair, callable).with_field("value", value))
        }
        Rule::assignment => {
            // targets... then the assigned value, with the `=` tokens filtered
            let mut inner_pairs = inner_pairs;
            let Some(value_pair) = inner_pairs.pop() else {
                return Err(rules::syntax_error(
                    "Assignment without a value.".into(),
                    "canopy.stmt.parse_simple_statement_rule",
                    location,
                    span,
                ));
            };
            let targets = inner_pairs
                .into_iter()
                .map(|target| expr::parse_target_list_rule(target, callable).map(FieldValue::from))
                .collect::<ParseResult<Vec<_>>>()?;
            let value = expr::parse_expression_list_rule(value_pair, callable)?;
            Ok(rules::node_at(NodeKind::Assign, &pair, callable)
                .with_field("targets", FieldValue::List(targets))
                .with_field("value", value)
                .with_field("type_comment", FieldValue::none()))
        }
        Rule::aug_assignment => {
            let mut inner_pairs = inner_pairs.into_iter();
            let target_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            let op_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            let value_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;

            let token = op_pair.as_str().trim_end_matches('=');
            let Some(op) = NodeKind::binary_operator(token) else {
                return Err(rules::syntax_error(
                    format!("Invalid augmented assignment operator: {}", op_pair.as_str()),
                    "canopy.stmt.parse_simple_statement_rule",
                    location,
                    span,
                ));
            };
            let target = expr::into_store(expr::parse_expression_rule(target_pair, callable)?)?;
            let value = expr::parse_expression_list_rule(value_pair, callable)?;
            Ok(rules::node_at(NodeKind::AugAssign, &pair, callable)
                .with_field("target", target)
                .with_field("op", SyntaxNode::new(op, None, None))
                .with_field("value", value))
        }
        Rule::expression_statement => {
            let mut inner_pairs = inner_pairs.into_iter();
            let value_pair = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            let value = expr::parse_expression_list_rule(value_pair, callable)?;
            Ok(rules::node_at(NodeKind::Expr, &pair, callable).with_field("value", value))
        }
        other => Err(rules::syntax_error(
            format!("Unexpected simple statement: {:?}", other),
            "canopy.stmt.parse_simple_statement_rule",
            location,
            span,
        )),
    }
}

fn parse_decorated_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let mut decorators = Vec::new();
    for inner in pair.clone().into_inner() {
        match inner.as_rule() {
            Rule::decorator => {
                let (decorator_pairs, location, span) = rules::get_data_from_rule(&inner, callable);
                let mut decorator_pairs = decorator_pairs.into_iter();
                let expression = rules::fetch_next_pair(&mut decorator_pairs, &location, &span)?;
                decorators.push(expr::parse_expression_rule(expression, callable)?);
            }
            Rule::function_def => return parse_function_def_rule(inner, decorators, callable),
            other => {
                return Err(rules::syntax_error(
                    format!("Unexpected rule after decorator: {:?}", other),
                    "canopy.stmt.parse_decorated_rule",
                    rules::get_location_from_pair(&inner, callable),
                    rules::get_span_from_pair(&inner, callable),
                ));
            }
        }
    }

    Err(rules::syntax_error(
        "Decorators must be followed by a function definition.".into(),
        "canopy.stmt.parse_decorated_rule",
        rules::get_location_from_pair(&pair, callable),
        rules::get_span_from_pair(&pair, callable),
    ))
}

/// Parse a `def`. The node is positioned at the `def` keyword; decorators
/// parsed by the caller are attached as `decorator_list`.
fn parse_function_def_rule(
    pair: Pair,
    decorators: Vec<SyntaxNode>,
    callable: &Callable,
) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);

    let mut name = None;
    let mut arguments = None;
    let mut returns = None;
    let mut body = Vec::new();
    for inner in inner_pairs {
        match inner.as_rule() {
            Rule::identifier => name = Some(inner.as_str().to_string()),
            Rule::parameters => arguments = Some(parse_parameters_rule(inner, callable)?),
            Rule::returns => {
                let (annotation_pairs, loc, sp) = rules::get_data_from_rule(&inner, callable);
                let mut annotation_pairs = annotation_pairs.into_iter();
                let annotation = rules::fetch_next_pair(&mut annotation_pairs, &loc, &sp)?;
                returns = Some(expr::parse_expression_rule(annotation, callable)?);
            }
            Rule::block | Rule::simple_statements => body = parse_suite_rule(inner, callable)?,
            other => {
                return Err(rules::syntax_error(
                    format!("Unexpected rule in function definition: {:?}", other),
                    "canopy.stmt.parse_function_def_rule",
                    location,
                    span,
                ));
            }
        }
    }

    let Some(name) = name else {
        return Err(rules::syntax_error(
            "Function definition without a name.".into(),
            "canopy.stmt.parse_function_def_rule",
            location,
            span,
        ));
    };
    let arguments = arguments.unwrap_or_else(|| empty_arguments().finish());

    Ok(rules::node_at(NodeKind::FunctionDef, &pair, callable)
        .with_field("name", FieldValue::str(name))
        .with_field("args", arguments)
        .with_field("body", FieldValue::list(body))
        .with_field("decorator_list", FieldValue::list(decorators))
        .with_field("returns", returns)
        .with_field("type_comment", FieldValue::none()))
}

/// Collected parameters of one `def`, in the buckets of Python's
/// `arguments` node.
#[derive(Default)]
struct ArgumentsBuilder {
    posonlyargs: Vec<SyntaxNode>,
    args: Vec<SyntaxNode>,
    vararg: Option<SyntaxNode>,
    kwonlyargs: Vec<SyntaxNode>,
    kw_defaults: Vec<FieldValue>,
    kwarg: Option<SyntaxNode>,
    defaults: Vec<SyntaxNode>,
    keyword_only: bool,
}

impl ArgumentsBuilder {
    fn finish(self) -> SyntaxNode {
        SyntaxNode::new(NodeKind::Arguments, None, None)
            .with_field("posonlyargs", FieldValue::list(self.posonlyargs))
            .with_field("args", FieldValue::list(self.args))
            .with_field("vararg", self.vararg)
            .with_field("kwonlyargs", FieldValue::list(self.kwonlyargs))
            .with_field("kw_defaults", FieldValue::List(self.kw_defaults))
            .with_field("kwarg", self.kwarg)
            .with_field("defaults", FieldValue::list(self.defaults))
    }
}

fn empty_arguments() -> ArgumentsBuilder {
    ArgumentsBuilder::default()
}

fn parse_parameters_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let mut arguments = empty_arguments();

    for param in pair.into_inner() {
        let location = rules::get_location_from_pair(&param, callable);
        let span = rules::get_span_from_pair(&param, callable);
        match param.as_rule() {
            Rule::positional_marker => {
                if arguments.keyword_only || !arguments.posonlyargs.is_empty() || arguments.args.is_empty() {
                    return Err(rules::syntax_error(
                        "Invalid position for '/' in parameter list.".into(),
                        "canopy.stmt.parse_parameters_rule",
                        location,
                        span,
                    ));
                }
                let mut positional = std::mem::take(&mut arguments.args);
                arguments.posonlyargs.append(&mut positional);
            }
            Rule::plain_parameter => {
                let (arg, default) = parse_parameter_rule(param, callable)?;
                if arguments.keyword_only {
                    arguments.kwonlyargs.push(arg);
                    arguments.kw_defaults.push(FieldValue::from(default));
                } else {
                    match default {
                        Some(default) => arguments.defaults.push(default),
                        None if !arguments.defaults.is_empty() => {
                            return Err(rules::syntax_error(
                                "Non-default argument follows default argument.".into(),
                                "canopy.stmt.parse_parameters_rule",
                                location,
                                span,
                            ));
                        }
                        None => {}
                    }
                    arguments.args.push(arg);
                }
            }
            Rule::varargs_parameter => {
                if arguments.keyword_only {
                    return Err(rules::syntax_error(
                        "Only one '*' is allowed in a parameter list.".into(),
                        "canopy.stmt.parse_parameters_rule",
                        location,
                        span,
                    ));
                }
                arguments.keyword_only = true;
                if param.clone().into_inner().next().is_some() {
                    let (arg, _) = parse_parameter_rule(param, callable)?;
                    arguments.vararg = Some(arg);
                }
            }
            Rule::kwargs_parameter => {
                let (arg, _) = parse_parameter_rule(param, callable)?;
                arguments.kwarg = Some(arg);
            }
            other => {
                return Err(rules::syntax_error(
                    format!("Unexpected parameter rule: {:?}", other),
                    "canopy.stmt.parse_parameters_rule",
                    location,
                    span,
                ));
            }
        }
    }

    Ok(arguments.finish())
}

/// Parse one parameter into an `arg` node plus its default, if any.
fn parse_parameter_rule(pair: Pair, callable: &Callable) -> ParseResult<(SyntaxNode, Option<SyntaxNode>)> {
    let mut name = String::new();
    let mut annotation = None;
    let mut default = None;
    for inner in rules::significant_pairs(&pair) {
        match inner.as_rule() {
            Rule::identifier => name = inner.as_str().to_string(),
            Rule::annotation | Rule::default_value => {
                let (value_pairs, location, span) = rules::get_data_from_rule(&inner, callable);
                let mut value_pairs = value_pairs.into_iter();
                let value = rules::fetch_next_pair(&mut value_pairs, &location, &span)?;
                let value = expr::parse_expression_rule(value, callable)?;
                if inner.as_rule() == Rule::annotation {
                    annotation = Some(value);
                } else {
                    default = Some(value);
                }
            }
            _ => {}
        }
    }

    let arg = rules::node_at(NodeKind::Arg, &pair, callable)
        .with_field("arg", FieldValue::str(name))
        .with_field("annotation", annotation)
        .with_field("type_comment", FieldValue::none());
    Ok((arg, default))
}

/// `if_statement` and `elif_clause` share a shape: test, suite, optional
/// else clause.
fn parse_if_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let test = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let suite = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let orelse = match inner_pairs.next() {
        Some(clause) => parse_else_clause_rule(clause, callable)?,
        None => Vec::new(),
    };

    Ok(rules::node_at(NodeKind::If, &pair, callable)
        .with_field("test", expr::parse_expression_rule(test, callable)?)
        .with_field("body", FieldValue::list(parse_suite_rule(suite, callable)?))
        .with_field("orelse", FieldValue::list(orelse)))
}

fn parse_else_clause_rule(pair: Pair, callable: &Callable) -> ParseResult<Vec<SyntaxNode>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let clause = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    match clause.as_rule() {
        Rule::elif_clause => Ok(vec![parse_if_rule(clause, callable)?]),
        Rule::else_block => parse_else_block_rule(clause, callable),
        other => Err(rules::syntax_error(
            format!("Unexpected else clause: {:?}", other),
            "canopy.stmt.parse_else_clause_rule",
            location,
            span,
        )),
    }
}

fn parse_else_block_rule(pair: Pair, callable: &Callable) -> ParseResult<Vec<SyntaxNode>> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let suite = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    parse_suite_rule(suite, callable)
}

fn parse_loop_else(pair: Option<Pair>, callable: &Callable) -> ParseResult<Vec<SyntaxNode>> {
    let Some(pair) = pair else {
        return Ok(Vec::new());
    };
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let block = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    parse_else_block_rule(block, callable)
}

fn parse_while_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let test = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let suite = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let orelse = parse_loop_else(inner_pairs.next(), callable)?;

    Ok(rules::node_at(NodeKind::While, &pair, callable)
        .with_field("test", expr::parse_expression_rule(test, callable)?)
        .with_field("body", FieldValue::list(parse_suite_rule(suite, callable)?))
        .with_field("orelse", FieldValue::list(orelse)))
}

fn parse_for_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let target = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let iterable = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let suite = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let orelse = parse_loop_else(inner_pairs.next(), callable)?;

    Ok(rules::node_at(NodeKind::For, &pair, callable)
        .with_field("target", expr::parse_target_list_rule(target, callable)?)
        .with_field("iter", expr::parse_expression_list_rule(iterable, callable)?)
        .with_field("body", FieldValue::list(parse_suite_rule(suite, callable)?))
        .with_field("orelse", FieldValue::list(orelse))
        .with_field("type_comment", FieldValue::none()))
}
