use crate::{
    CanopyErrorExt,
    location::Span,
    source::Callable,
    syntax::{
        FieldValue, NodeKind, Scalar, SyntaxNode,
        rules::{self, Pair, Rule},
    },
};

type ParseResult<T> = Result<T, Box<dyn CanopyErrorExt>>;

/// Expression context marker (`Load` / `Store`). Python gives these no
/// position.
fn context(kind: NodeKind) -> SyntaxNode {
    SyntaxNode::new(kind, None, None)
}

fn operator(kind: NodeKind) -> SyntaxNode {
    SyntaxNode::new(kind, None, None)
}

/// A node positioned at `first` whose span runs to the end of `last`.
fn node_spanning(kind: NodeKind, first: &Pair, last: &Pair, callable: &Callable) -> SyntaxNode {
    let node = rules::node_at(kind, first, callable);
    match (
        rules::get_span_from_pair(first, callable),
        rules::get_span_from_pair(last, callable),
    ) {
        (Some(start), Some(end)) => node.with_span(Span::new(start.start, end.end)),
        _ => node,
    }
}

/// Parse an `expression_list`/`target_list`: a single expression stays as
/// is, several (or a trailing comma) build a `Tuple`.
pub(crate) fn parse_expression_list_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let mut elts = Vec::new();
    let mut trailing_comma = false;
    for inner in rules::significant_pairs(&pair) {
        match inner.as_rule() {
            Rule::trailing_comma => trailing_comma = true,
            _ => elts.push(parse_expression_rule(inner, callable)?),
        }
    }

    if elts.len() == 1 && !trailing_comma {
        return Ok(elts.remove(0));
    }

    Ok(rules::node_at(NodeKind::Tuple, &pair, callable)
        .with_field("elts", FieldValue::list(elts))
        .with_field("ctx", context(NodeKind::Load)))
}

pub(crate) fn parse_target_list_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    into_store(parse_expression_list_rule(pair, callable)?)
}

/// Rewrite an expression parsed in load context into an assignment
/// target. Tuples and lists are rewritten element by element.
pub(crate) fn into_store(mut node: SyntaxNode) -> ParseResult<SyntaxNode> {
    if !node.kind.is_assignable() {
        return Err(rules::syntax_error(
            format!("Cannot assign to {}.", node.kind),
            "canopy.expr.into_store",
            node.location.clone(),
            node.span.clone(),
        ));
    }

    if matches!(node.kind, NodeKind::Tuple | NodeKind::List) {
        if let Some(FieldValue::List(elts)) = node.field_mut("elts") {
            let mut stored = Vec::with_capacity(elts.len());
            for elt in std::mem::take(elts) {
                match elt {
                    FieldValue::Node(inner) => stored.push(FieldValue::from(into_store(*inner)?)),
                    other => stored.push(other),
                }
            }
            *elts = stored;
        }
    }

    node.fields.insert("ctx".to_string(), FieldValue::from(context(NodeKind::Store)));
    Ok(node)
}

pub(crate) fn parse_expression_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    match pair.as_rule() {
        Rule::expression => parse_conditional_rule(pair, callable),
        Rule::disjunction => parse_bool_op_rule(pair, NodeKind::Or, callable),
        Rule::conjunction => parse_bool_op_rule(pair, NodeKind::And, callable),
        Rule::inversion => parse_inversion_rule(pair, callable),
        Rule::comparison => parse_comparison_rule(pair, callable),
        Rule::sum | Rule::term => parse_binary_chain_rule(pair, callable),
        Rule::factor => parse_factor_rule(pair, callable),
        Rule::power => parse_power_rule(pair, callable),
        Rule::primary => parse_primary_rule(pair, callable),
        Rule::target => {
            let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
            let mut inner_pairs = inner_pairs.into_iter();
            let primary = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
            parse_expression_rule(primary, callable)
        }
        Rule::expression_list | Rule::target_list => parse_expression_list_rule(pair, callable),
        Rule::parenthesized => match pair.clone().into_inner().next() {
            Some(contents) => parse_expression_list_rule(contents, callable),
            None => Ok(rules::node_at(NodeKind::Tuple, &pair, callable)
                .with_field("elts", FieldValue::List(Vec::new()))
                .with_field("ctx", context(NodeKind::Load))),
        },
        Rule::list_display => {
            let elts = pair
                .clone()
                .into_inner()
                .map(|elt| parse_expression_rule(elt, callable))
                .collect::<ParseResult<Vec<_>>>()?;
            Ok(rules::node_at(NodeKind::List, &pair, callable)
                .with_field("elts", FieldValue::list(elts))
                .with_field("ctx", context(NodeKind::Load)))
        }
        Rule::identifier => Ok(rules::node_at(NodeKind::Name, &pair, callable)
            .with_field("id", FieldValue::str(pair.as_str()))
            .with_field("ctx", context(NodeKind::Load))),
        Rule::none_literal => Ok(constant(Scalar::None, &pair, callable)),
        Rule::true_literal => Ok(constant(Scalar::Bool(true), &pair, callable)),
        Rule::false_literal => Ok(constant(Scalar::Bool(false), &pair, callable)),
        Rule::integer => {
            let digits = pair.as_str().replace('_', "");
            match digits.parse::<i64>() {
                Ok(value) => Ok(constant(Scalar::Int(value), &pair, callable)),
                Err(_) => Err(rules::syntax_error(
                    format!("Integer literal out of range: {}", pair.as_str()),
                    "canopy.expr.parse_expression_rule",
                    rules::get_location_from_pair(&pair, callable),
                    rules::get_span_from_pair(&pair, callable),
                )),
            }
        }
        Rule::float => {
            let digits = pair.as_str().replace('_', "");
            match digits.parse::<f64>() {
                Ok(value) => Ok(constant(Scalar::Float(value), &pair, callable)),
                Err(_) => Err(rules::syntax_error(
                    format!("Invalid float literal: {}", pair.as_str()),
                    "canopy.expr.parse_expression_rule",
                    rules::get_location_from_pair(&pair, callable),
                    rules::get_span_from_pair(&pair, callable),
                )),
            }
        }
        Rule::string => Ok(constant(Scalar::Str(unescape_string(pair.as_str())), &pair, callable)),
        other => Err(rules::syntax_error(
            format!("Unexpected expression type: {:?}", other),
            "canopy.expr.parse_expression_rule",
            rules::get_location_from_pair(&pair, callable),
            rules::get_span_from_pair(&pair, callable),
        )),
    }
}

fn constant(value: Scalar, pair: &Pair, callable: &Callable) -> SyntaxNode {
    rules::node_at(NodeKind::Constant, pair, callable)
        .with_field("value", value)
        .with_field("kind", FieldValue::none())
}

/// Strip the quotes of a string literal and resolve its escapes.
fn unescape_string(raw: &str) -> String {
    let body = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// `body if test else orelse`
fn parse_conditional_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let body = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let body = parse_expression_rule(body, callable)?;

    let Some(test) = inner_pairs.next() else {
        return Ok(body);
    };
    let orelse = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;

    Ok(rules::node_at(NodeKind::IfExp, &pair, callable)
        .with_field("test", parse_expression_rule(test, callable)?)
        .with_field("body", body)
        .with_field("orelse", parse_expression_rule(orelse, callable)?))
}

/// `a or b or c` folds into a single `BoolOp` with three values.
fn parse_bool_op_rule(pair: Pair, op: NodeKind, callable: &Callable) -> ParseResult<SyntaxNode> {
    let mut operands = rules::significant_pairs(&pair);
    if operands.len() == 1 {
        return parse_expression_rule(operands.remove(0), callable);
    }

    let values = operands
        .into_iter()
        .map(|operand| parse_expression_rule(operand, callable))
        .collect::<ParseResult<Vec<_>>>()?;
    Ok(rules::node_at(NodeKind::BoolOp, &pair, callable)
        .with_field("op", operator(op))
        .with_field("values", FieldValue::list(values)))
}

fn parse_inversion_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let negated = pair
        .clone()
        .into_inner()
        .next()
        .is_some_and(|first| first.as_rule() == Rule::kw_not);

    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let operand = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let operand = parse_expression_rule(operand, callable)?;
    if !negated {
        return Ok(operand);
    }

    Ok(rules::node_at(NodeKind::UnaryOp, &pair, callable)
        .with_field("op", operator(NodeKind::Not))
        .with_field("operand", operand))
}

fn parse_comparison_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let left = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let left = parse_expression_rule(left, callable)?;

    let mut ops = Vec::new();
    let mut comparators = Vec::new();
    while let Some(op_pair) = inner_pairs.next() {
        let token = op_pair.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        let Some(op) = NodeKind::comparison_operator(&token) else {
            return Err(rules::syntax_error(
                format!("Invalid comparison operator: {}", op_pair.as_str()),
                "canopy.expr.parse_comparison_rule",
                location,
                span,
            ));
        };
        let right = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
        ops.push(operator(op));
        comparators.push(parse_expression_rule(right, callable)?);
    }

    if ops.is_empty() {
        return Ok(left);
    }

    Ok(rules::node_at(NodeKind::Compare, &pair, callable)
        .with_field("left", left)
        .with_field("ops", FieldValue::list(ops))
        .with_field("comparators", FieldValue::list(comparators)))
}

/// Left-associative `operand (op operand)*` chains for `sum` and `term`.
fn parse_binary_chain_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let first = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let mut node = parse_expression_rule(first.clone(), callable)?;

    while let Some(op_pair) = inner_pairs.next() {
        let Some(op) = NodeKind::binary_operator(op_pair.as_str()) else {
            return Err(rules::syntax_error(
                format!("Invalid binary operator: {}", op_pair.as_str()),
                "canopy.expr.parse_binary_chain_rule",
                location,
                span,
            ));
        };
        let right_pair = match inner_pairs.next() {
            Some(right_pair) => right_pair,
            None => {
                return Err(rules::syntax_error(
                    "Missing right-hand operand for binary operator.".into(),
                    "canopy.expr.parse_binary_chain_rule",
                    location,
                    span,
                ));
            }
        };
        let right = parse_expression_rule(right_pair.clone(), callable)?;

        node = node_spanning(NodeKind::BinOp, &first, &right_pair, callable)
            .with_field("left", node)
            .with_field("op", operator(op))
            .with_field("right", right);
    }

    Ok(node)
}

fn parse_factor_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let first = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    if first.as_rule() != Rule::unary_op {
        return parse_expression_rule(first, callable);
    }

    let Some(op) = NodeKind::unary_operator(first.as_str()) else {
        return Err(rules::syntax_error(
            format!("Invalid unary operator: {}", first.as_str()),
            "canopy.expr.parse_factor_rule",
            location,
            span,
        ));
    };
    let operand = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    Ok(rules::node_at(NodeKind::UnaryOp, &pair, callable)
        .with_field("op", operator(op))
        .with_field("operand", parse_expression_rule(operand, callable)?))
}

fn parse_power_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let base = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let base = parse_expression_rule(base, callable)?;
    match inner_pairs.next() {
        Some(exponent) => Ok(rules::node_at(NodeKind::BinOp, &pair, callable)
            .with_field("left", base)
            .with_field("op", operator(NodeKind::Pow))
            .with_field("right", parse_expression_rule(exponent, callable)?)),
        None => Ok(base),
    }
}

/// An atom followed by any number of call, attribute and subscript
/// trailers, applied left to right.
fn parse_primary_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let atom = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let mut node = parse_expression_rule(atom.clone(), callable)?;

    for trailer in inner_pairs {
        node = match trailer.as_rule() {
            Rule::call => {
                let mut args = Vec::new();
                let mut keywords = Vec::new();
                for argument in rules::significant_pairs(&trailer) {
                    if argument.as_rule() == Rule::keyword_argument {
                        keywords.push(parse_keyword_argument_rule(argument, callable)?);
                    } else {
                        args.push(parse_expression_rule(argument, callable)?);
                    }
                }
                node_spanning(NodeKind::Call, &atom, &trailer, callable)
                    .with_field("func", node)
                    .with_field("args", FieldValue::list(args))
                    .with_field("keywords", FieldValue::list(keywords))
            }
            Rule::attribute => {
                let attr = trailer
                    .clone()
                    .into_inner()
                    .next()
                    .map(|name| name.as_str().to_string())
                    .unwrap_or_default();
                node_spanning(NodeKind::Attribute, &atom, &trailer, callable)
                    .with_field("value", node)
                    .with_field("attr", FieldValue::str(attr))
                    .with_field("ctx", context(NodeKind::Load))
            }
            Rule::subscript => {
                let (index_pairs, loc, sp) = rules::get_data_from_rule(&trailer, callable);
                let mut index_pairs = index_pairs.into_iter();
                let index = rules::fetch_next_pair(&mut index_pairs, &loc, &sp)?;
                node_spanning(NodeKind::Subscript, &atom, &trailer, callable)
                    .with_field("value", node)
                    .with_field("slice", parse_expression_list_rule(index, callable)?)
                    .with_field("ctx", context(NodeKind::Load))
            }
            other => {
                return Err(rules::syntax_error(
                    format!("Unexpected trailer: {:?}", other),
                    "canopy.expr.parse_primary_rule",
                    location,
                    span,
                ));
            }
        };
    }

    Ok(node)
}

fn parse_keyword_argument_rule(pair: Pair, callable: &Callable) -> ParseResult<SyntaxNode> {
    let (inner_pairs, location, span) = rules::get_data_from_rule(&pair, callable);
    let mut inner_pairs = inner_pairs.into_iter();
    let name = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    let value = rules::fetch_next_pair(&mut inner_pairs, &location, &span)?;
    Ok(rules::node_at(NodeKind::Keyword, &pair, callable)
        .with_field("arg", FieldValue::str(name.as_str()))
        .with_field("value", parse_expression_rule(value, callable)?))
}
