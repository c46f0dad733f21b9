use pest_derive::Parser;

use crate::{location, CanopyErrorExt};

#[derive(Parser)]
#[grammar = "grammar.pest"]

pub struct RulesParser;

pub(crate) type Pair<'a> = pest::iterators::Pair<'a, Rule>;

/// Keyword tokens are kept as atomic rules so they cannot swallow a prefix
/// of an identifier; they carry no information once parsed.
pub(crate) fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_def
            | Rule::kw_return
            | Rule::kw_if
            | Rule::kw_elif
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_for
            | Rule::kw_in
            | Rule::kw_or
            | Rule::kw_and
            | Rule::kw_not
            | Rule::assign_op
    )
}

/// The inner pairs of `pair` with keyword tokens filtered out.
pub(crate) fn significant_pairs<'a>(pair: &Pair<'a>) -> Vec<Pair<'a>> {
    pair.clone()
        .into_inner()
        .filter(|inner| !is_keyword(inner.as_rule()))
        .collect()
}

pub(crate) fn fetch_next_pair<'a, I>(
    pairs: &mut I,
    location: &Option<location::Location>,
    span: &Option<location::Span>,
) -> Result<Pair<'a>, Box<dyn CanopyErrorExt>>
where
    I: Iterator<Item = Pair<'a>>,
{
    match pairs.next() {
        Some(pair) => Ok(pair),
        None => Err(Box::<dyn CanopyErrorExt>::from(Box::new(
            crate::syntax::err::SyntaxError::with(
                crate::Level::Error,
                "Expected more inner pairs but found none.".into(),
                "canopy.syntax.rules.fetch_next_pair".into(),
                location.clone(),
                span.clone(),
            ),
        ))),
    }
}

pub(crate) fn get_data_from_rule<'a>(
    rule: &Pair<'a>,
    callable: &crate::source::Callable,
) -> (
    Vec<Pair<'a>>,
    Option<location::Location>,
    Option<location::Span>,
) {
    let inner_rules = significant_pairs(rule);
    let span = get_span_from_pair(rule, callable);
    let location = get_location_from_pair(rule, callable);
    (inner_rules, location, span)
}

/// pest reports 1-based columns; syntax trees use 0-based column offsets.
pub fn get_location_from_pair(
    rule: &Pair,
    callable: &crate::source::Callable,
) -> Option<location::Location> {
    let (line, column) = rule.as_span().start_pos().line_col();
    Some(location::Location {
        file: callable.name.clone(),
        line,
        column: column.saturating_sub(1),
    })
}

pub fn get_span_from_pair(
    rule: &Pair,
    callable: &crate::source::Callable,
) -> Option<location::Span> {
    let span = rule.as_span();
    let (start_line, start_column) = span.start_pos().line_col();
    let (end_line, end_column) = span.end_pos().line_col();
    Some(location::Span {
        start: location::Location {
            file: callable.name.clone(),
            line: start_line,
            column: start_column.saturating_sub(1),
        },
        end: location::Location {
            file: callable.name.clone(),
            line: end_line,
            column: end_column.saturating_sub(1),
        },
    })
}

/// Start a node of `kind` positioned at `pair`.
pub(crate) fn node_at(
    kind: crate::syntax::NodeKind,
    pair: &Pair,
    callable: &crate::source::Callable,
) -> crate::syntax::SyntaxNode {
    crate::syntax::SyntaxNode::new(
        kind,
        get_location_from_pair(pair, callable),
        get_span_from_pair(pair, callable),
    )
}

pub(crate) fn syntax_error(
    message: String,
    issuer: &str,
    location: Option<location::Location>,
    span: Option<location::Span>,
) -> Box<dyn CanopyErrorExt> {
    Box::new(crate::syntax::err::SyntaxError::with(
        crate::Level::Error,
        message,
        issuer.to_string(),
        location,
        span,
    ))
}
