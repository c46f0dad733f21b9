use canopy_core::{
    Callable, CanopyErrorExt, generate_error_report, generate_tree_from_source,
    syntax::{FieldValue, NodeKind, Scalar, SyntaxNode},
};

fn parse(src: &str) -> SyntaxNode {
    let callable = Callable::from_source("sample.py", src);
    generate_tree_from_source(&callable).expect("failed to parse sample")
}

fn first_statement(module: &SyntaxNode) -> &SyntaxNode {
    module
        .field_list("body")
        .and_then(|body| body.first())
        .and_then(FieldValue::as_node)
        .expect("module has a first statement")
}

fn body_of(node: &SyntaxNode) -> Vec<&SyntaxNode> {
    node.field_list("body")
        .expect("node has a body")
        .iter()
        .filter_map(FieldValue::as_node)
        .collect()
}

fn names(list: &[FieldValue]) -> Vec<&str> {
    list.iter()
        .filter_map(FieldValue::as_node)
        .filter_map(|node| node.field_str("arg").or_else(|| node.field_str("id")))
        .collect()
}

#[test]
fn trivial_function_parses_to_module_and_function_def() {
    let module = parse("def f(): pass\n");
    assert_eq!(module.kind, NodeKind::Module);
    assert!(module.location.is_none());

    let def = first_statement(&module);
    assert_eq!(def.kind, NodeKind::FunctionDef);
    assert_eq!(def.field_str("name"), Some("f"));
    assert_eq!(def.line(), Some(1));
    assert_eq!(def.column(), Some(0));

    let field_names: Vec<&str> = def.fields.keys().map(String::as_str).collect();
    assert_eq!(
        field_names,
        vec!["name", "args", "body", "decorator_list", "returns", "type_comment"]
    );

    let body = body_of(def);
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].kind, NodeKind::Pass);

    let args = def.field_node("args").expect("arguments node");
    assert_eq!(args.kind, NodeKind::Arguments);
    assert_eq!(args.field_list("args").map(|a| a.len()), Some(0));
}

#[test]
fn parameters_fill_python_argument_buckets() {
    let module = parse("def g(a, /, b, c=2, *rest, d, e=5, **kw) -> int:\n    return a\n");
    let def = first_statement(&module);
    let args = def.field_node("args").expect("arguments node");

    assert_eq!(names(args.field_list("posonlyargs").unwrap()), vec!["a"]);
    assert_eq!(names(args.field_list("args").unwrap()), vec!["b", "c"]);
    assert_eq!(args.field_node("vararg").and_then(|v| v.field_str("arg")), Some("rest"));
    assert_eq!(names(args.field_list("kwonlyargs").unwrap()), vec!["d", "e"]);
    assert_eq!(args.field_node("kwarg").and_then(|v| v.field_str("arg")), Some("kw"));

    let defaults = args.field_list("defaults").unwrap();
    assert_eq!(defaults.len(), 1);
    assert_eq!(
        defaults[0].as_node().and_then(|c| c.field("value")),
        Some(&FieldValue::Scalar(Scalar::Int(2)))
    );

    let kw_defaults = args.field_list("kw_defaults").unwrap();
    assert_eq!(kw_defaults.len(), 2);
    assert_eq!(kw_defaults[0], FieldValue::none());
    assert!(kw_defaults[1].as_node().is_some());

    let returns = def.field_node("returns").expect("return annotation");
    assert_eq!(returns.field_str("id"), Some("int"));
}

#[test]
fn binary_operators_respect_precedence() {
    let module = parse("def f(a, b, c):\n    x = a + b * c\n");
    let assign = body_of(first_statement(&module))[0];
    assert_eq!(assign.kind, NodeKind::Assign);

    let target = assign.field_list("targets").unwrap()[0].as_node().unwrap();
    assert_eq!(target.kind, NodeKind::Name);
    assert_eq!(target.field_node("ctx").map(|c| c.kind.clone()), Some(NodeKind::Store));

    let value = assign.field_node("value").unwrap();
    assert_eq!(value.kind, NodeKind::BinOp);
    assert_eq!(value.field_node("op").map(|o| o.kind.clone()), Some(NodeKind::Add));
    let right = value.field_node("right").unwrap();
    assert_eq!(right.kind, NodeKind::BinOp);
    assert_eq!(right.field_node("op").map(|o| o.kind.clone()), Some(NodeKind::Mult));
}

#[test]
fn multiword_comparisons_and_boolean_chains() {
    let module = parse("def f(a, b, c):\n    return a is not b or c not in b or not a\n");
    let ret = body_of(first_statement(&module))[0];
    let value = ret.field_node("value").unwrap();
    assert_eq!(value.kind, NodeKind::BoolOp);
    assert_eq!(value.field_node("op").map(|o| o.kind.clone()), Some(NodeKind::Or));

    let values = value.field_list("values").unwrap();
    assert_eq!(values.len(), 3);

    let first = values[0].as_node().unwrap();
    let ops = first.field_list("ops").unwrap();
    assert_eq!(ops[0].as_node().map(|o| o.kind.clone()), Some(NodeKind::IsNot));

    let second = values[1].as_node().unwrap();
    let ops = second.field_list("ops").unwrap();
    assert_eq!(ops[0].as_node().map(|o| o.kind.clone()), Some(NodeKind::NotIn));

    let third = values[2].as_node().unwrap();
    assert_eq!(third.kind, NodeKind::UnaryOp);
}

#[test]
fn tuple_swap_assigns_to_store_context() {
    let module = parse("def f(a, b):\n    a, b = b, a\n");
    let assign = body_of(first_statement(&module))[0];
    let target = assign.field_list("targets").unwrap()[0].as_node().unwrap();
    assert_eq!(target.kind, NodeKind::Tuple);
    for elt in target.field_list("elts").unwrap() {
        let elt = elt.as_node().unwrap();
        assert_eq!(elt.field_node("ctx").map(|c| c.kind.clone()), Some(NodeKind::Store));
    }
    let value = assign.field_node("value").unwrap();
    assert_eq!(value.kind, NodeKind::Tuple);
}

#[test]
fn assignment_to_call_is_rejected() {
    let callable = Callable::from_source("bad.py", "def f():\n    g() = 1\n");
    let err = generate_tree_from_source(&callable).unwrap_err();
    assert!(err.message().contains("Cannot assign to Call"), "got {}", err.message());
}

#[test]
fn elif_chains_nest_in_orelse() {
    let src = "\
def f(a, b):
    if a:
        pass
    elif b:
        pass
    else:
        x = 1
";
    let module = parse(src);
    let outer = body_of(first_statement(&module))[0];
    assert_eq!(outer.kind, NodeKind::If);

    let orelse = outer.field_list("orelse").unwrap();
    assert_eq!(orelse.len(), 1);
    let inner = orelse[0].as_node().unwrap();
    assert_eq!(inner.kind, NodeKind::If);
    assert_eq!(inner.line(), Some(4));

    let inner_else = inner.field_list("orelse").unwrap();
    assert_eq!(inner_else[0].as_node().map(|n| n.kind.clone()), Some(NodeKind::Assign));
}

#[test]
fn loops_with_else_blocks_and_comments() {
    let src = "\
def f(xs):
    # count the positives

    n = 0
    for x in xs:
        if x > 0:
            n += 1
    else:
        pass
    while n:
        n -= 1
        break
    return n
";
    let module = parse(src);
    let body = body_of(first_statement(&module));
    let kinds: Vec<NodeKind> = body.iter().map(|n| n.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::Assign, NodeKind::For, NodeKind::While, NodeKind::Return]
    );

    let for_loop = body[1];
    assert_eq!(for_loop.field_list("orelse").map(|o| o.len()), Some(1));
    let aug = body_of(body_of(for_loop)[0])[0];
    assert_eq!(aug.kind, NodeKind::AugAssign);
    assert_eq!(aug.field_node("op").map(|o| o.kind.clone()), Some(NodeKind::Add));
}

#[test]
fn calls_attributes_subscripts_and_literals() {
    let module = parse("def f(o):\n    o.items[0](1, 'a\\tb', flag=None); return [1.5, True]\n");
    let body = body_of(first_statement(&module));
    assert_eq!(body.len(), 2);

    let call = body[0].field_node("value").unwrap();
    assert_eq!(call.kind, NodeKind::Call);
    let func = call.field_node("func").unwrap();
    assert_eq!(func.kind, NodeKind::Subscript);
    assert_eq!(func.field_node("value").map(|v| v.kind.clone()), Some(NodeKind::Attribute));

    let args = call.field_list("args").unwrap();
    assert_eq!(
        args[1].as_node().and_then(|c| c.field("value")),
        Some(&FieldValue::Scalar(Scalar::Str("a\tb".to_string())))
    );
    let keywords = call.field_list("keywords").unwrap();
    assert_eq!(keywords[0].as_node().and_then(|k| k.field_str("arg")), Some("flag"));

    let list = body[1].field_node("value").unwrap();
    assert_eq!(list.kind, NodeKind::List);
    assert_eq!(list.field_list("elts").map(|e| e.len()), Some(2));
}

#[test]
fn decorators_are_attached_and_def_keeps_its_line() {
    let src = "@trace\n@cache(size=16)\ndef fib(n):\n    return n\n";
    let module = parse(src);
    let def = first_statement(&module);
    assert_eq!(def.line(), Some(3));
    let decorators = def.field_list("decorator_list").unwrap();
    assert_eq!(decorators.len(), 2);
    assert_eq!(decorators[0].as_node().and_then(|d| d.line()), Some(1));
}

#[test]
fn empty_source_is_reported() {
    let callable = Callable::from_source("empty.py", "   \n\n");
    let err = generate_tree_from_source(&callable).unwrap_err();
    assert_eq!(err.message(), "The source of `empty.py` is empty.");
    assert_eq!(err.issuer(), "canopy.syntax.generate_tree_from_source");
    assert_eq!(err.location().map(|l| (l.line, l.column)), Some((1, 0)));
}

#[test]
fn syntax_errors_carry_a_location() {
    let callable = Callable::from_source("broken.py", "def broken(:\n    pass\n");
    let err = generate_tree_from_source(&callable).unwrap_err();
    let location = err.location().expect("syntax errors have a location");
    assert_eq!(location.line, 1);
    let span = err.span().expect("pest positions give a span");
    assert_eq!(span.start.line, 1);
    assert!(err.message().starts_with("Invalid syntax"));
    assert!(generate_error_report(err.as_ref()).starts_with("CANOPY | ERROR | broken.py:1:"));
}

#[test]
fn increment_lineno_shifts_the_whole_tree() {
    let mut module = parse("def f():\n    x = 1\n");
    module.increment_lineno(2);
    let def = first_statement(&module);
    assert_eq!(def.line(), Some(3));
    assert_eq!(body_of(def)[0].line(), Some(4));
}
