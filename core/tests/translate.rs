use canopy_core::{
    BuilderConfig, Callable, CanopyErrorExt, IrBuilder, IrValue, ScopeTracker, generate_tree_from_source,
    ir::{DEFAULT_MAX_DEPTH, DepthLimitError, ExportError}, load_function,
    syntax::{FieldValue, NodeKind, SyntaxNode, json},
};

fn tree(src: &str) -> SyntaxNode {
    load_function(&Callable::from_source("sample.py", src), &BuilderConfig::default()).expect("parse sample")
}

fn kind_of(value: &IrValue<'_>) -> Option<NodeKind> {
    value.as_node().map(|node| node.origin.kind.clone())
}

#[test]
fn trivial_function_translates_to_function_node() {
    let tree = tree("def f(): pass\n");
    let mut builder = IrBuilder::default();
    let function = builder.translate(&tree).expect("translate");

    assert_eq!(function.name, "f");
    assert_eq!(function.qualified_name, "");
    assert_eq!(function.line, 1);
    assert_eq!(function.column, 0);
    assert_eq!(function.body.len(), 1);
    assert_eq!(kind_of(&function.body[0]), Some(NodeKind::Pass));
    assert_eq!(kind_of(&function.arguments), Some(NodeKind::Arguments));
    assert_eq!(function.decorators.as_list().map(|d| d.len()), Some(0));
}

#[test]
fn generic_nodes_keep_every_field_in_order() {
    let tree = tree("def f(a):\n    return a + 1\n");
    let mut builder = IrBuilder::default();
    let function = builder.translate(&tree).expect("translate");

    let ret = function.body[0].as_node().expect("generic Return");
    assert_eq!(ret.origin.kind, NodeKind::Return);
    let value = ret.field("value").and_then(IrValue::as_node).expect("BinOp");
    let names: Vec<&str> = value.fields.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["left", "op", "right"]);
    let constant = value.field("right").and_then(IrValue::as_node).expect("Constant");
    assert!(constant.field("value").and_then(IrValue::as_scalar).is_some());
}

#[test]
fn qualification_reflects_only_the_enclosing_scope() {
    let src = "\
def g():
    def inner():
        def leaf():
            pass
        return 1
    return inner
";
    let tree = tree(src);
    let mut builder = IrBuilder::default();
    let function = builder.translate(&tree).expect("translate");
    assert_eq!(function.qualified_name, "");

    let nested = function.nested_functions();
    assert_eq!(nested.len(), 2);
    assert_eq!(nested[0].name, "inner");
    assert_eq!(nested[0].qualified_name, "g");
    assert_eq!(nested[1].name, "leaf");
    assert_eq!(nested[1].qualified_name, "g_inner");
}

#[test]
fn translate_in_uses_the_enclosing_scope() {
    let tree = tree("def f(): pass\n");
    let mut builder = IrBuilder::default();
    let mut scope = ScopeTracker::new();
    {
        let mut g = scope.enter("g");
        let function = builder.translate_in(&mut g, &tree).expect("translate");
        assert_eq!(function.qualified_name, "g");
        assert_eq!(g.depth(), 1);
    }
    let function = builder.translate_in(&mut scope, &tree).expect("translate");
    assert_eq!(function.qualified_name, "");
}

#[test]
fn custom_separator_joins_nested_scopes() {
    let src = "def a():\n    def b():\n        def c():\n            pass\n";
    let tree = tree(src);
    let mut builder = IrBuilder::new(BuilderConfig::default().with_separator("."));
    let function = builder.translate(&tree).expect("translate");
    let nested = function.nested_functions();
    assert_eq!(nested[1].qualified_name, "a.b");
}

#[test]
fn repeated_translation_has_fresh_ids_but_same_shape() {
    let tree = tree("def f(x):\n    y = x * 2\n    return y\n");
    let mut builder = IrBuilder::default();
    let first = builder.translate(&tree).expect("first");
    let second = builder.translate(&tree).expect("second");

    assert_ne!(first.id, second.id);
    assert_ne!(first, second);
    let first_ids: Vec<u64> = first.body.iter().filter_map(|v| v.as_node().map(|n| n.id)).collect();
    let second_ids: Vec<u64> = second.body.iter().filter_map(|v| v.as_node().map(|n| n.id)).collect();
    assert!(first_ids.iter().all(|id| !second_ids.contains(id)));

    assert!(first.same_shape(&second));
    assert!(IrValue::Function(Box::new(first.clone())).same_shape(&IrValue::Function(Box::new(second))));
}

#[test]
fn empty_sequences_stay_empty() {
    let tree = tree("def f(): pass\n");
    let mut builder = IrBuilder::default();
    let mut scope = ScopeTracker::new();
    let empty = FieldValue::List(Vec::new());
    let translated = builder.generate(&empty, &mut scope).expect("generate");
    assert_eq!(translated.as_list().map(|l| l.len()), Some(0));

    let function = builder.translate(&tree).expect("translate");
    let arguments = function.arguments.as_node().expect("arguments");
    assert_eq!(arguments.field("args").and_then(IrValue::as_list).map(|l| l.len()), Some(0));
}

#[test]
fn scalars_pass_through_unchanged() {
    let mut builder = IrBuilder::default();
    let mut scope = ScopeTracker::new();
    let value = FieldValue::str("hello");
    let translated = builder.generate(&value, &mut scope).expect("generate");
    assert_eq!(translated.as_scalar(), Some(&canopy_core::syntax::Scalar::Str("hello".into())));
}

#[test]
fn opaque_values_fail_and_leave_scope_balanced() {
    let text = r#"{"_type": "Module", "body": [
        {"_type": "FunctionDef", "name": "f", "args": null, "decorator_list": [],
         "body": [{"_type": "Expr", "value": {"foreign": 1}}], "lineno": 1, "col_offset": 0}
    ]}"#;
    let tree = json::tree_from_json(text, "opaque.json").expect("import");
    let mut builder = IrBuilder::default();
    let mut scope = ScopeTracker::new();
    let mut outer = scope.enter("outer");

    let err = builder.translate_in(&mut outer, &tree).unwrap_err();
    assert!(err.message().contains("Unsupported node shape"), "got {}", err.message());
    assert!(err.message().contains("`value` of Expr"));
    assert_eq!(outer.depth(), 1);
    assert_eq!(outer.current(), "outer");
}

#[test]
fn module_without_statements_is_malformed() {
    let tree = json::tree_from_json(r#"{"_type": "Module", "body": []}"#, "empty.json").expect("import");
    let err = IrBuilder::default().translate(&tree).unwrap_err();
    assert!(err.message().contains("no statements"));
}

#[test]
fn root_must_resolve_to_a_function() {
    let tree = tree("x = 1\n");
    let err = IrBuilder::default().translate(&tree).unwrap_err();
    assert!(err.message().contains("does not resolve to a function definition"));

    let nameless = json::tree_from_json(r#"{"_type": "FunctionDef", "body": []}"#, "nameless.json").expect("import");
    let err = IrBuilder::default().translate(&nameless).unwrap_err();
    assert!(err.message().contains("no `name`"));
}

#[test]
fn depth_limit_stops_deep_trees() {
    let mut expr = String::from("x");
    for _ in 0..40 {
        expr = format!("-{}", expr);
    }
    let tree = tree(&format!("def f(x):\n    return {}\n", expr));

    let mut shallow = IrBuilder::new(BuilderConfig::default().with_max_depth(10));
    let err = shallow.translate(&tree).unwrap_err();
    assert!(err.message().contains("deeper than 10"));
    assert_eq!(err.level(), canopy_core::Level::Critical);
    assert_eq!(DepthLimitError::new(10, None).limit(), 10);

    let mut roomy = IrBuilder::default();
    assert!(roomy.translate(&tree).is_ok());
}

#[test]
fn decorator_lines_are_discounted() {
    let src = "@trace\n@cache(size=16)\ndef fib(n):\n    return n\n";
    let callable = Callable::from_source("fib.py", src);

    let prepared = load_function(&callable, &BuilderConfig::default()).expect("load");
    let function = IrBuilder::default().translate(&prepared).expect("translate");
    assert_eq!(function.line, 1);
    let ret = function.body[0].as_node().expect("Return");
    assert_eq!(ret.origin.line(), Some(2));
    assert_eq!(function.decorators.as_list().map(|d| d.len()), Some(2));

    let config = BuilderConfig::default().with_discount_decorators(false);
    let raw = load_function(&callable, &config).expect("load");
    let function = IrBuilder::new(config).translate(&raw).expect("translate");
    assert_eq!(function.line, 3);
}

#[test]
fn prepare_tree_ignores_undecorated_functions() {
    let mut tree = generate_tree_from_source(&Callable::from_source("f.py", "\n\ndef f():\n    pass\n"))
        .expect("parse");
    IrBuilder::default().prepare_tree(&mut tree);
    let function = IrBuilder::default().translate(&tree).expect("translate");
    assert_eq!(function.line, 3);
}

#[test]
fn summaries_count_nodes_by_kind() {
    let tree = tree("def f(a, b):\n    c = a + b\n    return c\n");
    let function = IrBuilder::default().translate(&tree).expect("translate");

    let histogram = function.kind_histogram();
    assert_eq!(histogram.get("FunctionDef"), Some(&1));
    assert_eq!(histogram.get("Name"), Some(&4));
    assert_eq!(histogram.get("BinOp"), Some(&1));
    assert_eq!(function.node_count(), histogram.values().sum::<usize>());
}

#[test]
fn function_nodes_serialize_to_json() {
    let tree = tree("def f(x):\n    return x\n");
    let function = IrBuilder::default().translate(&tree).expect("translate");
    let value = serde_json::to_value(&function).expect("serialize");

    assert_eq!(value["_type"], "Function");
    assert_eq!(value["name"], "f");
    assert_eq!(value["qualified_name"], "");
    assert_eq!(value["body"][0]["node"]["_type"], "Return");
    assert_eq!(value["body"][0]["value"]["id"], "x");
}

fn long_sum(terms: usize) -> String {
    let operands = vec!["a"; terms].join(" + ");
    format!("def f(a):\n    return {}\n", operands)
}

#[test]
fn default_depth_limit_is_reached_before_the_stack_runs_out() {
    let tree = tree(&long_sum(DEFAULT_MAX_DEPTH + 100));
    let err = IrBuilder::default().translate(&tree).unwrap_err();
    assert_eq!(
        err.message(),
        format!("Tree is nested deeper than {} levels.", DEFAULT_MAX_DEPTH)
    );
    assert_eq!(err.level(), canopy_core::Level::Critical);
}

#[test]
fn trees_just_under_the_default_limit_translate() {
    let tree = tree(&long_sum(DEFAULT_MAX_DEPTH - 100));
    let function = IrBuilder::default().translate(&tree).expect("translate");
    assert_eq!(function.kind_histogram().get("BinOp"), Some(&(DEFAULT_MAX_DEPTH - 101)));
}

#[test]
fn functions_export_to_json_values() {
    let tree = tree("def f(x):\n    return x\n");
    let function = IrBuilder::default().translate(&tree).expect("translate");
    let value = function.to_json().expect("export");
    assert_eq!(value, serde_json::to_value(&function).expect("serialize"));

    let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = ExportError::new("f", &cause, None);
    assert!(err.message().starts_with("Cannot export function `f`"));
    assert_eq!(err.level(), canopy_core::Level::Error);
}
