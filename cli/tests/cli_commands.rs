use std::path::PathBuf;

use assert_cmd::Command;

fn sample(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("samples");
    path.push(name);
    path
}

fn canopy() -> Command {
    Command::cargo_bin("canopy").expect("canopy binary is built")
}

#[test]
fn translate_single_file_prints_function_object() {
    let output = canopy()
        .arg("translate")
        .arg(sample("simple.py"))
        .output()
        .expect("run canopy");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["_type"], "Function");
    assert_eq!(value["name"], "add");
    assert_eq!(value["qualified_name"], "");
    assert_eq!(value["body"][0]["node"]["_type"], "Assign");
}

#[test]
fn translate_many_files_writes_an_array() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("ir.json");

    canopy()
        .arg("translate")
        .arg(sample("simple.py"))
        .arg(sample("nested.py"))
        .arg(sample("pass.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let text = std::fs::read_to_string(&out).expect("output written");
    let value: serde_json::Value = serde_json::from_str(&text).expect("output is JSON");
    let items = value.as_array().expect("array for several files");
    assert_eq!(items.len(), 3);
    assert_eq!(items[1]["name"], "outer");
    assert_eq!(items[2]["name"], "f");
}

#[test]
fn glob_patterns_are_expanded() {
    let pattern = sample("*.json");
    let output = canopy()
        .arg("translate")
        .arg(pattern.to_string_lossy().to_string())
        .output()
        .expect("run canopy");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["name"], "f");
}

#[test]
fn decorated_functions_are_discounted_unless_asked() {
    let output = canopy()
        .arg("translate")
        .arg(sample("decorated.py"))
        .output()
        .expect("run canopy");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["line"], 1);

    let output = canopy()
        .arg("translate")
        .arg("--keep-decorator-lines")
        .arg(sample("decorated.py"))
        .output()
        .expect("run canopy");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["line"], 3);
}

#[test]
fn syntax_errors_fail_with_a_report() {
    let output = canopy()
        .arg("translate")
        .arg(sample("broken.py"))
        .output()
        .expect("run canopy");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CANOPY"), "stderr: {}", stderr);
    assert!(stderr.contains("broken.py:1:"), "stderr: {}", stderr);
}

#[test]
fn partial_failures_still_emit_successful_translations() {
    let output = canopy()
        .arg("translate")
        .arg(sample("simple.py"))
        .arg(sample("missing.py"))
        .output()
        .expect("run canopy");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value.as_array().map(|a| a.len()), Some(1));
}

#[test]
fn summary_table_goes_to_stderr() {
    let output = canopy()
        .arg("translate")
        .arg("--summary")
        .arg(sample("nested.py"))
        .output()
        .expect("run canopy");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("outer"));
    assert!(stderr.contains("Nodes"));
}

#[test]
fn separator_flag_changes_qualified_names() {
    let output = canopy()
        .arg("translate")
        .arg("--separator")
        .arg("::")
        .arg(sample("nested.py"))
        .output()
        .expect("run canopy");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"outer::inner\""), "stdout: {}", stdout);
}

#[test]
fn parse_dumps_the_syntax_tree() {
    let output = canopy()
        .arg("parse")
        .arg(sample("simple.py"))
        .output()
        .expect("run canopy");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["_type"], "Module");
    assert_eq!(value["body"][0]["name"], "add");
    assert_eq!(value["body"][0]["args"]["defaults"][0]["value"], 1);
}

#[test]
fn deep_trees_fail_at_the_default_max_depth() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("deep.py");
    let operands = vec!["a"; 600].join(" + ");
    std::fs::write(&path, format!("def f(a):\n    return {}\n", operands)).expect("write source");

    let output = canopy().arg("translate").arg(&path).output().expect("run canopy");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("deeper than 500 levels"), "stderr: {}", stderr);

    let output = canopy()
        .arg("translate")
        .arg("--max-depth")
        .arg("800")
        .arg(&path)
        .output()
        .expect("run canopy");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}
