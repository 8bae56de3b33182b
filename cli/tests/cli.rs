//! Runs the `rdgen` binary against grammar files on disk.

use std::process::Command;

const GREETING: &str = r#"{ "root": "Greeting", "entities": [
    { "name": "Greeting",
      "action": { "sequence": [ { "literal": "hello" }, { "literal": "world" } ] } }
] }"#;

fn rdgen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rdgen"))
}

#[test]
fn writes_generated_source() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("greeting.json");
    let output = dir.path().join("greeting.rs");
    std::fs::write(&input, GREETING).unwrap();

    let status = rdgen()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--namespace", "greeting", "--info"])
        .status()
        .unwrap();
    assert!(status.success());

    let source = std::fs::read_to_string(&output).unwrap();
    assert!(source.starts_with("// DO NOT EDIT THIS FILE"));
    assert!(source.contains("greeting.json"));
    assert!(source.contains("pub mod greeting"));
    assert!(source.contains("parse_greeting"));
}

#[test]
fn prints_to_stdout_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("greeting.json");
    std::fs::write(&input, GREETING).unwrap();

    let output = rdgen().arg(&input).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("pub struct Greeting"));
    assert!(!stdout.contains("DO NOT EDIT"));
}

#[test]
fn reports_model_errors() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.json");
    std::fs::write(
        &input,
        r#"{ "root": "Greeting", "entities": [ { "name": "Greeting", "action": { "reference": "Missing" } } ] }"#,
    )
    .unwrap();

    let output = rdgen().arg(&input).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("loading"));
    assert!(stderr.contains("Missing"));
}

#[test]
fn reports_generation_errors() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mismatch.json");
    std::fs::write(
        &input,
        r#"{ "root": "Flag", "entities": [
            { "name": "Flag", "properties": [ { "name": "on", "type": "<bool>" } ],
              "action": { "literal": "on", "plural": true, "property": "on" } }
        ] }"#,
    )
    .unwrap();

    let output = rdgen().arg(&input).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("generating a parser"));
}
