//! `coco` binary tests: modes, debug dumps, file layout and exit codes

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;
use std::fs;
use std::io::Write;
use std::process::Stdio;

fn coco(args: &[&str]) -> std::process::Output {
    test_command(&coco_bin())
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute coco")
}

#[test]
fn test_version_flag() {
    let output = coco(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("Coco {PKG_VERSION}"));
}

#[test]
fn test_help_flag() {
    let output = coco(&["-h"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("coco [options] [files] [arguments]"));
    assert!(stdout.contains("--interactive"));
    assert!(stdout.contains("--nodejs"));
}

#[test]
fn test_eval_print() {
    let output = coco(&["-e", "-p", "1 + 2 * 3"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "7\n");
}

#[test]
fn test_eval_passes_remaining_positionals_as_argv() {
    let output = coco(&["-e", "-p", "argv", "x", "--y"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "[ 'x', '--y' ]\n");
}

#[test]
fn test_eval_compile_joins_positionals_as_lines() {
    let output = coco(&["-bce", "a = 'x'", "[a, a + 'y']"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "var a;\na = \"x\";\n[a, a + \"y\"];\n"
    );
}

#[test]
fn test_eval_json() {
    let output = coco(&["-e", "-j", "{a: 1, b: [true, null]}"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, serde_json::json!({"a": 1, "b": [true, null]}));
}

#[test]
fn test_eval_compile_prints_javascript() {
    let output = coco(&["-c", "-e", "-b", "a = 1"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "var a;\na = 1;\n");
}

#[test]
fn test_ast_dump_is_repeatable() {
    let first = coco(&["-e", "-a", "x = 1 + 2"]);
    let second = coco(&["-e", "-a", "x = 1 + 2"]);
    assert!(first.status.success());
    assert!(!first.stdout.is_empty());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_tokens_dump() {
    let output = coco(&["-e", "-t", "1"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("NUMBER:1"), "got: {stdout}");
}

#[test]
fn test_stdin_is_compiled_when_not_a_terminal() {
    let mut child = test_command(&coco_bin())
        .args(["-p"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"'from' + ' stdin'\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "'from stdin'\n");
}

#[test]
fn test_script_receives_argv() {
    let temp_dir = create_temp_dir();
    let script = temp_dir.path().join("args.co");
    write_file(&script, "argv\n");

    let output = coco(&["-p", script.to_str().unwrap(), "one", "--two"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "[ 'one', '--two' ]\n");
}

#[test]
fn test_missing_extension_is_retried() {
    let temp_dir = create_temp_dir();
    write_file(&temp_dir.path().join("hello.co"), "'hi'\n");

    let output = test_command(&coco_bin())
        .args(["-p", "hello"])
        .current_dir(temp_dir.path())
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "'hi'\n");
}

#[test]
fn test_require_preloads_globals() {
    let temp_dir = create_temp_dir();
    let lib = temp_dir.path().join("lib.co");
    write_file(&lib, "greeting = 'hello'\n");

    let output = coco(&["-r", lib.to_str().unwrap(), "-e", "-p", "greeting + '!'"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "'hello!'\n");
}

#[test]
fn test_compile_directory_into_output_root() {
    let temp_dir = create_temp_dir();
    let root = temp_dir.path();
    write_file(&root.join("src/main.co"), "a = 1\n");
    write_file(&root.join("src/lib/util.co"), "b = 2\n");
    write_file(&root.join("src/notes.txt"), "not a source\n");

    let output = test_command(&coco_bin())
        .args(["-c", "-o", "out", "src"])
        .current_dir(root)
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let main = fs::read_to_string(root.join("out/main.js")).unwrap();
    assert!(main.contains("var a;"));
    assert!(main.ends_with("}).call(this);\n"));
    assert!(root.join("out/lib/util.js").is_file());
    assert!(!root.join("out/notes.js").exists());
}

#[test]
fn test_compile_json_output_extension() {
    let temp_dir = create_temp_dir();
    let root = temp_dir.path();
    write_file(&root.join("data.co"), "{name: 'coco', tags: ['a']}\n");

    let output = test_command(&coco_bin())
        .args(["-c", "-j", "data.co"])
        .current_dir(root)
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let json = fs::read_to_string(root.join("data.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value, serde_json::json!({"name": "coco", "tags": ["a"]}));
}

#[test]
fn test_unknown_flag_exits_with_help() {
    let output = coco(&["--bogus"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Unrecognized option(s): --bogus"));
    assert!(stderr.contains("coco [options] [files] [arguments]"));
}

#[test]
fn test_all_unknown_flags_are_listed() {
    let output = coco(&["--bogus", "-p", "--other"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Unrecognized option(s): --bogus --other\n"), "got: {stderr}");
}

#[cfg(unix)]
#[test]
fn test_nodejs_forks_the_runtime() {
    let temp_dir = create_temp_dir();
    write_file(
        &temp_dir.path().join("record.sh"),
        "printf '%s\\n' \"$@\" > forwarded.txt\nexit 7\n",
    );

    let output = test_command(&coco_bin())
        .args(["--nodejs", "-e", "record.sh", "one", "--two"])
        .env("COCO_RUNTIME", "sh")
        .current_dir(temp_dir.path())
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(7), "{output:?}");
    let forwarded = fs::read_to_string(temp_dir.path().join("forwarded.txt")).unwrap();
    assert_eq!(forwarded, "one\n--two\n");
}

#[test]
fn test_nodejs_missing_runtime_is_fatal() {
    let output = test_command(&coco_bin())
        .args(["--nodejs", "--harmony", "x.co"])
        .env("COCO_RUNTIME", "coco-runtime-that-does-not-exist")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot find runtime"));
}

#[test]
fn test_syntax_error_is_fatal() {
    let output = coco(&["-e", "1 @ 2"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SyntaxError"), "got: {stderr}");
}

#[test]
fn test_runtime_error_has_trace() {
    let output = coco(&["-e", "missing + 1"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ReferenceError: missing is not defined"));
    assert!(stderr.contains("at run (<input>)"), "got: {stderr}");
}

#[test]
fn test_missing_source_is_fatal() {
    let temp_dir = create_temp_dir();
    let output = test_command(&coco_bin())
        .args(["-c", "nowhere"])
        .current_dir(temp_dir.path())
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("nowhere"));
}
