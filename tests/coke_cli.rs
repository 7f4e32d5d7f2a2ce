//! `coke` binary tests: discovery, usage, invocation and failures

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;
use std::fs;
use std::path::Path;

const COKEFILE: &str = r#"
# project tasks
option release "build in release mode"
option target "output directory" DIR "lib"

task build "compile the sources" {
    mkdir -p "$COKE_TARGET"
    echo "release=${COKE_RELEASE:-0}" > "$COKE_TARGET/build.txt"
}

task "build docs" "write the docs" {
    invoke build
    echo docs > docs.txt
}

task broken {
    exit 4
}

task after {
    echo ran > after.txt
}
"#;

fn coke(dir: &Path, args: &[&str]) -> std::process::Output {
    test_command(&coke_bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to execute coke")
}

#[test]
fn test_no_arguments_prints_usage() {
    let temp_dir = create_temp_dir();
    create_cokefile(temp_dir.path(), COKEFILE);

    let output = coke(temp_dir.path(), &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Usage: coke [coke options] [task options] [tasks]\n"));
    assert!(stdout.contains("  build       compile the sources\n"));
    assert!(stdout.contains("  build docs  write the docs\n"));
    assert!(stdout.contains("  broken\n"));
    assert!(stdout.contains("Task options:\n  --release     build in release mode\n"));
    assert!(stdout.contains("  --target DIR  output directory\n"));
    assert!(stdout.ends_with("-f, --cokefile FILE  use FILE as the Cokefile\n"));

    let build = stdout.find("  build ").unwrap();
    let broken = stdout.find("  broken").unwrap();
    assert!(build < broken, "tasks listed in declaration order");
}

#[test]
fn test_no_cokefile() {
    let temp_dir = create_temp_dir();
    let output = coke(temp_dir.path(), &["build"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no \"Cokefile\""));
}

#[test]
fn test_discovery_runs_from_manifest_dir() {
    let temp_dir = create_temp_dir();
    create_cokefile(temp_dir.path(), COKEFILE);
    let nested = temp_dir.path().join("a/b/c");
    fs::create_dir_all(&nested).unwrap();

    let output = coke(&nested, &["build"]);
    assert!(output.status.success(), "{output:?}");
    let built = fs::read_to_string(temp_dir.path().join("lib/build.txt")).unwrap();
    assert_eq!(built.trim(), "release=0");
    assert!(!nested.join("lib").exists());
}

#[test]
fn test_options_are_exported() {
    let temp_dir = create_temp_dir();
    create_cokefile(temp_dir.path(), COKEFILE);

    let output = coke(temp_dir.path(), &["--release", "--target", "dist", "build"]);
    assert!(output.status.success(), "{output:?}");
    let built = fs::read_to_string(temp_dir.path().join("dist/build.txt")).unwrap();
    assert_eq!(built.trim(), "release=1");
}

#[test]
fn test_alias_and_invoke() {
    let temp_dir = create_temp_dir();
    create_cokefile(temp_dir.path(), COKEFILE);

    let output = coke(temp_dir.path(), &["bd"]);
    assert!(output.status.success(), "{output:?}");
    assert!(temp_dir.path().join("lib/build.txt").is_file());
    assert!(temp_dir.path().join("docs.txt").is_file());
}

#[test]
fn test_unknown_task() {
    let temp_dir = create_temp_dir();
    create_cokefile(temp_dir.path(), COKEFILE);

    let output = coke(temp_dir.path(), &["deploy"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("deploy"));
}

#[test]
fn test_failing_task_stops_the_run() {
    let temp_dir = create_temp_dir();
    create_cokefile(temp_dir.path(), COKEFILE);

    let output = coke(temp_dir.path(), &["broken", "after"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("broken"));
    assert!(!temp_dir.path().join("after.txt").exists());
}

#[test]
fn test_tasks_run_in_argument_order() {
    let temp_dir = create_temp_dir();
    create_cokefile(
        temp_dir.path(),
        "task one { echo one >> order.txt }\ntask two { echo two >> order.txt }\n",
    );

    let output = coke(temp_dir.path(), &["two", "one"]);
    assert!(output.status.success(), "{output:?}");
    let order = fs::read_to_string(temp_dir.path().join("order.txt")).unwrap();
    assert_eq!(order, "two\none\n");
}

#[test]
fn test_cokefile_flag() {
    let temp_dir = create_temp_dir();
    write_file(
        &temp_dir.path().join("tasks.coke"),
        "task mark { echo here > mark.txt }\n",
    );
    let nested = temp_dir.path().join("sub");
    fs::create_dir_all(&nested).unwrap();

    let output = coke(&nested, &["-f", "tasks.coke", "mark"]);
    assert!(output.status.success(), "{output:?}");
    assert!(temp_dir.path().join("mark.txt").is_file());
    assert!(!nested.join("mark.txt").exists());
}

#[test]
fn test_cokefile_flag_in_subdirectory_keeps_cwd() {
    let temp_dir = create_temp_dir();
    let ci = temp_dir.path().join("ci");
    write_file(&ci.join("tasks.coke"), "task mark { echo here > mark.txt }\n");

    let output = coke(temp_dir.path(), &["-f", "ci/tasks.coke", "mark"]);
    assert!(output.status.success(), "{output:?}");
    assert!(temp_dir.path().join("mark.txt").is_file());
    assert!(!ci.join("mark.txt").exists());
}

#[test]
fn test_cokefile_flag_missing_file() {
    let temp_dir = create_temp_dir();
    let output = coke(temp_dir.path(), &["--cokefile", "nope", "build"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no \"nope\""));
}

#[test]
fn test_manifest_parse_error() {
    let temp_dir = create_temp_dir();
    create_cokefile(temp_dir.path(), "task ok { true }\ntask broken \"no body\"\n");

    let output = coke(temp_dir.path(), &["ok"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--> Cokefile:2:"), "got: {stderr}");
    assert!(stderr.contains("task broken \"no body\""));
}
