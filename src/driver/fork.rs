//! Re-launching under an alternate runtime (`--nodejs`).

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

pub const PASS_THROUGH_FLAG: &str = "--nodejs";

/// Remove every `--nodejs VALUE` pair and `--nodejs=VALUE` token.
#[must_use]
pub fn strip_pass_through(args: &[String]) -> Vec<String> {
    let mut remaining = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == PASS_THROUGH_FLAG {
            iter.next();
        } else if !arg
            .strip_prefix(PASS_THROUGH_FLAG)
            .is_some_and(|rest| rest.starts_with('='))
        {
            remaining.push(arg.clone());
        }
    }
    remaining
}

/// Runtime argv: the whitespace-split pass-through values, then the
/// remaining command-line arguments.
#[must_use]
pub fn runtime_arguments(pass_through: &[String], args: &[String]) -> Vec<String> {
    pass_through
        .join(" ")
        .split_whitespace()
        .map(String::from)
        .chain(strip_pass_through(args))
        .collect()
}

/// Spawn `runtime` with inherited stdio, working directory and environment,
/// and wait for it.
///
/// # Errors
///
/// Returns `Err` if the process cannot be spawned or waited on.
pub fn fork_runtime(runtime: &Path, pass_through: &[String], args: &[String]) -> io::Result<ExitStatus> {
    let arguments = runtime_arguments(pass_through, args);
    log::debug!("forking {} {}", runtime.display(), arguments.join(" "));
    Command::new(runtime)
        .args(&arguments)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_strip_pairs_and_equals_form() {
        let args = strings(&["--nodejs", "--harmony", "-p", "--nodejs=--trace", "app.co", "x"]);
        assert_eq!(strip_pass_through(&args), strings(&["-p", "app.co", "x"]));
    }

    #[test]
    fn test_runtime_arguments_split_on_whitespace() {
        let args = strings(&["--nodejs", "--a --b", "main.co"]);
        let pass = strings(&["--a --b", " --c "]);
        assert_eq!(
            runtime_arguments(&pass, &args),
            strings(&["--a", "--b", "--c", "main.co"])
        );
    }

    #[test]
    fn test_trailing_flag_without_value() {
        let args = strings(&["main.co", "--nodejs"]);
        assert_eq!(strip_pass_through(&args), strings(&["main.co"]));
    }

    #[cfg(unix)]
    #[test]
    fn test_fork_reports_child_status() {
        let status = fork_runtime(Path::new("false"), &[], &[]).unwrap();
        assert_eq!(status.code(), Some(1));
    }
}
