//! Running task bodies.

use std::process::{Command, Stdio};
use std::rc::Rc;

use super::manifest::Step;
use super::optparse::Options;
use super::registry::{Action, TaskRegistry};
use crate::config;
use crate::error::CokeError;

/// Prefix of the environment variables carrying parsed task options.
pub const ENV_PREFIX: &str = "COKE_";

/// Build the action for a manifest task.
pub fn task_action(task: String, steps: Vec<Step>) -> Action {
    Rc::new(move |registry: &TaskRegistry, options: &Options| {
        for step in &steps {
            match step {
                Step::Invoke(target) => registry.invoke(target, options)?,
                Step::Script(script) => run_script(&task, script, options)?,
            }
        }
        Ok(())
    })
}

fn run_script(task: &str, script: &str, options: &Options) -> Result<(), CokeError> {
    let (shell, flag) = config::get_task_shell();
    log::debug!("task {task:?}: {shell} {flag} <{} bytes>", script.len());

    let status = Command::new(&shell)
        .arg(flag)
        .arg(script)
        .envs(option_env(options))
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        return Err(CokeError::TaskFailed {
            task: task.to_string(),
            status,
        });
    }
    Ok(())
}

/// `COKE_<NAME>` variables for every set option.
#[must_use]
pub fn option_env(options: &Options) -> Vec<(String, String)> {
    options
        .values()
        .filter_map(|(name, value)| Some((env_name(name), value.env_value()?)))
        .collect()
}

fn env_name(option: &str) -> String {
    let upper: String = option
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{ENV_PREFIX}{upper}")
}
