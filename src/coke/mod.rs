//! The `coke` task runner.

pub mod manifest;
pub mod optparse;
pub mod registry;
pub mod shell;
pub mod usage;

use std::env;
use std::io::{self, Write};

use crate::config;
use crate::error::CokeError;
use crate::fatal_error;
use optparse::{FlagDecl, FlagSpec};
use registry::{Action, TaskRegistry};

/// Manifest file searched for from the working directory upwards unless
/// `-f` names another.
pub const MANIFEST_NAME: &str = "Cokefile";

/// What a manifest may do while it is being loaded.
pub trait Registrar {
    fn task(&mut self, name: &str, description: Option<&str>, action: Action);
    fn option(&mut self, name: &str, decl: FlagDecl);
}

/// Tasks and task-level flags collected from one manifest.
#[derive(Debug, Default)]
pub struct BuildSession {
    pub registry: TaskRegistry,
    pub flags: FlagSpec,
}

impl Registrar for BuildSession {
    fn task(&mut self, name: &str, description: Option<&str>, action: Action) {
        self.registry.register(name, description, action);
    }

    fn option(&mut self, name: &str, decl: FlagDecl) {
        self.flags.declare(name, decl);
    }
}

/// Entry point of the `coke` binary.
pub fn run_coke() {
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args, &mut io::stdout()) {
        fatal_error(&e.to_string());
    }
}

/// Load the manifest and run the requested tasks in order, or print usage
/// when there are no arguments.
///
/// # Errors
///
/// Fails on the first missing manifest, parse error, unknown task or failing
/// task.
pub fn run(args: &[String], out: &mut dyn Write) -> Result<(), CokeError> {
    let (explicit, rest) = split_manifest_flag(args)?;
    let name = explicit.unwrap_or(MANIFEST_NAME);
    let cwd = env::current_dir()?;
    let root = config::manifest_root(&cwd, name)?;
    let manifest = root.join(name);

    let mut session = BuildSession::default();
    manifest::load(&manifest, &mut session)?;
    if root != cwd {
        env::set_current_dir(&root)?;
    }

    if rest.is_empty() {
        out.write_all(usage::render_usage(&session).as_bytes())?;
        return Ok(());
    }

    let options = session.flags.parse(rest)?;
    if !options.unknown.is_empty() {
        log::debug!("ignoring undeclared flags: {:?}", options.unknown);
    }
    for task in &options.positional {
        session.registry.invoke(task, &options)?;
    }
    Ok(())
}

/// `-f FILE`, `--cokefile FILE` or `--cokefile=FILE`, only as the first
/// argument.
fn split_manifest_flag(args: &[String]) -> Result<(Option<&str>, &[String]), CokeError> {
    match args.first().map(String::as_str) {
        Some(flag @ ("-f" | "--cokefile")) => match args.get(1) {
            Some(path) => Ok((Some(path.as_str()), &args[2..])),
            None => Err(CokeError::MissingManifestArg(flag.to_string())),
        },
        Some(flag) => match flag.strip_prefix("--cokefile=") {
            Some(path) => Ok((Some(path), &args[1..])),
            None => Ok((None, args)),
        },
        None => Ok((None, args)),
    }
}
