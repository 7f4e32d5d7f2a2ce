//! Compilation driver
//!
//! Turns the parsed `coco` command line into work: source discovery, the
//! per-unit pipeline, watch polling, output placement and the runtime fork.

pub mod fork;
mod output_file;
mod pipeline;
mod walker;
mod watch;

pub use output_file::OutputWriter;
pub use pipeline::{Pipeline, Step, UnitOutcome, render_tokens};
pub use walker::{SOURCE_EXTENSION, SourceUnit, SourceWalker, normalize};
pub use watch::{POLL_INTERVAL, WatchLoop, WatchState};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::engine::{Coco, CompileOptions, Engine, LexOptions, RunOptions};
use crate::error::Result;
use crate::hooks::Hooks;

/// Mode switches shared by every unit of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverFlags {
    pub compile: bool,
    pub output: Option<PathBuf>,
    pub watch: bool,
    pub bare: bool,
    pub print: bool,
    pub lex: bool,
    pub tokens: bool,
    pub ast: bool,
    pub json: bool,
}

impl DriverFlags {
    /// Execute mode: evaluate instead of emitting code. `--output` implies compile.
    #[must_use]
    pub fn execute(&self) -> bool {
        !(self.compile || self.output.is_some())
    }
}

pub struct Driver<E: Engine = Coco> {
    engine: E,
    hooks: Hooks,
    flags: DriverFlags,
    argv: Vec<String>,
}

impl<E: Engine> Driver<E> {
    pub fn new(engine: E, flags: DriverFlags) -> Self {
        Driver {
            engine,
            hooks: Hooks::new(),
            flags,
            argv: Vec::new(),
        }
    }

    #[must_use]
    pub fn flags(&self) -> &DriverFlags {
        &self.flags
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Arguments exposed to executed scripts as `argv`.
    pub fn set_argv(&mut self, argv: Vec<String>) {
        self.argv = argv;
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Compile and run `path` in the shared engine ahead of the main work.
    ///
    /// # Errors
    ///
    /// Returns read, syntax and runtime failures of the preloaded file.
    pub fn require(&mut self, path: &Path) -> Result<()> {
        log::debug!("require {}", path.display());
        let source = fs::read_to_string(path)?;
        let tokens = self.engine.tokenize(&source, &LexOptions::default())?;
        let program = self.engine.parse(&tokens)?;
        let filename = Some(path.display().to_string());
        self.engine.compile(
            &program,
            &CompileOptions {
                filename: filename.clone(),
                bare: true,
                eval: false,
            },
        )?;
        self.engine.run(
            &program,
            &RunOptions {
                filename,
                argv: self.argv.clone(),
            },
        )?;
        Ok(())
    }

    /// Run one in-memory unit.
    pub fn compile_source(
        &mut self,
        input: String,
        source: Option<&Path>,
        base: Option<&Path>,
        out: &mut dyn Write,
    ) -> UnitOutcome {
        Pipeline::new(&mut self.engine, &mut self.hooks, &self.flags, &self.argv)
            .compile_unit(input, source, base, out)
    }

    /// Read and run one discovered file.
    pub fn compile_file(&mut self, unit: &SourceUnit, out: &mut dyn Write) -> UnitOutcome {
        match fs::read_to_string(&unit.path) {
            Ok(input) => self.compile_source(input, Some(&unit.path), Some(&unit.base), out),
            Err(e) => UnitOutcome::Fatal(format!("{}: {e}", unit.path.display())),
        }
    }
}
