//! Stage observers for the compilation pipeline.
//!
//! Observers registered for a [`Stage`] run, in registration order, just
//! before that stage does its work and may mutate the unit's context (for
//! example rewriting `input` on `Lex`). Failure observers replace the
//! default diagnostics when any are registered.

use std::collections::HashMap;
use std::fmt;

use crate::ast::Program;
use crate::engine::{CompileOptions, Token};
use crate::error::CocoError;
use crate::interpreter::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Lex,
    Parse,
    Compile,
    Run,
    Write,
    Success,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
            Stage::Compile => "compile",
            Stage::Run => "run",
            Stage::Write => "write",
            Stage::Success => "success",
        })
    }
}

/// Everything known about one compilation unit as it moves through the stages.
#[derive(Debug, Clone)]
pub struct CompilationContext {
    pub input: String,
    pub options: CompileOptions,
    pub tokens: Option<Vec<Token>>,
    pub ast: Option<Program>,
    pub output: Option<String>,
    pub result: Option<Value>,
    pub stage: Stage,
}

impl CompilationContext {
    #[must_use]
    pub fn new(input: String, options: CompileOptions) -> Self {
        CompilationContext {
            input,
            options,
            tokens: None,
            ast: None,
            output: None,
            result: None,
            stage: Stage::Lex,
        }
    }
}

type StageObserver = Box<dyn FnMut(&mut CompilationContext)>;
type FailureObserver = Box<dyn FnMut(&CocoError, &CompilationContext)>;

#[derive(Default)]
pub struct Hooks {
    stages: HashMap<Stage, Vec<StageObserver>>,
    failures: Vec<FailureObserver>,
}

impl Hooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, stage: Stage, observer: impl FnMut(&mut CompilationContext) + 'static) {
        self.stages.entry(stage).or_default().push(Box::new(observer));
    }

    pub fn on_failure(&mut self, observer: impl FnMut(&CocoError, &CompilationContext) + 'static) {
        self.failures.push(Box::new(observer));
    }

    #[must_use]
    pub fn has_failure_observers(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Enter `stage` and notify its observers.
    pub fn emit(&mut self, stage: Stage, ctx: &mut CompilationContext) {
        log::debug!(
            "{stage}: {}",
            ctx.options.filename.as_deref().unwrap_or("<input>")
        );
        ctx.stage = stage;
        if let Some(observers) = self.stages.get_mut(&stage) {
            for observer in observers {
                observer(ctx);
            }
        }
    }

    pub fn emit_failure(&mut self, err: &CocoError, ctx: &CompilationContext) {
        log::debug!("failure at {}: {err}", ctx.stage);
        for observer in &mut self.failures {
            observer(err, ctx);
        }
    }
}
