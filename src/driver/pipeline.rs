//! One compilation unit through lex, parse, compile, run and write.

use std::io::Write;
use std::path::Path;

use super::DriverFlags;
use super::output_file::OutputWriter;
use crate::engine::{CompileOptions, Engine, LexOptions, RunOptions, Token};
use crate::error::{CocoError, Result};
use crate::hooks::{CompilationContext, Hooks, Stage};

/// Whether a stage lets the unit continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Stop,
}

/// How a unit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// Every stage ran, including `write`.
    Completed,
    /// A stage asked to stop early (`--lex`, `--ast`, execute mode, ...).
    Stopped,
    /// The unit failed and was reported; the process keeps going.
    Failed,
    /// The unit failed and the process should exit with this diagnostic.
    Fatal(String),
}

pub struct Pipeline<'a, E: Engine> {
    engine: &'a mut E,
    hooks: &'a mut Hooks,
    flags: &'a DriverFlags,
    argv: &'a [String],
    writer: OutputWriter,
}

impl<'a, E: Engine> Pipeline<'a, E> {
    pub fn new(
        engine: &'a mut E,
        hooks: &'a mut Hooks,
        flags: &'a DriverFlags,
        argv: &'a [String],
    ) -> Self {
        let writer = OutputWriter::new(flags.output.clone(), flags.json, flags.watch);
        Pipeline {
            engine,
            hooks,
            flags,
            argv,
            writer,
        }
    }

    /// Carry `input` through every stage. `source` is the file it came from,
    /// if any; `base` is the top-level argument that file was found under.
    pub fn compile_unit(
        &mut self,
        input: String,
        source: Option<&Path>,
        base: Option<&Path>,
        out: &mut dyn Write,
    ) -> UnitOutcome {
        let options = CompileOptions {
            filename: source.map(|s| s.display().to_string()),
            bare: self.flags.bare,
            eval: false,
        };
        let mut ctx = CompilationContext::new(input, options);

        match self.run_stages(&mut ctx, source, base, out) {
            Ok(Step::Continue) => {
                self.hooks.emit(Stage::Success, &mut ctx);
                UnitOutcome::Completed
            }
            Ok(Step::Stop) => UnitOutcome::Stopped,
            Err(err) => self.fail(&err, &ctx),
        }
    }

    fn run_stages(
        &mut self,
        ctx: &mut CompilationContext,
        source: Option<&Path>,
        base: Option<&Path>,
        out: &mut dyn Write,
    ) -> Result<Step> {
        let flags = self.flags;

        self.hooks.emit(Stage::Lex, ctx);
        let tokens = self.engine.tokenize(&ctx.input, &LexOptions { raw: flags.lex })?;
        if flags.lex || flags.tokens {
            write!(out, "{}", render_tokens(&tokens))?;
            ctx.tokens = Some(tokens);
            return Ok(Step::Stop);
        }
        ctx.tokens = Some(tokens);

        self.hooks.emit(Stage::Parse, ctx);
        let program = self.engine.parse(ctx.tokens.as_deref().unwrap_or_default())?;
        if flags.ast {
            let dump = if flags.json {
                program.to_json()?
            } else {
                program.to_string().trim().to_string()
            };
            writeln!(out, "{dump}")?;
            ctx.ast = Some(program);
            return Ok(Step::Stop);
        }
        ctx.ast = Some(program);

        self.hooks.emit(Stage::Compile, ctx);
        let execute = flags.execute();
        ctx.options.bare = ctx.options.bare || flags.json || execute;
        // An observer may have dropped the tree.
        let Some(program) = ctx.ast.as_mut() else {
            return Ok(Step::Stop);
        };
        if flags.json || (execute && flags.print) {
            program.make_return();
        }
        ctx.output = Some(self.engine.compile(program, &ctx.options)?);

        if execute || flags.json {
            self.hooks.emit(Stage::Run, ctx);
            let run_options = RunOptions {
                filename: ctx.options.filename.clone(),
                argv: self.argv.to_vec(),
            };
            if let Some(program) = ctx.ast.as_ref() {
                let result = self.engine.run(program, &run_options)?;
                if flags.json {
                    let json = serde_json::to_string_pretty(&result.to_json())?;
                    ctx.output = Some(format!("{json}\n"));
                }
                ctx.result = Some(result);
            }
        }

        if execute {
            if flags.json {
                write!(out, "{}", ctx.output.as_deref().unwrap_or_default())?;
            } else if flags.print
                && let Some(result) = &ctx.result
            {
                writeln!(out, "{}", result.inspect())?;
            }
            return Ok(Step::Stop);
        }

        self.hooks.emit(Stage::Write, ctx);
        let output = ctx.output.as_deref().unwrap_or_default();
        match source {
            Some(source) if !flags.print => {
                self.writer.write(source, output, base);
            }
            _ => writeln!(out, "{}", output.trim_end())?,
        }
        Ok(Step::Continue)
    }

    fn fail(&mut self, err: &CocoError, ctx: &CompilationContext) -> UnitOutcome {
        if self.hooks.has_failure_observers() {
            self.hooks.emit_failure(err, ctx);
            return UnitOutcome::Failed;
        }

        if let Some(filename) = &ctx.options.filename {
            eprintln!("Failed at: {filename}");
        }
        let message = if err.is_syntax() {
            err.to_string()
        } else {
            format!(
                "{err}\n    at {} ({})",
                ctx.stage,
                ctx.options.filename.as_deref().unwrap_or("<input>")
            )
        };

        if self.flags.watch {
            eprintln!("{message}\x07");
            UnitOutcome::Failed
        } else {
            UnitOutcome::Fatal(message)
        }
    }
}

/// Tokens grouped by source line, one output line per source line.
#[must_use]
pub fn render_tokens(tokens: &[Token]) -> String {
    let line_count = tokens.iter().map(|t| t.line + 1).max().unwrap_or(0);
    let mut lines: Vec<Vec<String>> = vec![Vec::new(); line_count];
    for token in tokens {
        let rendered = if token.tag.to_lowercase() == token.value {
            token.tag.clone()
        } else {
            format!("{}:{}", token.tag, token.value)
        };
        lines[token.line].push(rendered);
    }

    let mut out = String::new();
    for line in lines {
        out.push_str(&line.join(" ").replace('\n', "\\n"));
        out.push('\n');
    }
    out
}
