//! Interactive REPL (Read-Eval-Print Loop) for coco.
//!
//! Lines submitted with Ctrl-J accumulate into a buffer; a plain Enter (or
//! the third Ctrl-J in a row) evaluates everything buffered so far.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Context, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};

use crate::engine::{CompileOptions, Engine, LexOptions, RunOptions};
use crate::error::Result;
use crate::parser::lexer::LITERALS;

/// What the REPL needs from a language backend.
pub trait Evaluator {
    /// Evaluate one submission, returning the text to echo.
    ///
    /// # Errors
    ///
    /// Returns whatever the backend raised; the session prints it and goes on.
    fn evaluate(&mut self, code: &str) -> Result<String>;

    /// Completion candidates starting with `prefix`.
    fn complete(&self, prefix: &str) -> Vec<String>;
}

/// Adapts an [`Engine`] to the REPL.
pub struct EngineEvaluator<E: Engine> {
    engine: E,
    bare: bool,
    compile_only: bool,
}

impl<E: Engine> EngineEvaluator<E> {
    pub fn new(engine: E, bare: bool, compile_only: bool) -> Self {
        EngineEvaluator {
            engine,
            bare,
            compile_only,
        }
    }
}

impl<E: Engine> Evaluator for EngineEvaluator<E> {
    fn evaluate(&mut self, code: &str) -> Result<String> {
        let tokens = self.engine.tokenize(code, &LexOptions::default())?;
        let program = self.engine.parse(&tokens)?;

        if self.compile_only {
            let options = CompileOptions {
                filename: None,
                bare: self.bare,
                eval: true,
            };
            let js = self.engine.compile(&program, &options)?;
            return Ok(js.trim_end().to_string());
        }

        let value = self.engine.run(&program, &RunOptions::default())?;
        if !value.is_undefined() {
            self.engine.set_global("_", value.clone());
        }
        Ok(value.inspect())
    }

    fn complete(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .engine
            .global_names()
            .into_iter()
            .chain(LITERALS.iter().map(ToString::to_string))
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Multi-line buffering state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplState {
    buffer: String,
    continuation: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Submission {
    Pending,
    Ready(String),
}

impl ReplState {
    /// Record one submitted line. `newline_key` is true for Ctrl-J.
    pub fn submit(&mut self, line: &str, newline_key: bool) -> Submission {
        if newline_key {
            self.continuation += 1;
        } else {
            self.continuation = 0;
        }

        self.buffer.push_str(line);
        if (1..3).contains(&self.continuation) {
            self.buffer.push('\n');
            return Submission::Pending;
        }

        self.continuation = 0;
        Submission::Ready(std::mem::take(&mut self.buffer))
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.continuation = 0;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.buffer.is_empty()
    }
}

/// Prompt name reflecting `--bare` / `--compile`.
#[must_use]
pub fn prompt_name(bare: bool, compile: bool) -> String {
    let mut flags = String::new();
    if bare {
        flags.push('b');
    }
    if compile {
        flags.push('c');
    }
    if flags.is_empty() {
        "coco".to_string()
    } else {
        format!("coco -{flags}")
    }
}

pub struct ReplSession<V: Evaluator> {
    evaluator: V,
    state: ReplState,
    name: String,
}

impl<V: Evaluator> ReplSession<V> {
    pub fn new(evaluator: V, name: String) -> Self {
        ReplSession {
            evaluator,
            state: ReplState::default(),
            name,
        }
    }

    #[must_use]
    pub fn prompt(&self) -> String {
        if self.state.is_pending() {
            format!("{}. ", ".".repeat(self.name.len()))
        } else {
            format!("{}> ", self.name)
        }
    }

    /// Feed one line; evaluation output and errors go to `out`.
    ///
    /// # Errors
    ///
    /// Returns `Err` only when writing to `out` fails.
    pub fn handle_line(&mut self, line: &str, newline_key: bool, out: &mut dyn Write) -> io::Result<()> {
        let Submission::Ready(code) = self.state.submit(line, newline_key) else {
            return Ok(());
        };
        match self.evaluator.evaluate(&code) {
            Ok(text) => writeln!(out, "{text}"),
            Err(err) => writeln!(out, "{err}"),
        }
    }

    /// Ctrl-C. Returns false when the session should close.
    pub fn interrupt(&mut self, line_pending: bool) -> bool {
        let keep_going = line_pending || self.state.is_pending();
        self.state.reset();
        keep_going
    }

    /// End of input: flush a pending buffer when attached to a terminal.
    ///
    /// # Errors
    ///
    /// Returns `Err` when writing to `out` fails.
    pub fn finish(&mut self, interactive: bool, out: &mut dyn Write) -> io::Result<()> {
        if interactive && self.state.is_pending() {
            self.handle_line("", false, out)?;
        }
        Ok(())
    }

    /// Drive the session from the terminal until it closes.
    ///
    /// # Errors
    ///
    /// Returns line editor failures other than interrupt and end of input.
    pub fn run(mut self) -> rustyline::Result<()> {
        let newline_pressed = Arc::new(AtomicBool::new(false));
        let line_pending = Arc::new(AtomicBool::new(false));

        let mut rl: Editor<ReplHelper, DefaultHistory> = Editor::new()?;
        rl.set_helper(Some(ReplHelper {
            candidates: self.evaluator.complete(""),
        }));
        rl.bind_sequence(
            KeyEvent::ctrl('J'),
            EventHandler::Conditional(Box::new(NewlineKey(Arc::clone(&newline_pressed)))),
        );
        rl.bind_sequence(
            KeyEvent::ctrl('C'),
            EventHandler::Conditional(Box::new(InterruptKey(Arc::clone(&line_pending)))),
        );

        let mut stdout = io::stdout();
        loop {
            match rl.readline(&self.prompt()) {
                Ok(line) => {
                    let newline_key = newline_pressed.swap(false, Ordering::Relaxed);
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    self.handle_line(&line, newline_key, &mut stdout)?;
                    if let Some(helper) = rl.helper_mut() {
                        helper.candidates = self.evaluator.complete("");
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    let pending = line_pending.swap(false, Ordering::Relaxed);
                    if !self.interrupt(pending) {
                        break;
                    }
                    println!();
                }
                Err(ReadlineError::Eof) => {
                    self.finish(io::stdout().is_terminal(), &mut stdout)?;
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

// Ctrl-J submits the line and marks it as a continuation.
struct NewlineKey(Arc<AtomicBool>);

impl ConditionalEventHandler for NewlineKey {
    fn handle(&self, _: &Event, _: RepeatCount, _: bool, _: &EventContext) -> Option<Cmd> {
        self.0.store(true, Ordering::Relaxed);
        Some(Cmd::AcceptLine)
    }
}

// Ctrl-C remembers whether anything was typed on the current line.
struct InterruptKey(Arc<AtomicBool>);

impl ConditionalEventHandler for InterruptKey {
    fn handle(&self, _: &Event, _: RepeatCount, _: bool, ctx: &EventContext) -> Option<Cmd> {
        self.0.store(!ctx.line().is_empty(), Ordering::Relaxed);
        Some(Cmd::Interrupt)
    }
}

struct ReplHelper {
    candidates: Vec<String>,
}

impl Completer for ReplHelper {
    type Candidate = String;

    fn complete(&self, line: &str, pos: usize, _: &Context<'_>) -> rustyline::Result<(usize, Vec<String>)> {
        let head = &line[..pos];
        let start = head
            .char_indices()
            .rev()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '$'))
            .map_or(0, |(i, c)| i + c.len_utf8());
        let prefix = &head[start..];
        let matches = self
            .candidates
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect();
        Ok((start, matches))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Highlighter for ReplHelper {}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}
