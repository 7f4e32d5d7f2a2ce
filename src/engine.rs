//! The compiler engine seam.
//!
//! The driver only talks to an [`Engine`]; [`Coco`] is the engine shipped
//! with this crate. It lexes and parses .co sources, emits JavaScript, and
//! evaluates programs directly for the run and REPL modes.

use crate::ast::Program;
use crate::codegen;
use crate::error::Result;
use crate::interpreter::{Interpreter, Value};
use crate::parser;

/// A lexical token: tag, source text, zero-based line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub tag: String,
    pub value: String,
    pub line: usize,
}

impl Token {
    pub fn new(tag: &str, value: &str, line: usize) -> Self {
        Token {
            tag: tag.to_string(),
            value: value.to_string(),
            line,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexOptions {
    /// Skip the rewriter and keep comments.
    pub raw: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub filename: Option<String>,
    /// Omit the top-level function wrapper.
    pub bare: bool,
    /// Compiling for an interactive session: globals persist, so no `var` hoisting.
    pub eval: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub filename: Option<String>,
    /// Exposed to the program as the `argv` global.
    pub argv: Vec<String>,
}

/// Everything the driver needs from a compiler.
pub trait Engine {
    fn version(&self) -> &str;

    /// # Errors
    ///
    /// Returns a syntax-class error for input that does not lex.
    fn tokenize(&self, input: &str, options: &LexOptions) -> Result<Vec<Token>>;

    /// # Errors
    ///
    /// Returns a syntax-class error for token streams that do not parse.
    fn parse(&self, tokens: &[Token]) -> Result<Program>;

    /// # Errors
    ///
    /// Returns `Err` if the engine cannot emit code for `program`.
    fn compile(&self, program: &Program, options: &CompileOptions) -> Result<String>;

    /// Evaluate `program` and return its completion value.
    ///
    /// # Errors
    ///
    /// Returns runtime errors raised by the program.
    fn run(&mut self, program: &Program, options: &RunOptions) -> Result<Value>;

    fn set_global(&mut self, name: &str, value: Value);

    /// Names currently bound in the global scope.
    fn global_names(&self) -> Vec<String>;
}

/// The bundled engine.
#[derive(Debug, Default)]
pub struct Coco {
    interpreter: Interpreter,
}

impl Coco {
    #[must_use]
    pub fn new() -> Self {
        Coco::default()
    }
}

impl Engine for Coco {
    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn tokenize(&self, input: &str, options: &LexOptions) -> Result<Vec<Token>> {
        parser::lexer::tokenize(input, options)
    }

    fn parse(&self, tokens: &[Token]) -> Result<Program> {
        parser::parse_tokens(tokens)
    }

    fn compile(&self, program: &Program, options: &CompileOptions) -> Result<String> {
        Ok(codegen::generate(program, options))
    }

    fn run(&mut self, program: &Program, options: &RunOptions) -> Result<Value> {
        log::debug!(
            "running {}",
            options.filename.as_deref().unwrap_or("<input>")
        );
        let argv = options.argv.iter().cloned().map(Value::String).collect();
        self.interpreter.set_global("argv", Value::Array(argv));
        self.interpreter.execute(program)
    }

    fn set_global(&mut self, name: &str, value: Value) {
        self.interpreter.set_global(name, value);
    }

    fn global_names(&self) -> Vec<String> {
        self.interpreter.global_names()
    }
}
