//! # coco
//!
//! A compiler driver for `.co` sources and `coke`, a small task runner.
//!
//! `coco` carries each source through lex, parse, compile, run and write
//! stages with observer hooks, a REPL, watch mode and output placement.
//! `coke` finds the nearest `Cokefile`, registers its tasks and task-level
//! flags, and runs the tasks named on the command line.

pub mod ast;
pub mod cli;
pub mod codegen;
pub mod coke;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod interpreter;
pub mod parser;
pub mod repl;

/// Print an error message and exit with code 1.
pub fn fatal_error(message: &str) -> ! {
    log::debug!("fatal: {message}");
    eprintln!("{message}");
    std::process::exit(1);
}

/// Report a recoverable problem on stderr.
pub fn warn(message: &str) {
    eprintln!("{message}");
}
