//! CLI module containing the `coco` entry point logic.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser as ClapParser};
use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use crate::driver::{Driver, DriverFlags, SourceWalker, UnitOutcome, WatchLoop, fork};
use crate::engine::{Coco, Engine};
use crate::repl::{self, EngineEvaluator, ReplSession};
use crate::{config, fatal_error};

/// CLI arguments for the compiler driver.
#[derive(ClapParser, Debug)]
#[command(name = "coco")]
#[command(override_usage = "coco [options] [files] [arguments]")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// start REPL; use ^J for multiline input
    #[arg(short, long)]
    interactive: bool,

    /// compile to JavaScript and save as .js files
    #[arg(short, long)]
    compile: bool,

    /// compile into the specified directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// watch scripts for changes, and repeat
    #[arg(short, long)]
    watch: bool,

    /// read stdin
    #[arg(short, long)]
    stdin: bool,

    /// read command line arguments as script
    #[arg(short, long)]
    eval: bool,

    /// require libraries before executing
    #[arg(short, long, value_name = "FILE")]
    require: Vec<String>,

    /// compile without the top-level function wrapper
    #[arg(short, long)]
    bare: bool,

    /// print the result to stdout
    #[arg(short, long)]
    print: bool,

    /// print the tokens the lexer produces
    #[arg(short, long)]
    lex: bool,

    /// print the tokens the rewriter produces
    #[arg(short, long)]
    tokens: bool,

    /// print the syntax tree the parser produces
    #[arg(short, long)]
    ast: bool,

    /// print/compile as JSON
    #[arg(short, long)]
    json: bool,

    /// pass options through to the runtime binary
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    nodejs: Vec<String>,

    /// display version
    #[arg(short, long)]
    version: bool,

    /// display this help message
    #[arg(short, long)]
    help: bool,

    /// Sources to compile, then arguments for the script
    #[arg(value_name = "FILES", trailing_var_arg = true)]
    args: Vec<String>,
}

impl Cli {
    fn flags(&self) -> DriverFlags {
        DriverFlags {
            compile: self.compile || self.output.is_some(),
            output: self.output.clone(),
            watch: self.watch,
            bare: self.bare,
            print: self.print,
            lex: self.lex,
            tokens: self.tokens,
            ast: self.ast,
            json: self.json,
        }
    }

    /// Arguments the executed script sees as `argv`.
    fn script_argv(&self) -> Vec<String> {
        if self.stdin {
            self.args.clone()
        } else if !self.flags().execute() {
            Vec::new()
        } else {
            self.args.iter().skip(1).cloned().collect()
        }
    }

    /// Inline code for `--eval`: the first positional when executing, every
    /// positional as one line each when compiling.
    fn eval_source(&self) -> String {
        self.sources().join("\n")
    }

    /// Paths handed to the walker: only the script itself in execute mode.
    fn sources(&self) -> &[String] {
        if self.flags().execute() {
            &self.args[..self.args.len().min(1)]
        } else {
            &self.args
        }
    }
}

fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut remaining = args.to_vec();
    let mut unknown = Vec::new();

    // clap stops at the first unknown flag; drop it and retry to find the rest.
    let error = loop {
        let err = match Cli::try_parse_from(&remaining) {
            Ok(cli) if unknown.is_empty() => return Ok(cli),
            Ok(_) => break None,
            Err(err) => err,
        };
        if err.kind() != ErrorKind::UnknownArgument {
            break Some(err);
        }
        let Some(ContextValue::String(flag)) = err.get(ContextKind::InvalidArg) else {
            break Some(err);
        };
        let flag = flag.clone();
        let position = remaining.iter().skip(1).position(|arg| *arg == flag);
        unknown.push(flag);
        match position {
            Some(index) => {
                remaining.remove(index + 1);
            }
            None => break None,
        }
    };

    if unknown.is_empty() {
        let message = error.map(|err| err.to_string()).unwrap_or_default();
        return Err(message.trim_end().to_string());
    }
    Err(format!(
        "Unrecognized option(s): {}\n\n{}",
        unknown.join(" "),
        help_text()
    ))
}

fn help_text() -> String {
    Cli::command().render_help().to_string().trim_end().to_string()
}

fn version_line() -> String {
    format!("Coco {}", Coco::new().version())
}

/// Main CLI logic for the `coco` binary.
pub fn run_cli() {
    let args: Vec<String> = env::args().collect();
    let cli = parse_args(&args).unwrap_or_else(|message| fatal_error(&message));

    if !cli.nodejs.is_empty() {
        fork_node(&cli.nodejs, args.get(1..).unwrap_or_default());
    }
    if cli.version {
        println!("{}", version_line());
        return;
    }
    if cli.help {
        println!("{}", help_text());
        return;
    }

    let mut driver = Driver::new(Coco::new(), cli.flags());
    driver.set_argv(cli.script_argv());
    for path in &cli.require {
        if let Err(e) = driver.require(Path::new(path)) {
            fatal_error(&e.to_string());
        }
    }

    if cli.eval {
        exit_on_fatal(driver.compile_source(cli.eval_source(), None, None, &mut io::stdout()));
    } else if cli.interactive {
        start_repl(driver);
    } else if cli.stdin {
        compile_stdin(&mut driver);
    } else if !cli.args.is_empty() {
        compile_scripts(&mut driver, cli.sources());
    } else if io::stdin().is_terminal() {
        println!("{}", version_line());
        println!("{}", help_text());
        start_repl(driver);
    } else {
        compile_stdin(&mut driver);
    }
}

fn exit_on_fatal(outcome: UnitOutcome) {
    if let UnitOutcome::Fatal(message) = outcome {
        fatal_error(&message);
    }
}

fn compile_stdin(driver: &mut Driver) {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        fatal_error(&e.to_string());
    }
    exit_on_fatal(driver.compile_source(input, None, None, &mut io::stdout()));
}

fn compile_scripts(driver: &mut Driver, paths: &[String]) {
    let units = SourceWalker::new(paths)
        .collect()
        .unwrap_or_else(|e| fatal_error(&e.to_string()));
    let mut stdout = io::stdout();

    if !driver.flags().watch {
        for unit in &units {
            exit_on_fatal(driver.compile_file(unit, &mut stdout));
        }
        return;
    }

    let mut watcher = WatchLoop::new();
    for unit in units {
        watcher.watch(unit.path.clone(), unit);
    }
    let result = watcher.run(|unit| exit_on_fatal(driver.compile_file(unit, &mut stdout)));
    if let Err(e) = result {
        fatal_error(&e.to_string());
    }
}

fn start_repl(driver: Driver) {
    let flags = driver.flags().clone();
    let evaluator = EngineEvaluator::new(driver.into_engine(), flags.bare, flags.compile);
    let session = ReplSession::new(evaluator, repl::prompt_name(flags.bare, flags.compile));
    if let Err(e) = session.run() {
        fatal_error(&e.to_string());
    }
}

fn fork_node(pass_through: &[String], args: &[String]) -> ! {
    let runtime = config::get_runtime_program()
        .unwrap_or_else(|e| fatal_error(&format!("cannot find runtime: {e}")));
    match fork::fork_runtime(&runtime, pass_through, args) {
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(e) => fatal_error(&e.to_string()),
    }
}
