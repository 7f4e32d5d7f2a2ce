//! Cokefile parsing and loading.

mod block;
mod error;

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use std::fs;
use std::path::Path;

pub use block::Step;
pub use error::ManifestError;

use super::Registrar;
use super::optparse::FlagDecl;
use super::shell;
use crate::error::CokeError;

#[derive(Parser)]
#[grammar = "coke/cokefile.pest"]
struct CokefileParser;

/// One top-level manifest declaration, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Task {
        name: String,
        description: Option<String>,
        steps: Vec<Step>,
    },
    Option {
        name: String,
        decl: FlagDecl,
    },
}

/// Parse manifest source into declarations.
///
/// # Errors
///
/// Returns a `ManifestError` carrying the line, column and source excerpt of
/// the first syntax error.
pub fn parse_manifest(
    source: &str,
    filename: Option<&str>,
) -> Result<Vec<Declaration>, Box<ManifestError>> {
    let mut pairs = CokefileParser::parse(Rule::manifest, source)
        .map_err(|e| Box::new(ManifestError::from_pest(&e, source, filename)))?;

    let Some(manifest) = pairs.next() else {
        return Ok(Vec::new());
    };

    let mut declarations = Vec::new();
    for pair in manifest.into_inner() {
        match pair.as_rule() {
            Rule::task_decl => declarations.push(task_declaration(pair)),
            Rule::option_decl => declarations.push(option_declaration(pair)),
            _ => {}
        }
    }
    Ok(declarations)
}

fn task_declaration(pair: Pair<Rule>) -> Declaration {
    let mut name = String::new();
    let mut description = None;
    let mut steps = Vec::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::name => name = name_text(part),
            Rule::description => description = Some(name_text(part)),
            Rule::block => steps = block::parse_steps(part.as_str()),
            _ => {}
        }
    }
    Declaration::Task {
        name,
        description,
        steps,
    }
}

fn option_declaration(pair: Pair<Rule>) -> Declaration {
    let mut name = String::new();
    let mut description = String::new();
    let mut placeholder = None;
    let mut default = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::name => name = name_text(part),
            Rule::description => description = name_text(part),
            Rule::placeholder => placeholder = Some(part.as_str().to_string()),
            Rule::default_value => default = Some(name_text(part)),
            _ => {}
        }
    }

    let decl = match placeholder {
        Some(placeholder) => FlagDecl::Value {
            description,
            placeholder,
            default,
        },
        None => FlagDecl::Switch { description },
    };
    Declaration::Option { name, decl }
}

/// Text of a `name`, `description` or `default_value` pair.
fn name_text(pair: Pair<Rule>) -> String {
    let raw = pair.as_str();
    match pair.into_inner().next() {
        Some(inner) if inner.as_rule() == Rule::quoted => {
            let text = inner.into_inner().next().map_or("", |p| p.as_str());
            unescape(text)
        }
        Some(inner) => inner.as_str().to_string(),
        None => raw.to_string(),
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Read the manifest at `path` and register its declarations in file order.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read or does not parse.
pub fn load(path: &Path, registrar: &mut dyn Registrar) -> Result<(), CokeError> {
    let source = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let declarations = parse_manifest(&source, filename.as_deref())?;
    log::debug!(
        "loaded {} declaration(s) from {}",
        declarations.len(),
        path.display()
    );

    for declaration in declarations {
        match declaration {
            Declaration::Task {
                name,
                description,
                steps,
            } => {
                let action = shell::task_action(name.clone(), steps);
                registrar.task(&name, description.as_deref(), action);
            }
            Declaration::Option { name, decl } => registrar.option(&name, decl),
        }
    }
    Ok(())
}
