//! Task-level flags declared in the manifest.
//!
//! The declared flags are turned into a clap `Command` at runtime. Tokens that
//! look like flags but were never declared are set aside in `unknown` rather
//! than failing the run.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::BTreeMap;

const TASKS_ID: &str = "[tasks]";

/// How a single flag was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagDecl {
    /// Boolean flag.
    Switch { description: String },
    /// Flag taking a value. A placeholder ending in `+` takes one or more.
    Value {
        description: String,
        placeholder: String,
        default: Option<String>,
    },
}

impl FlagDecl {
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            FlagDecl::Switch { description } | FlagDecl::Value { description, .. } => description,
        }
    }

    #[must_use]
    pub fn takes_value(&self) -> bool {
        matches!(self, FlagDecl::Value { .. })
    }

    #[must_use]
    pub fn collects(&self) -> bool {
        matches!(self, FlagDecl::Value { placeholder, .. } if placeholder.ends_with('+'))
    }

    fn value_name(&self) -> Option<&str> {
        match self {
            FlagDecl::Switch { .. } => None,
            FlagDecl::Value { placeholder, .. } => Some(placeholder.trim_end_matches('+')),
        }
    }
}

/// A parsed flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl OptionValue {
    /// Text handed to task scripts; `None` for an unset switch.
    #[must_use]
    pub fn env_value(&self) -> Option<String> {
        match self {
            OptionValue::Flag(true) => Some("1".to_string()),
            OptionValue::Flag(false) => None,
            OptionValue::Text(text) => Some(text.clone()),
            OptionValue::List(items) => Some(items.join(" ")),
        }
    }
}

/// Result of applying a `FlagSpec` to argv.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<String, OptionValue>,
    pub positional: Vec<String>,
    pub unknown: Vec<String>,
}

impl Options {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Flag(true)))
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Ordered flag declarations. Declaring a name again replaces it in place.
#[derive(Debug, Clone, Default)]
pub struct FlagSpec {
    decls: Vec<(String, FlagDecl)>,
}

impl FlagSpec {
    pub fn declare(&mut self, name: &str, decl: FlagDecl) {
        match self.decls.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = decl,
            None => self.decls.push((name.to_string(), decl)),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    fn lookup(&self, name: &str) -> Option<&FlagDecl> {
        self.decls
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, decl)| decl)
    }

    /// Apply the declarations to `argv`.
    ///
    /// # Errors
    ///
    /// Returns the clap error when a declared flag is misused, e.g. a value
    /// flag given without its value.
    pub fn parse(&self, argv: &[String]) -> Result<Options, clap::Error> {
        let (known, unknown) = self.split_unknown(argv);
        let matches = self.command().try_get_matches_from(known)?;

        let mut options = Options {
            unknown,
            positional: strings(&matches, TASKS_ID),
            ..Options::default()
        };
        for (name, decl) in &self.decls {
            let value = match decl {
                FlagDecl::Switch { .. } => Some(OptionValue::Flag(matches.get_flag(name))),
                FlagDecl::Value { .. } => {
                    let mut values = strings(&matches, name);
                    if decl.collects() {
                        (!values.is_empty()).then_some(OptionValue::List(values))
                    } else {
                        values.pop().map(OptionValue::Text)
                    }
                }
            };
            if let Some(value) = value {
                options.values.insert(name.clone(), value);
            }
        }
        Ok(options)
    }

    /// Separate undeclared flag tokens from everything clap should see.
    fn split_unknown(&self, argv: &[String]) -> (Vec<String>, Vec<String>) {
        let mut known = Vec::with_capacity(argv.len());
        let mut unknown = Vec::new();
        let mut tokens = argv.iter();

        while let Some(token) = tokens.next() {
            if token == "--" {
                known.push(token.clone());
                known.extend(tokens.by_ref().cloned());
                break;
            }
            if !token.starts_with('-') || token.len() == 1 {
                known.push(token.clone());
                continue;
            }

            let declared = token
                .strip_prefix("--")
                .map(|long| long.split_once('=').map_or(long, |(name, _)| name))
                .and_then(|name| self.lookup(name));
            let Some(decl) = declared else {
                unknown.push(token.clone());
                continue;
            };

            known.push(token.clone());
            if decl.collects() {
                known.extend(tokens.by_ref().cloned());
                break;
            }
            if decl.takes_value()
                && !token.contains('=')
                && let Some(value) = tokens.next()
            {
                known.push(value.clone());
            }
        }
        (known, unknown)
    }

    fn command(&self) -> Command {
        let mut command = Command::new("coke")
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(
                Arg::new(TASKS_ID)
                    .action(ArgAction::Append)
                    .value_parser(clap::value_parser!(String)),
            );

        for (name, decl) in &self.decls {
            let arg = Arg::new(name.clone())
                .long(name.clone())
                .help(decl.description().to_string());
            let arg = match decl {
                FlagDecl::Switch { .. } => arg.action(ArgAction::SetTrue),
                FlagDecl::Value { default, .. } => {
                    let mut arg = arg
                        .action(ArgAction::Append)
                        .value_parser(clap::value_parser!(String))
                        .value_name(decl.value_name().unwrap_or_default().to_string());
                    arg = if decl.collects() {
                        arg.num_args(1..).allow_hyphen_values(true)
                    } else {
                        arg.num_args(1)
                    };
                    match default {
                        Some(default) => arg.default_value(default.clone()),
                        None => arg,
                    }
                }
            };
            command = command.arg(arg);
        }
        command
    }

    /// Aligned `--name PLACEHOLDER  description` lines.
    #[must_use]
    pub fn help_text(&self) -> String {
        let rows: Vec<(String, &str)> = self
            .decls
            .iter()
            .map(|(name, decl)| {
                let left = match decl.value_name() {
                    Some(placeholder) => format!("--{name} {placeholder}"),
                    None => format!("--{name}"),
                };
                (left, decl.description())
            })
            .collect();
        let width = rows.iter().map(|(left, _)| left.chars().count()).max().unwrap_or(0);

        rows.into_iter()
            .map(|(left, description)| {
                format!("  {left:<width$}  {description}").trim_end().to_string() + "\n"
            })
            .collect()
    }
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}
