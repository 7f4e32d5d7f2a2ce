//! Readable Cokefile parse diagnostics.
//!
//! Raw pest errors are turned into a message with the offending source line,
//! a caret under the failing column and, where one applies, a hint.

use std::fmt;

use super::Rule;

#[derive(Debug, Clone)]
pub struct ManifestError {
    pub message: String,
    /// 1-indexed.
    pub line: usize,
    /// 1-indexed.
    pub col: usize,
    /// End column for single-line spans, sizes the caret.
    pub col_end: Option<usize>,
    pub source_line: Option<String>,
    pub filename: Option<String>,
    pub hint: Option<String>,
}

impl ManifestError {
    pub fn from_pest(error: &pest::error::Error<Rule>, source: &str, filename: Option<&str>) -> Self {
        let (line, col, col_end) = match error.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c, None),
            pest::error::LineColLocation::Span((sl, sc), (el, ec)) => {
                (sl, sc, (sl == el).then_some(ec))
            }
        };

        let source_line = source
            .lines()
            .nth(line.saturating_sub(1))
            .map(str::to_string);

        let (message, hint) = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } => {
                (expected_message(positives), hint_for(positives))
            }
            pest::error::ErrorVariant::CustomError { message } => (message.clone(), None),
        };

        ManifestError {
            message,
            line,
            col,
            col_end,
            source_line,
            filename: filename.map(str::to_string),
            hint,
        }
    }
}

fn rule_label(rule: Rule) -> Option<&'static str> {
    match rule {
        Rule::task_kw => Some("`task`"),
        Rule::option_kw => Some("`option`"),
        Rule::name => Some("name"),
        Rule::description => Some("quoted description"),
        Rule::default_value => Some("quoted default value"),
        Rule::placeholder => Some("value placeholder (e.g. `DIR`)"),
        Rule::block => Some("task body (`{ ... }`)"),
        Rule::EOI => Some("end of file"),
        _ => None,
    }
}

fn expected_message(positives: &[Rule]) -> String {
    let named: Vec<&str> = positives.iter().copied().filter_map(rule_label).collect();
    match named.split_last() {
        None => "unexpected input".to_string(),
        Some((only, [])) => format!("expected {only}"),
        Some((last, rest)) => format!("expected {} or {last}", rest.join(", ")),
    }
}

fn hint_for(positives: &[Rule]) -> Option<String> {
    let has = |r: Rule| positives.contains(&r);

    if has(Rule::block) {
        return Some("Task bodies open with `{` on the declaration line: `task build { ... }`".to_string());
    }
    if has(Rule::description) {
        return Some("Options need a quoted description: `option release \"build in release mode\"`".to_string());
    }
    if has(Rule::task_kw) || has(Rule::option_kw) {
        return Some("Each declaration starts with `task` or `option` on a new line".to_string());
    }
    None
}

fn underline(col: usize, col_end: Option<usize>) -> String {
    let start = col.saturating_sub(1);
    let len = col_end.map_or(1, |end| end.saturating_sub(col).max(1));
    format!("{}{}", " ".repeat(start), "^".repeat(len))
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;
        match &self.filename {
            Some(name) => writeln!(f, "  --> {name}:{}:{}", self.line, self.col)?,
            None => writeln!(f, "  --> {}:{}", self.line, self.col)?,
        }

        if let Some(src) = &self.source_line {
            let num = self.line.to_string();
            let pad = " ".repeat(num.len());
            writeln!(f, "   {pad} |")?;
            writeln!(f, "   {num} | {src}")?;
            write!(f, "   {pad} | {}", underline(self.col, self.col_end))?;
        }

        if let Some(hint) = &self.hint {
            write!(f, "\n\n   = hint: {hint}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ManifestError {}
