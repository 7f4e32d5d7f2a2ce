//! Tokenizer for .co sources.
//!
//! pest carves the raw text into tokens; a small rewriter then drops
//! comments and redundant newlines so the parser sees a clean stream.

use pest::Parser;
use pest::error::InputLocation;
use pest_derive::Parser;

use crate::engine::{LexOptions, Token};
use crate::error::{CocoError, Result};

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct TokenGrammar;

/// Literal keywords, also offered as REPL completions.
pub const LITERALS: &[&str] = &["true", "false", "null", "void"];

/// Split `input` into tokens.
///
/// With `options.raw` the stream is returned as lexed, comments included.
///
/// # Errors
///
/// Returns `CocoError::Syntax` for characters no token rule accepts.
pub fn tokenize(input: &str, options: &LexOptions) -> Result<Vec<Token>> {
    let pairs = TokenGrammar::parse(Rule::program, input).map_err(|err| lex_error(input, &err))?;

    let mut tokens = Vec::new();
    for pair in pairs.flatten() {
        let tag = match pair.as_rule() {
            Rule::comment => "COMMENT",
            Rule::newline => "NEWLINE",
            Rule::number => "NUMBER",
            Rule::string => "STRING",
            Rule::literal => "LITERAL",
            Rule::identifier => "ID",
            Rule::compare => "COMPARE",
            Rule::assign => "ASSIGN",
            Rule::additive => "+-",
            Rule::math => "MATH",
            Rule::punct => pair.as_str(),
            _ => continue,
        };
        let line = pair.as_span().start_pos().line_col().0 - 1;
        let value = if tag == "NEWLINE" { "\n" } else { pair.as_str() };
        tokens.push(Token::new(tag, value, line));
    }

    if options.raw {
        Ok(tokens)
    } else {
        Ok(rewrite(tokens))
    }
}

fn lex_error(input: &str, err: &pest::error::Error<Rule>) -> CocoError {
    let offset = match err.location {
        InputLocation::Pos(pos) | InputLocation::Span((pos, _)) => pos,
    };
    let line = match err.line_col {
        pest::error::LineColLocation::Pos((line, _))
        | pest::error::LineColLocation::Span((line, _), _) => line,
    };
    match input.get(offset..).and_then(|rest| rest.chars().next()) {
        Some(ch) if ch == '"' || ch == '\'' => CocoError::syntax(line, "unterminated string"),
        Some(ch) => CocoError::syntax(line, format!("unexpected {ch:?}")),
        None => CocoError::syntax(line, "unexpected end of input"),
    }
}

// Comments go, newlines collapse, and newlines inside brackets disappear so
// that array and object literals may span lines.
fn rewrite(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len() + 1);
    let mut depth = 0usize;

    for token in tokens {
        match token.tag.as_str() {
            "COMMENT" => continue,
            "NEWLINE" => {
                if depth > 0 || out.last().is_none_or(|last| last.tag == "NEWLINE") {
                    continue;
                }
            }
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            _ => {}
        }
        out.push(token);
    }

    if let Some(last) = out.last()
        && last.tag != "NEWLINE"
    {
        let line = last.line;
        out.push(Token::new("NEWLINE", "\n", line));
    }
    out
}
