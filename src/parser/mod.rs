//! Parser for .co token streams.
//!
//! A recursive descent over the tokens produced by [`lexer::tokenize`].
//! Precedence, loosest first: assignment (right associative), comparison,
//! additive, multiplicative, unary prefix, primary.

pub mod lexer;

use crate::ast::{Expression, Program, Property, Statement};
use crate::engine::Token;
use crate::error::{CocoError, Result};

/// Build a [`Program`] from a rewritten token stream.
///
/// # Errors
///
/// Returns `CocoError::Parse` naming the line of the first token that does
/// not fit the grammar.
pub fn parse_tokens(tokens: &[Token]) -> Result<Program> {
    TokenParser { tokens, pos: 0 }.program()
}

struct TokenParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_tag(&self) -> Option<&'a str> {
        self.peek().map(|t| t.tag.as_str())
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn accept(&mut self, tag: &str) -> Option<&'a Token> {
        if self.peek_tag() == Some(tag) {
            self.advance()
        } else {
            None
        }
    }

    fn expect(&mut self, tag: &str) -> Result<&'a Token> {
        match self.accept(tag) {
            Some(token) => Ok(token),
            None => Err(self.unexpected()),
        }
    }

    fn skip_newlines(&mut self) {
        while self.accept("NEWLINE").is_some() {}
    }

    fn unexpected(&self) -> CocoError {
        match self.peek() {
            Some(token) => {
                let what = if token.tag == "NEWLINE" {
                    "newline".to_string()
                } else {
                    format!("'{}'", token.value)
                };
                CocoError::parse(token.line + 1, format!("unexpected {what}"))
            }
            None => {
                let line = self.tokens.last().map_or(1, |t| t.line + 1);
                CocoError::parse(line, "unexpected end of input")
            }
        }
    }

    fn program(&mut self) -> Result<Program> {
        let mut statements = Vec::new();
        self.skip_newlines();
        while self.peek().is_some() {
            statements.push(Statement::Expression(self.expression()?));
            if self.peek().is_some() {
                self.expect("NEWLINE")?;
                self.skip_newlines();
            }
        }
        Ok(Program { statements })
    }

    fn expression(&mut self) -> Result<Expression> {
        let is_assignment = self.peek_tag() == Some("ID")
            && self.tokens.get(self.pos + 1).map(|t| t.tag.as_str()) == Some("ASSIGN");
        if !is_assignment {
            return self.comparison();
        }
        let name = self.expect("ID")?.value.clone();
        self.expect("ASSIGN")?;
        let value = self.expression()?;
        Ok(Expression::Assign {
            name,
            value: Box::new(value),
        })
    }

    fn binary_level(
        &mut self,
        tag: &str,
        operand: fn(&mut Self) -> Result<Expression>,
    ) -> Result<Expression> {
        let mut left = operand(self)?;
        while let Some(op) = self.accept(tag) {
            let right = operand(self)?;
            left = Expression::Binary {
                op: op.value.clone(),
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expression> {
        self.binary_level("COMPARE", Self::additive)
    }

    fn additive(&mut self) -> Result<Expression> {
        self.binary_level("+-", Self::term)
    }

    fn term(&mut self) -> Result<Expression> {
        self.binary_level("MATH", Self::unary)
    }

    fn unary(&mut self) -> Result<Expression> {
        match self.accept("+-") {
            Some(op) => Ok(Expression::Unary {
                op: op.value.clone(),
                operand: Box::new(self.unary()?),
            }),
            None => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expression> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected());
        };
        let expr = match token.tag.as_str() {
            "NUMBER" => {
                let value = token.value.parse::<f64>().map_err(|_| self.unexpected())?;
                Expression::Number { value }
            }
            "STRING" => Expression::String {
                value: unquote(&token.value),
            },
            "LITERAL" => match token.value.as_str() {
                "true" => Expression::Boolean { value: true },
                "false" => Expression::Boolean { value: false },
                "null" => Expression::Null,
                _ => Expression::Void,
            },
            "ID" => Expression::Variable {
                name: token.value.clone(),
            },
            "(" => {
                self.advance();
                let inner = self.expression()?;
                self.expect(")")?;
                return Ok(inner);
            }
            "[" => return self.array(),
            "{" => return self.object(),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(expr)
    }

    fn array(&mut self) -> Result<Expression> {
        self.expect("[")?;
        let mut items = Vec::new();
        while self.accept("]").is_none() {
            items.push(self.expression()?);
            if self.accept(",").is_none() {
                self.expect("]")?;
                break;
            }
        }
        Ok(Expression::Array { items })
    }

    fn object(&mut self) -> Result<Expression> {
        self.expect("{")?;
        let mut properties = Vec::new();
        while self.accept("}").is_none() {
            let key = match self.peek_tag() {
                Some("ID" | "NUMBER" | "LITERAL") => self.advance().map(|t| t.value.clone()),
                Some("STRING") => self.advance().map(|t| unquote(&t.value)),
                _ => None,
            }
            .ok_or_else(|| self.unexpected())?;
            self.expect(":")?;
            let value = self.expression()?;
            properties.push(Property { key, value });
            if self.accept(",").is_none() {
                self.expect("}")?;
                break;
            }
        }
        Ok(Expression::Object { properties })
    }
}

/// Strip the quotes from a STRING token and resolve its escapes.
fn unquote(raw: &str) -> String {
    let inner = raw
        .get(1..raw.len().saturating_sub(1))
        .unwrap_or_default();
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
