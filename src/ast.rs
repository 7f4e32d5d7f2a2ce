// Abstract Syntax Tree definitions

use serde::Serialize;
use std::fmt::{self, Write as FmtWrite};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Statement {
    Expression(Expression),
    Return(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    Number { value: f64 },
    String { value: String },
    Boolean { value: bool },
    Null,
    Void,
    Variable { name: String },
    Array { items: Vec<Expression> },
    Object { properties: Vec<Property> },
    Assign { name: String, value: Box<Expression> },
    Unary { op: String, operand: Box<Expression> },
    Binary {
        op: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub key: String,
    pub value: Expression,
}

impl Program {
    /// Turn the final expression statement into an explicit return of its value.
    pub fn make_return(&mut self) {
        if let Some(Statement::Expression(_)) = self.statements.last()
            && let Some(Statement::Expression(expr)) = self.statements.pop()
        {
            self.statements.push(Statement::Return(expr));
        }
    }

    /// Pretty JSON form used by `--ast --json`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Names assigned anywhere in the program, in first-assignment order.
    #[must_use]
    pub fn assigned_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for statement in &self.statements {
            let (Statement::Expression(expr) | Statement::Return(expr)) = statement;
            expr.collect_assigned(&mut names);
        }
        names
    }
}

impl Expression {
    fn collect_assigned(&self, names: &mut Vec<String>) {
        match self {
            Expression::Assign { name, value } => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
                value.collect_assigned(names);
            }
            Expression::Array { items } => {
                for item in items {
                    item.collect_assigned(names);
                }
            }
            Expression::Object { properties } => {
                for property in properties {
                    property.value.collect_assigned(names);
                }
            }
            Expression::Unary { operand, .. } => operand.collect_assigned(names),
            Expression::Binary { left, right, .. } => {
                left.collect_assigned(names);
                right.collect_assigned(names);
            }
            _ => {}
        }
    }
}

// Human-readable tree used by `--ast`.

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        writeln!(out, "Block")?;
        for statement in &self.statements {
            write_statement(&mut out, statement, 1)?;
        }
        f.write_str(&out)
    }
}

fn write_statement(out: &mut String, statement: &Statement, indent: usize) -> fmt::Result {
    match statement {
        Statement::Expression(expr) => write_expression(out, expr, indent),
        Statement::Return(expr) => {
            writeln!(out, "{}Return", "  ".repeat(indent))?;
            write_expression(out, expr, indent + 1)
        }
    }
}

fn write_expression(out: &mut String, expr: &Expression, indent: usize) -> fmt::Result {
    let prefix = "  ".repeat(indent);
    match expr {
        Expression::Number { value } => writeln!(out, "{prefix}Literal {}", format_number(*value)),
        Expression::String { value } => writeln!(out, "{prefix}Literal {value:?}"),
        Expression::Boolean { value } => writeln!(out, "{prefix}Literal {value}"),
        Expression::Null => writeln!(out, "{prefix}Literal null"),
        Expression::Void => writeln!(out, "{prefix}Literal void"),
        Expression::Variable { name } => writeln!(out, "{prefix}Var {name}"),
        Expression::Array { items } => {
            writeln!(out, "{prefix}Arr")?;
            for item in items {
                write_expression(out, item, indent + 1)?;
            }
            Ok(())
        }
        Expression::Object { properties } => {
            writeln!(out, "{prefix}Obj")?;
            for property in properties {
                writeln!(out, "{prefix}  Prop {}", property.key)?;
                write_expression(out, &property.value, indent + 2)?;
            }
            Ok(())
        }
        Expression::Assign { name, value } => {
            writeln!(out, "{prefix}Assign {name}")?;
            write_expression(out, value, indent + 1)
        }
        Expression::Unary { op, operand } => {
            writeln!(out, "{prefix}Unary {op}")?;
            write_expression(out, operand, indent + 1)
        }
        Expression::Binary { op, left, right } => {
            writeln!(out, "{prefix}Binary {op}")?;
            write_expression(out, left, indent + 1)?;
            write_expression(out, right, indent + 1)
        }
    }
}

/// Render a number the way the target language prints it.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        let whole = n as i64;
        whole.to_string()
    } else {
        n.to_string()
    }
}
