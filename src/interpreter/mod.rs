//! Tree-walking evaluator for .co programs.
//!
//! Globals live for as long as the interpreter does, which is what lets a
//! REPL session build on earlier inputs.

mod value;

pub use value::Value;

use crate::ast::{Expression, Program, Statement};
use crate::error::{CocoError, Result};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Interpreter {
    globals: HashMap<String, Value>,
}

impl Interpreter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_global(&mut self, name: &str, value: Value) {
        self.globals.insert(name.to_string(), value);
    }

    #[must_use]
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Sorted names of every bound global.
    #[must_use]
    pub fn global_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.globals.keys().cloned().collect();
        names.sort();
        names
    }

    /// Execute a program, returning the value of its last statement.
    ///
    /// # Errors
    ///
    /// Returns `CocoError::Reference` when an unbound name is read.
    pub fn execute(&mut self, program: &Program) -> Result<Value> {
        let mut completion = Value::Undefined;
        for statement in &program.statements {
            match statement {
                Statement::Expression(expr) => completion = self.evaluate(expr)?,
                Statement::Return(expr) => return self.evaluate(expr),
            }
        }
        Ok(completion)
    }

    fn evaluate(&mut self, expr: &Expression) -> Result<Value> {
        Ok(match expr {
            Expression::Number { value } => Value::Number(*value),
            Expression::String { value } => Value::String(value.clone()),
            Expression::Boolean { value } => Value::Boolean(*value),
            Expression::Null => Value::Null,
            Expression::Void => Value::Undefined,
            Expression::Variable { name } => self
                .globals
                .get(name)
                .cloned()
                .ok_or_else(|| CocoError::Reference(name.clone()))?,
            Expression::Array { items } => Value::Array(
                items
                    .iter()
                    .map(|item| self.evaluate(item))
                    .collect::<Result<_>>()?,
            ),
            Expression::Object { properties } => {
                let mut props: Vec<(String, Value)> = Vec::with_capacity(properties.len());
                for property in properties {
                    let value = self.evaluate(&property.value)?;
                    match props.iter_mut().find(|(key, _)| *key == property.key) {
                        Some(slot) => slot.1 = value,
                        None => props.push((property.key.clone(), value)),
                    }
                }
                Value::Object(props)
            }
            Expression::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.globals.insert(name.clone(), value.clone());
                value
            }
            Expression::Unary { op, operand } => {
                let n = self.evaluate(operand)?.to_number();
                Value::Number(if op == "-" { -n } else { n })
            }
            Expression::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(op, &left, &right)
            }
        })
    }
}

fn binary(op: &str, left: &Value, right: &Value) -> Value {
    match op {
        "+" => left.add(right),
        "-" => Value::Number(left.to_number() - right.to_number()),
        "*" => Value::Number(left.to_number() * right.to_number()),
        "/" => Value::Number(left.to_number() / right.to_number()),
        "%" => Value::Number(left.to_number() % right.to_number()),
        "==" => Value::Boolean(left.strict_equals(right)),
        "!=" => Value::Boolean(!left.strict_equals(right)),
        _ => {
            let ordering = left.compare(right);
            Value::Boolean(match op {
                "<" => ordering == Some(Ordering::Less),
                ">" => ordering == Some(Ordering::Greater),
                "<=" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                ">=" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                _ => false,
            })
        }
    }
}
