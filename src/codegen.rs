//! JavaScript emission.

use crate::ast::{Expression, Program, Statement, format_number};
use crate::engine::CompileOptions;

const INDENT: &str = "  ";

/// Emit JavaScript for `program`.
///
/// Unless `options.bare` is set the output is wrapped in a function called
/// with the top-level `this`, keeping assignments out of the global scope.
#[must_use]
pub fn generate(program: &Program, options: &CompileOptions) -> String {
    let mut lines = Vec::new();

    let names = program.assigned_names();
    if !names.is_empty() && !options.eval {
        lines.push(format!("var {};", names.join(", ")));
    }

    for statement in &program.statements {
        lines.push(match statement {
            Statement::Expression(expr) => format!("{};", statement_expression(expr)),
            Statement::Return(expr) => format!("return {};", expression(expr, 0)),
        });
    }

    if options.bare {
        if lines.is_empty() {
            String::new()
        } else {
            format!("{}\n", lines.join("\n"))
        }
    } else if lines.is_empty() {
        "(function(){\n\n}).call(this);\n".to_string()
    } else {
        let body: Vec<String> = lines.iter().map(|l| format!("{INDENT}{l}")).collect();
        format!("(function(){{\n{}\n}}).call(this);\n", body.join("\n"))
    }
}

// An object literal in statement position would read as a block.
fn statement_expression(expr: &Expression) -> String {
    let code = expression(expr, 0);
    if code.starts_with('{') {
        format!("({code})")
    } else {
        code
    }
}

fn precedence(expr: &Expression) -> u8 {
    match expr {
        Expression::Assign { .. } => 1,
        Expression::Binary { op, .. } => match op.as_str() {
            "*" | "/" | "%" => 4,
            "+" | "-" => 3,
            _ => 2,
        },
        Expression::Unary { .. } => 5,
        _ => 6,
    }
}

fn expression(expr: &Expression, min: u8) -> String {
    let own = precedence(expr);
    let code = match expr {
        Expression::Number { value } => format_number(*value),
        Expression::String { value } => quote(value),
        Expression::Boolean { value } => value.to_string(),
        Expression::Null => "null".to_string(),
        Expression::Void => "void 8".to_string(),
        Expression::Variable { name } => name.clone(),
        Expression::Array { items } => {
            let items: Vec<String> = items.iter().map(|i| expression(i, 1)).collect();
            format!("[{}]", items.join(", "))
        }
        Expression::Object { properties } => {
            let props: Vec<String> = properties
                .iter()
                .map(|p| format!("{}: {}", object_key(&p.key), expression(&p.value, 1)))
                .collect();
            format!("{{{}}}", props.join(", "))
        }
        Expression::Assign { name, value } => format!("{name} = {}", expression(value, 1)),
        Expression::Unary { op, operand } => {
            let inner = expression(operand, own);
            if inner.starts_with(['+', '-']) {
                format!("{op} {inner}")
            } else {
                format!("{op}{inner}")
            }
        }
        Expression::Binary { op, left, right } => {
            let op = match op.as_str() {
                "==" => "===",
                "!=" => "!==",
                other => other,
            };
            format!(
                "{} {op} {}",
                expression(left, own),
                expression(right, own + 1)
            )
        }
    };
    if own < min { format!("({code})") } else { code }
}

fn object_key(key: &str) -> String {
    let mut chars = key.chars();
    let simple = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    let numeric = !key.is_empty() && key.chars().all(|c| c.is_ascii_digit());
    if simple || numeric {
        key.to_string()
    } else {
        quote(key)
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if u32::from(c) < 0x20 => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
