//! Task body handling: dedent and split into steps.

/// One unit of work inside a task body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Lines run together by the task shell.
    Script(String),
    /// `invoke NAME`: run another task through the registry.
    Invoke(String),
}

/// Split a `{ ... }` block into steps.
pub(super) fn parse_steps(block: &str) -> Vec<Step> {
    let content = dedent(block);
    let mut steps = Vec::new();
    let mut script: Vec<&str> = Vec::new();

    for line in content.lines() {
        match invoke_target(line) {
            Some(target) => {
                flush(&mut script, &mut steps);
                steps.push(Step::Invoke(target));
            }
            None => script.push(line),
        }
    }
    flush(&mut script, &mut steps);
    steps
}

fn invoke_target(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix("invoke")?;
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let target = rest.trim();
    let target = target
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(target);
    (!target.is_empty()).then(|| target.to_string())
}

fn flush(script: &mut Vec<&str>, steps: &mut Vec<Step>) {
    if script.iter().any(|line| !line.trim().is_empty()) {
        let text = script.join("\n");
        steps.push(Step::Script(text.trim_matches('\n').to_string()));
    }
    script.clear();
}

/// Strip the braces, surrounding blank lines and common indentation.
fn dedent(block: &str) -> String {
    let content = block
        .strip_prefix('{')
        .and_then(|b| b.strip_suffix('}'))
        .unwrap_or(block);

    let all_lines: Vec<&str> = content.lines().collect();
    let start = all_lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(all_lines.len());
    let end = all_lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    let lines = &all_lines[start..end.max(start)];

    let min_indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                line.get(min_indent..).unwrap_or(line).trim_end()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
