use super::BuildSession;

const HEADER: &str = "Usage: coke [coke options] [task options] [tasks]";
const COKE_OPTIONS: &str = "  -f, --cokefile FILE  use FILE as the Cokefile";

/// Task list in registration order, task options if any were declared, then
/// the built-in options.
#[must_use]
pub fn render_usage(session: &BuildSession) -> String {
    let tasks = session.registry.tasks();
    let width = tasks.iter().map(|t| t.name.chars().count()).max().unwrap_or(0);

    let mut out = format!("{HEADER}\n\nTasks:\n");
    for task in tasks {
        let line = format!("  {:<width$}  {}", task.name, task.description);
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if !session.flags.is_empty() {
        out.push_str("\nTask options:\n");
        out.push_str(&session.flags.help_text());
    }

    out.push_str("\nCoke options:\n");
    out.push_str(COKE_OPTIONS);
    out.push('\n');
    out
}
