pub mod chat;
pub mod insights;
pub mod search;
pub mod session;
pub mod status;
pub mod trend;

use crate::wellness::content::ContentItem;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn render_text(&self) -> String {
        let mut out = format!(
            "{}: {}\n",
            self.command,
            if self.ok { "ok" } else { "issues" }
        );
        for detail in &self.details {
            out.push_str(&format!("  {detail}\n"));
        }
        for issue in &self.issues {
            out.push_str(&format!("  issue: {issue}\n"));
        }
        out
    }
}

/// One display line per item. Placeholders are flagged with `!`.
pub fn item_line(item: &ContentItem) -> String {
    if item.is_error {
        return format!("! {}", item.title);
    }
    match item.link.as_deref() {
        Some(_) => format!("- {} <{}>", item.title, item.href()),
        None => format!("- {}", item.title),
    }
}
