use anyhow::Result;

use crate::commands::CommandReport;
use crate::wellness::config::load_config;
use crate::wellness::session::WellnessSession;

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub message: String,
}

pub fn run(opts: &ChatOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("chat");
    let message = opts.message.trim();
    if message.is_empty() {
        report.issue("message is empty; pass --message <text>");
        return Ok(report);
    }

    let cfg = load_config()?;
    let mut session = WellnessSession::from_config(&cfg);
    report.detail(format!("responder={}", session.responder_label()));
    session.send_message(message);
    for msg in session.history() {
        report.detail(format!("[{}] {}: {}", msg.time, msg.sender.label(), msg.text));
    }
    Ok(report)
}
