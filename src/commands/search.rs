use anyhow::Result;

use crate::commands::{CommandReport, item_line};
use crate::wellness::config::load_config;
use crate::wellness::content::ContentSource;
use crate::wellness::search::SearchAdapter;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub query: String,
    pub limit: Option<usize>,
}

pub fn run(opts: &SearchOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("search");
    let query = opts.query.trim();
    if query.is_empty() {
        report.issue("query is empty; pass --query <text>");
        return Ok(report);
    }

    let cfg = load_config()?;
    let limit = opts.limit.unwrap_or(cfg.search.max_results).max(1);
    let adapter = SearchAdapter::from_config(&cfg.search, &cfg.http);
    let outcome = adapter.fetch(query, limit);

    report.detail(format!("search.query={query}"));
    for item in outcome.items() {
        report.detail(item_line(item));
    }
    if outcome.is_degraded() {
        let reason = outcome.error().map(ToString::to_string).unwrap_or_default();
        report.issue(format!("{} degraded: {reason}", adapter.name()));
    }
    Ok(report)
}
