use anyhow::Result;

use crate::commands::{CommandReport, item_line};
use crate::wellness::config::load_config;
use crate::wellness::insights::{InsightQueries, gather};
use crate::wellness::news::NewsAdapter;
use crate::wellness::papers::PapersAdapter;

pub fn run() -> Result<CommandReport> {
    let cfg = load_config()?;
    let mut report = CommandReport::new("insights");

    let news = NewsAdapter::from_env(&cfg.news, &cfg.http);
    let papers = PapersAdapter::from_config(&cfg.papers, &cfg.http);
    let payload = gather(&news, &papers, &InsightQueries::from_config(&cfg.news, &cfg.papers));

    report.detail("Wellness News");
    for item in &payload.news {
        report.detail(item_line(item));
    }
    report.detail("Latest Research");
    for item in &payload.papers {
        report.detail(item_line(item));
    }

    for source in payload.degraded_sources() {
        report.issue(format!("{source} source degraded"));
    }
    Ok(report)
}
