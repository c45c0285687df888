use anyhow::Result;

use crate::commands::CommandReport;
use crate::error::WellnessError;
use crate::wellness::mood::{MoodSample, MoodStore, daily_series, parse_timestamp};

#[derive(Debug, Clone)]
pub struct TrendOptions {
    pub samples: Vec<String>,
}

/// `YYYY-MM-DD HH:MM=<mood>`, optionally followed by `:<notes>`.
pub fn parse_sample_arg(raw: &str) -> Result<MoodSample, WellnessError> {
    let Some((stamp, rest)) = raw.split_once('=') else {
        return Err(WellnessError::Validation(format!(
            "sample `{raw}` must look like `2024-05-01 09:30=7`"
        )));
    };
    let (mood, notes) = rest.split_once(':').unwrap_or((rest, ""));
    let mood: i64 = mood.trim().parse().map_err(|_| {
        WellnessError::Validation(format!("mood `{}` is not a whole number", mood.trim()))
    })?;
    MoodSample::new(mood, notes.trim(), parse_timestamp(stamp)?)
}

pub fn run(opts: &TrendOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("trend");
    let mut samples = Vec::new();
    for raw in &opts.samples {
        match parse_sample_arg(raw) {
            Ok(sample) => samples.push(sample),
            Err(err) => report.issue(err.to_string()),
        }
    }

    // The store clamps older timestamps up, so samples given out of order
    // must be sorted first. The sort is stable for equal timestamps.
    samples.sort_by_key(|s| s.timestamp);
    let mut store = MoodStore::new();
    for sample in samples {
        store.append(sample);
    }

    report.detail(format!("mood.samples={}", store.len()));
    if store.is_empty() {
        report.detail("mood.trend=empty (log a mood to see the trend)");
    }
    for point in daily_series(store.all()) {
        report.detail(format!("{} mean_mood={:.2}", point.day, point.mean_mood));
    }
    Ok(report)
}
