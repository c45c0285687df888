use crate::error::WellnessError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_MOOD: u8 = 1;
pub const MAX_MOOD: u8 = 10;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A mood rating already checked against `MIN_MOOD..=MAX_MOOD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct MoodRating(u8);

impl MoodRating {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for MoodRating {
    type Error = WellnessError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if raw < i64::from(MIN_MOOD) || raw > i64::from(MAX_MOOD) {
            return Err(WellnessError::Validation(format!(
                "mood must be between {MIN_MOOD} and {MAX_MOOD}, got {raw}"
            )));
        }
        Ok(Self(raw as u8))
    }
}

impl From<MoodRating> for u8 {
    fn from(rating: MoodRating) -> Self {
        rating.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSample {
    pub timestamp: NaiveDateTime,
    pub raw_mood: MoodRating,
    pub score: f64,
    pub notes: String,
}

impl MoodSample {
    pub fn new(raw_mood: i64, notes: impl Into<String>, timestamp: NaiveDateTime) -> Result<Self, WellnessError> {
        let raw_mood = MoodRating::try_from(raw_mood)?;
        Ok(Self {
            timestamp,
            raw_mood,
            score: score(&[f64::from(raw_mood.value())]),
            notes: notes.into(),
        })
    }

    pub fn day(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSeriesPoint {
    pub day: NaiveDate,
    pub mean_mood: f64,
}

/// Append-only mood log for one session.
#[derive(Debug, Clone, Default)]
pub struct MoodStore {
    samples: Vec<MoodSample>,
}

impl MoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamps stay non-decreasing: a sample older than the newest entry
    /// is recorded at the newest entry's timestamp.
    pub fn append(&mut self, mut sample: MoodSample) -> &MoodSample {
        if let Some(last) = self.samples.last()
            && sample.timestamp < last.timestamp
        {
            sample.timestamp = last.timestamp;
        }
        self.samples.push(sample);
        &self.samples[self.samples.len() - 1]
    }

    pub fn all(&self) -> &[MoodSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Arithmetic mean of `moods`; `0.0` when there is nothing to average.
pub fn score(moods: &[f64]) -> f64 {
    if moods.is_empty() {
        return 0.0;
    }
    moods.iter().sum::<f64>() / moods.len() as f64
}

/// Per-day mean mood over `[first day, last day]`, forward-filling days
/// without samples from the previous day. Nothing is produced before the
/// first sample or after the last.
pub fn daily_series(samples: &[MoodSample]) -> Vec<MoodSeriesPoint> {
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        by_day
            .entry(sample.day())
            .or_default()
            .push(f64::from(sample.raw_mood.value()));
    }

    let (Some(first), Some(last)) = (
        by_day.keys().next().copied(),
        by_day.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut carried = 0.0;
    for day in first.iter_days().take_while(|day| *day <= last) {
        if let Some(moods) = by_day.get(&day) {
            carried = score(moods);
        }
        out.push(MoodSeriesPoint {
            day,
            mean_mood: carried,
        });
    }
    out
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, WellnessError> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(|err| {
        WellnessError::Validation(format!(
            "timestamp `{}` must look like 2024-05-01 09:30: {err}",
            raw.trim()
        ))
    })
}
