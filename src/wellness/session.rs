use crate::error::WellnessError;
use crate::wellness::config::WellnessConfig;
use crate::wellness::content::ContentSource;
use crate::wellness::conversation::{ChatMessage, Conversation};
use crate::wellness::insights::{InsightQueries, InsightsPayload, gather};
use crate::wellness::mood::{MoodSample, MoodSeriesPoint, MoodStore, daily_series};
use crate::wellness::news::NewsAdapter;
use crate::wellness::papers::PapersAdapter;
use crate::wellness::responder::{Responder, responder_from_config};
use crate::wellness::search::SearchAdapter;
use chrono::{Local, NaiveDateTime};

/// Everything one user session owns. Nothing here is shared between
/// sessions and nothing outlives the process.
pub struct WellnessSession {
    moods: MoodStore,
    conversation: Conversation,
    search: Box<dyn ContentSource>,
    news: Box<dyn ContentSource>,
    papers: Box<dyn ContentSource>,
    responder: Box<dyn Responder>,
    queries: InsightQueries,
    search_limit: usize,
}

impl WellnessSession {
    pub fn new(
        search: Box<dyn ContentSource>,
        news: Box<dyn ContentSource>,
        papers: Box<dyn ContentSource>,
        responder: Box<dyn Responder>,
        queries: InsightQueries,
        search_limit: usize,
    ) -> Self {
        Self {
            moods: MoodStore::new(),
            conversation: Conversation::new(),
            search,
            news,
            papers,
            responder,
            queries,
            search_limit,
        }
    }

    pub fn from_config(cfg: &WellnessConfig) -> Self {
        Self::new(
            Box::new(SearchAdapter::from_config(&cfg.search, &cfg.http)),
            Box::new(NewsAdapter::from_env(&cfg.news, &cfg.http)),
            Box::new(PapersAdapter::from_config(&cfg.papers, &cfg.http)),
            responder_from_config(&cfg.assistant, &cfg.http),
            InsightQueries::from_config(&cfg.news, &cfg.papers),
            cfg.search.max_results,
        )
    }

    pub fn log_mood(&mut self, raw_mood: i64, notes: &str) -> Result<MoodSample, WellnessError> {
        self.log_mood_at(raw_mood, notes, Local::now().naive_local())
    }

    pub fn log_mood_at(
        &mut self,
        raw_mood: i64,
        notes: &str,
        timestamp: NaiveDateTime,
    ) -> Result<MoodSample, WellnessError> {
        let sample = MoodSample::new(raw_mood, notes.trim(), timestamp)?;
        let stored = self.moods.append(sample).clone();
        tracing::debug!(mood = stored.raw_mood.value(), entries = self.moods.len(), "mood logged");
        Ok(stored)
    }

    pub fn mood_trend(&self) -> Vec<MoodSeriesPoint> {
        daily_series(self.moods.all())
    }

    pub fn send_message(&mut self, text: &str) -> ChatMessage {
        self.conversation
            .send(text, self.search.as_ref(), self.search_limit, self.responder.as_ref())
            .clone()
    }

    pub fn insights(&self) -> InsightsPayload {
        gather(self.news.as_ref(), self.papers.as_ref(), &self.queries)
    }

    pub fn history(&self) -> &[ChatMessage] {
        self.conversation.history()
    }

    pub fn moods(&self) -> &[MoodSample] {
        self.moods.all()
    }

    pub fn responder_label(&self) -> &str {
        self.responder.label()
    }

    /// Drop moods and chat history; collaborators are kept.
    pub fn reset(&mut self) {
        self.moods.clear();
        self.conversation.clear();
        tracing::debug!("session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::WellnessSession;
    use crate::error::WellnessError;
    use crate::wellness::config::{NewsConfig, PapersConfig};
    use crate::wellness::content::{ContentItem, ContentSource, SourceOutcome};
    use crate::wellness::conversation::Sender;
    use crate::wellness::insights::InsightQueries;
    use crate::wellness::responder::{Responder, UnconfiguredResponder};
    use anyhow::Result;
    use chrono::NaiveDate;

    struct Titles(&'static str, usize);

    impl ContentSource for Titles {
        fn name(&self) -> &'static str {
            self.0
        }

        fn fetch(&self, _query: &str, _limit: usize) -> SourceOutcome {
            SourceOutcome::Live(
                (0..self.1)
                    .map(|i| ContentItem::text(format!("{} {i}", self.0)))
                    .collect(),
            )
        }
    }

    struct Calm;

    impl Responder for Calm {
        fn label(&self) -> &str {
            "calm"
        }

        fn respond(&self, _prompt: &str) -> Result<String> {
            Ok("You're doing well.".to_string())
        }
    }

    fn session(responder: Box<dyn Responder>) -> WellnessSession {
        WellnessSession::new(
            Box::new(Titles("search", 2)),
            Box::new(Titles("news", 6)),
            Box::new(Titles("paper", 3)),
            responder,
            InsightQueries::from_config(&NewsConfig::default(), &PapersConfig::default()),
            3,
        )
    }

    fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid test timestamp")
    }

    #[test]
    fn mood_trend_forward_fills_gap_days() {
        let mut s = session(Box::new(Calm));
        s.log_mood_at(8, "good sleep", at(1, 9)).expect("log");
        s.log_mood_at(4, "rough day", at(3, 9)).expect("log");
        let trend: Vec<f64> = s.mood_trend().iter().map(|p| p.mean_mood).collect();
        assert_eq!(trend, vec![8.0, 8.0, 4.0]);
    }

    #[test]
    fn out_of_range_mood_is_rejected_and_not_stored() {
        let mut s = session(Box::new(Calm));
        let err = s.log_mood_at(11, "", at(1, 9)).expect_err("must reject");
        assert!(matches!(err, WellnessError::Validation(_)));
        assert!(s.moods().is_empty());
    }

    #[test]
    fn send_message_appends_two_messages_per_turn() {
        let mut s = session(Box::new(UnconfiguredResponder));
        let reply = s.send_message("hi");
        assert_eq!(reply.sender, Sender::Assistant);
        assert!(reply.text.contains("MISTRAL_API_KEY"));
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn insights_cap_news_at_display_limit() {
        let s = session(Box::new(Calm));
        let payload = s.insights();
        assert_eq!(payload.news.len(), 3);
        assert_eq!(payload.papers.len(), 3);
    }

    #[test]
    fn reset_clears_moods_and_history() {
        let mut s = session(Box::new(Calm));
        s.log_mood_at(5, "", at(1, 9)).expect("log");
        s.send_message("hello");
        s.reset();
        assert!(s.moods().is_empty());
        assert!(s.history().is_empty());
        assert!(s.mood_trend().is_empty());
    }
}
