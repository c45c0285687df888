use crate::wellness::config::{MAX_NEWS_DISPLAY, NewsConfig, PapersConfig};
use crate::wellness::content::{ContentItem, ContentSource};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightsPayload {
    pub news: Vec<ContentItem>,
    pub papers: Vec<ContentItem>,
}

impl InsightsPayload {
    /// Names of the sources that returned placeholders instead of content.
    pub fn degraded_sources(&self) -> Vec<&'static str> {
        [("news", &self.news), ("papers", &self.papers)]
            .into_iter()
            .filter(|(_, items)| items.iter().any(|i| i.is_error))
            .map(|(name, _)| name)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct InsightQueries {
    pub news_query: String,
    pub news_limit: usize,
    pub news_display_limit: usize,
    pub papers_query: String,
    pub papers_limit: usize,
}

impl InsightQueries {
    pub fn from_config(news: &NewsConfig, papers: &PapersConfig) -> Self {
        Self {
            news_query: news.query.clone(),
            news_limit: news.limit,
            news_display_limit: news.display_limit,
            papers_query: papers.query.clone(),
            papers_limit: papers.max_results,
        }
    }
}

/// Calls each source on its own; one source degrading never touches the
/// other's items. News is cut to the display limit (never above
/// `MAX_NEWS_DISPLAY`), papers pass through.
pub fn gather(
    news: &dyn ContentSource,
    papers: &dyn ContentSource,
    queries: &InsightQueries,
) -> InsightsPayload {
    let mut news_items = news
        .fetch(&queries.news_query, queries.news_limit)
        .into_items();
    news_items.truncate(queries.news_display_limit.min(MAX_NEWS_DISPLAY));

    let paper_items = papers
        .fetch(&queries.papers_query, queries.papers_limit)
        .into_items();

    tracing::debug!(
        news = news_items.len(),
        papers = paper_items.len(),
        "gathered insights"
    );
    InsightsPayload {
        news: news_items,
        papers: paper_items,
    }
}

#[cfg(test)]
mod tests {
    use super::{InsightQueries, gather};
    use crate::error::WellnessError;
    use crate::wellness::config::{NewsConfig, PapersConfig};
    use crate::wellness::content::{ContentItem, ContentSource, SourceOutcome};

    struct Healthy(usize);

    impl ContentSource for Healthy {
        fn name(&self) -> &'static str {
            "healthy"
        }

        // Ignores `limit` to model a provider that over-delivers.
        fn fetch(&self, _query: &str, _limit: usize) -> SourceOutcome {
            SourceOutcome::Live(
                (0..self.0)
                    .map(|i| ContentItem::linked(format!("item {i}"), format!("https://x/{i}")))
                    .collect(),
            )
        }
    }

    struct Down;

    impl ContentSource for Down {
        fn name(&self) -> &'static str {
            "down"
        }

        fn fetch(&self, _query: &str, _limit: usize) -> SourceOutcome {
            SourceOutcome::degraded(
                "down",
                WellnessError::provider("down", "503"),
                "source unavailable",
                3,
            )
        }
    }

    fn queries() -> InsightQueries {
        InsightQueries::from_config(&NewsConfig::default(), &PapersConfig::default())
    }

    #[test]
    fn news_is_capped_at_three_even_when_provider_returns_more() {
        let payload = gather(&Healthy(10), &Healthy(2), &queries());
        assert_eq!(payload.news.len(), 3);
        assert_eq!(payload.papers.len(), 2);
        assert!(payload.degraded_sources().is_empty());
    }

    #[test]
    fn oversized_display_limit_still_shows_at_most_three_headlines() {
        let mut q = queries();
        q.news_display_limit = 10;
        let payload = gather(&Healthy(8), &Healthy(1), &q);
        assert_eq!(payload.news.len(), 3);
    }

    #[test]
    fn papers_pass_through_unchanged() {
        let payload = gather(&Healthy(1), &Healthy(4), &queries());
        assert_eq!(payload.papers.len(), 4);
        assert_eq!(payload.papers[3].title, "item 3");
    }

    #[test]
    fn failing_news_leaves_papers_intact() {
        let payload = gather(&Down, &Healthy(3), &queries());
        assert!(payload.news.iter().all(|i| i.is_error));
        assert!(payload.papers.iter().all(|i| !i.is_error));
        assert_eq!(payload.papers.len(), 3);
        assert_eq!(payload.degraded_sources(), vec!["news"]);
    }

    #[test]
    fn failing_papers_leave_news_intact() {
        let payload = gather(&Healthy(2), &Down, &queries());
        assert_eq!(payload.news.len(), 2);
        assert!(payload.news.iter().all(|i| !i.is_error));
        assert_eq!(payload.papers.len(), 3);
        assert!(payload.papers.iter().all(|i| i.is_error));
        assert_eq!(payload.degraded_sources(), vec!["papers"]);
    }
}
