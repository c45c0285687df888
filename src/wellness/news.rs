use crate::error::WellnessError;
use crate::wellness::config::{HttpConfig, NewsConfig};
use crate::wellness::content::{ContentItem, ContentSource, SourceOutcome, normalize_whitespace};
use crate::wellness::util::{error_chain_text, http_client};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

const SOURCE: &str = "news";
pub const NEWS_KEY_VAR: &str = "NEWSAPI_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub title: Option<String>,
}

pub trait NewsProvider {
    fn everything(&self, api_key: &str, query: &str, language: &str) -> Result<NewsResponse>;
}

pub struct NewsApiClient {
    pub base_url: String,
    pub http: HttpConfig,
}

impl NewsProvider for NewsApiClient {
    fn everything(&self, api_key: &str, query: &str, language: &str) -> Result<NewsResponse> {
        let client = http_client(&self.http)?;
        let url = format!("{}/v2/everything", self.base_url.trim_end_matches('/'));
        // NewsAPI reports errors as JSON bodies with `status: "error"`, so the
        // HTTP status is not checked here.
        let response = client
            .get(&url)
            .query(&[("q", query), ("language", language), ("apiKey", api_key)])
            .send()
            .context("news request failed")?;
        let parsed: NewsResponse = response
            .json()
            .context("news response was not valid JSON")?;
        Ok(parsed)
    }
}

pub struct NewsAdapter {
    provider: Box<dyn NewsProvider>,
    api_key: Option<String>,
    language: String,
}

impl NewsAdapter {
    pub fn new(provider: Box<dyn NewsProvider>, api_key: Option<String>, language: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            language: language.into(),
        }
    }

    pub fn from_env(cfg: &NewsConfig, http: &HttpConfig) -> Self {
        let provider = NewsApiClient {
            base_url: cfg.base_url.clone(),
            http: http.clone(),
        };
        Self::new(Box::new(provider), env::var(NEWS_KEY_VAR).ok(), cfg.language.clone())
    }
}

impl ContentSource for NewsAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn fetch(&self, query: &str, limit: usize) -> SourceOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            let error = WellnessError::CredentialMissing(NEWS_KEY_VAR.to_string());
            let title = format!("{error}.");
            return SourceOutcome::degraded(SOURCE, error, &title, 1);
        };

        let response = match self.provider.everything(api_key.trim(), query, &self.language) {
            Ok(response) => response,
            Err(err) => {
                let message = error_chain_text(&err);
                return SourceOutcome::degraded(
                    SOURCE,
                    WellnessError::provider(SOURCE, message.clone()),
                    &format!("Exception while fetching news: {message}"),
                    1,
                );
            }
        };

        if response.status.as_deref() != Some("ok") {
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Unknown error".to_string());
            return SourceOutcome::degraded(
                SOURCE,
                WellnessError::provider(SOURCE, message.clone()),
                &format!("Error from NewsAPI: {message}"),
                1,
            );
        }

        let items: Vec<ContentItem> = response
            .articles
            .iter()
            .filter_map(|a| a.title.as_deref())
            .map(normalize_whitespace)
            .filter(|t| !t.is_empty())
            .take(limit)
            .map(ContentItem::text)
            .collect();
        if items.is_empty() {
            return SourceOutcome::degraded(
                SOURCE,
                WellnessError::provider(SOURCE, "empty result set"),
                "No wellness news found right now.",
                1,
            );
        }
        SourceOutcome::Live(items)
    }
}

#[cfg(test)]
mod tests {
    use super::{NewsAdapter, NewsArticle, NewsProvider, NewsResponse};
    use crate::error::WellnessError;
    use crate::wellness::content::ContentSource;
    use anyhow::Result;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FixedNews {
        response: NewsResponse,
        calls: Rc<Cell<usize>>,
    }

    impl NewsProvider for FixedNews {
        fn everything(&self, _api_key: &str, _query: &str, _language: &str) -> Result<NewsResponse> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.response.clone())
        }
    }

    struct MalformedNews;

    impl NewsProvider for MalformedNews {
        fn everything(&self, _api_key: &str, _query: &str, _language: &str) -> Result<NewsResponse> {
            let parsed: NewsResponse = serde_json::from_str("<html>gateway timeout</html>")?;
            Ok(parsed)
        }
    }

    fn articles(n: usize) -> Vec<NewsArticle> {
        (0..n)
            .map(|i| NewsArticle {
                title: Some(format!("Headline {i}")),
            })
            .collect()
    }

    fn news_adapter(response: NewsResponse, key: Option<&str>) -> (NewsAdapter, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let provider = FixedNews {
            response,
            calls: Rc::clone(&calls),
        };
        (
            NewsAdapter::new(Box::new(provider), key.map(str::to_string), "en"),
            calls,
        )
    }

    fn ok_response(list: Vec<NewsArticle>) -> NewsResponse {
        NewsResponse {
            status: Some("ok".to_string()),
            message: None,
            articles: list,
        }
    }

    #[test]
    fn missing_credential_short_circuits_provider() {
        let (adapter, calls) = news_adapter(NewsResponse::default(), Some("   "));
        let outcome = adapter.fetch("wellness", 5);
        assert_eq!(
            outcome.error(),
            Some(&WellnessError::CredentialMissing("NEWSAPI_KEY".to_string()))
        );
        let items = outcome.into_items();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_error);
        assert!(items[0].title.contains("NEWSAPI_KEY"));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn non_ok_status_carries_provider_message() {
        let (adapter, calls) = news_adapter(
            NewsResponse {
                status: Some("error".to_string()),
                message: Some("Your API key is invalid.".to_string()),
                articles: Vec::new(),
            },
            Some("k"),
        );
        let items = adapter.fetch("wellness", 5).into_items();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_error);
        assert!(items[0].title.contains("Your API key is invalid."));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn missing_status_message_reads_unknown_error() {
        let (adapter, _) = news_adapter(NewsResponse::default(), Some("k"));
        let items = adapter.fetch("wellness", 5).into_items();
        assert_eq!(items[0].title, "Error from NewsAPI: Unknown error");
    }

    #[test]
    fn malformed_body_is_isolated() {
        let adapter = NewsAdapter::new(Box::new(MalformedNews), Some("k".to_string()), "en");
        let items = adapter.fetch("wellness", 5).into_items();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_error);
        assert!(items[0].title.starts_with("Exception while fetching news:"));
    }

    #[test]
    fn ok_response_is_title_only_and_limited() {
        let (adapter, _) = news_adapter(ok_response(articles(8)), Some("k"));
        let items = adapter.fetch("wellness", 5).into_items();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].title, "Headline 0");
        assert!(items.iter().all(|i| !i.is_error && i.link.is_none()));
    }

    #[test]
    fn untitled_articles_are_skipped() {
        let mut list = articles(2);
        list.insert(0, NewsArticle::default());
        let (adapter, _) = news_adapter(ok_response(list), Some("k"));
        let items = adapter.fetch("wellness", 5).into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Headline 0");
    }
}
