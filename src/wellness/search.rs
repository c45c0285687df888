use crate::error::WellnessError;
use crate::wellness::config::{HttpConfig, SearchConfig};
use crate::wellness::content::{ContentItem, ContentSource, SourceOutcome, normalize_whitespace};
use crate::wellness::util::{error_chain_text, http_client, truncate_with_ellipsis};
use anyhow::{Context, Result};
use serde_json::Value;

const SOURCE: &str = "search";
const MAX_SNIPPET_CHARS: usize = 400;

pub trait SearchProvider {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>>;
}

/// DuckDuckGo Instant Answer API. No key required.
pub struct DuckDuckGoSearch {
    pub base_url: String,
    pub http: HttpConfig,
}

impl DuckDuckGoSearch {
    pub fn new(cfg: &SearchConfig, http: &HttpConfig) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            http: http.clone(),
        }
    }
}

fn push_topic_texts(topics: &[Value], out: &mut Vec<String>, max_results: usize) {
    for topic in topics {
        if out.len() >= max_results {
            return;
        }
        if let Some(text) = topic.get("Text").and_then(Value::as_str) {
            let text = normalize_whitespace(text);
            if !text.is_empty() {
                out.push(text);
            }
        } else if let Some(nested) = topic.get("Topics").and_then(Value::as_array) {
            push_topic_texts(nested, out, max_results);
        }
    }
}

/// Abstract first, then related topics (category groups are flattened).
pub fn extract_duckduckgo_snippets(json: &Value, max_results: usize) -> Vec<String> {
    let mut out = Vec::new();
    let abstract_text = json
        .get("AbstractText")
        .and_then(Value::as_str)
        .map(normalize_whitespace)
        .unwrap_or_default();
    if !abstract_text.is_empty() {
        let source = json
            .get("AbstractSource")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim();
        if source.is_empty() {
            out.push(abstract_text);
        } else {
            out.push(format!("{abstract_text} (source: {source})"));
        }
    }
    if let Some(topics) = json.get("RelatedTopics").and_then(Value::as_array) {
        push_topic_texts(topics, &mut out, max_results);
    }
    out.truncate(max_results);
    out
}

impl SearchProvider for DuckDuckGoSearch {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let client = http_client(&self.http)?;
        let url = format!("{}/", self.base_url.trim_end_matches('/'));
        let response = client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .context("search request failed")?;
        if !response.status().is_success() {
            anyhow::bail!("search call failed with status {}", response.status());
        }
        let json: Value = response.json().context("search response was not JSON")?;
        Ok(extract_duckduckgo_snippets(&json, max_results))
    }
}

pub struct SearchAdapter {
    provider: Box<dyn SearchProvider>,
    enabled: bool,
}

impl SearchAdapter {
    pub fn new(provider: Box<dyn SearchProvider>, enabled: bool) -> Self {
        Self { provider, enabled }
    }

    pub fn from_config(cfg: &SearchConfig, http: &HttpConfig) -> Self {
        Self::new(Box::new(DuckDuckGoSearch::new(cfg, http)), cfg.enabled)
    }
}

impl ContentSource for SearchAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn fetch(&self, query: &str, limit: usize) -> SourceOutcome {
        if !self.enabled {
            return SourceOutcome::degraded(
                SOURCE,
                WellnessError::provider(SOURCE, "web search disabled"),
                "Web search is disabled.",
                1,
            );
        }
        match self.provider.search(query, limit) {
            Ok(snippets) => {
                let items: Vec<ContentItem> = snippets
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .take(limit)
                    .map(|s| ContentItem::text(truncate_with_ellipsis(s, MAX_SNIPPET_CHARS)))
                    .collect();
                if items.is_empty() {
                    return SourceOutcome::degraded(
                        SOURCE,
                        WellnessError::provider(SOURCE, "empty result set"),
                        &format!("No search results found for: {}", query.trim()),
                        1,
                    );
                }
                SourceOutcome::Live(items)
            }
            Err(err) => {
                let message = error_chain_text(&err);
                SourceOutcome::degraded(
                    SOURCE,
                    WellnessError::provider(SOURCE, message.clone()),
                    &format!("Search unavailable: {message}"),
                    1,
                )
            }
        }
    }
}
