use crate::error::WellnessError;
use crate::wellness::config::{HttpConfig, PapersConfig};
use crate::wellness::content::{
    ContentItem, ContentSource, FALLBACK_HREF, SourceOutcome, normalize_whitespace,
};
use crate::wellness::util::{error_chain_text, http_client};
use anyhow::{Context, Result};
use serde::Deserialize;

const SOURCE: &str = "papers";
pub const PAPERS_PLACEHOLDER_COUNT: usize = 3;
pub const PAPERS_PLACEHOLDER_TITLE: &str = "Could not load some research papers.";
const UNTITLED: &str = "Untitled";

/// A provider record before normalization. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperRecord {
    pub title: Option<String>,
    pub entry_id: Option<String>,
}

impl PaperRecord {
    pub fn into_content_item(self) -> ContentItem {
        let title = self
            .title
            .as_deref()
            .map(normalize_whitespace)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());
        let link = self
            .entry_id
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(FALLBACK_HREF)
            .to_string();
        ContentItem::linked(title, link)
    }
}

pub trait PaperProvider {
    fn search_papers(&self, query: &str, max_results: usize) -> Result<Vec<PaperRecord>>;
}

#[derive(Debug, Default, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// Parse an arXiv Atom feed. arXiv reports query errors as a single entry
/// whose id points at `/api/errors`.
pub fn parse_arxiv_feed(xml: &str) -> Result<Vec<PaperRecord>> {
    let feed: AtomFeed = quick_xml::de::from_str(xml).context("arxiv feed was not valid Atom")?;
    if let Some(err) = feed
        .entries
        .iter()
        .find(|e| e.id.as_deref().is_some_and(|id| id.contains("/api/errors")))
    {
        anyhow::bail!(
            "arxiv rejected the query: {}",
            err.title.as_deref().map(normalize_whitespace).unwrap_or_default()
        );
    }
    Ok(feed
        .entries
        .into_iter()
        .map(|e| PaperRecord {
            title: e.title,
            entry_id: e.id,
        })
        .collect())
}

pub struct ArxivClient {
    pub base_url: String,
    pub http: HttpConfig,
}

impl PaperProvider for ArxivClient {
    fn search_papers(&self, query: &str, max_results: usize) -> Result<Vec<PaperRecord>> {
        let client = http_client(&self.http)?;
        let max_results = max_results.to_string();
        let response = client
            .get(&self.base_url)
            .query(&[
                ("search_query", query),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .context("arxiv request failed")?;
        if !response.status().is_success() {
            anyhow::bail!("arxiv call failed with status {}", response.status());
        }
        let body = response.text().context("arxiv response body unreadable")?;
        parse_arxiv_feed(&body)
    }
}

pub struct PapersAdapter {
    provider: Box<dyn PaperProvider>,
}

impl PapersAdapter {
    pub fn new(provider: Box<dyn PaperProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(cfg: &PapersConfig, http: &HttpConfig) -> Self {
        Self::new(Box::new(ArxivClient {
            base_url: cfg.base_url.clone(),
            http: http.clone(),
        }))
    }
}

impl ContentSource for PapersAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn fetch(&self, query: &str, limit: usize) -> SourceOutcome {
        let error = match self.provider.search_papers(query, limit) {
            Ok(records) if !records.is_empty() => {
                return SourceOutcome::Live(
                    records
                        .into_iter()
                        .take(limit)
                        .map(PaperRecord::into_content_item)
                        .collect(),
                );
            }
            Ok(_) => WellnessError::provider(SOURCE, "no papers returned"),
            Err(err) => WellnessError::provider(SOURCE, error_chain_text(&err)),
        };
        SourceOutcome::degraded(
            SOURCE,
            error,
            PAPERS_PLACEHOLDER_TITLE,
            PAPERS_PLACEHOLDER_COUNT,
        )
        .with_placeholder_link(FALLBACK_HREF)
    }
}
