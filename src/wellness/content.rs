use crate::error::WellnessError;
use serde::{Deserialize, Serialize};

pub const FALLBACK_HREF: &str = "#";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub title: String,
    pub link: Option<String>,
    pub is_error: bool,
}

impl ContentItem {
    pub fn text(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: None,
            is_error: false,
        }
    }

    pub fn linked(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: Some(link.into()),
            is_error: false,
        }
    }

    pub fn placeholder(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: None,
            is_error: true,
        }
    }

    pub fn href(&self) -> &str {
        self.link.as_deref().unwrap_or(FALLBACK_HREF)
    }
}

/// Result of one adapter call. Adapters never return `Err`: a failed
/// provider yields `Degraded` with renderable placeholder items.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Live(Vec<ContentItem>),
    Degraded {
        error: WellnessError,
        placeholders: Vec<ContentItem>,
    },
}

impl SourceOutcome {
    /// Degrade into `count` copies of a placeholder titled `title`.
    pub fn degraded(source: &str, error: WellnessError, title: &str, count: usize) -> Self {
        tracing::warn!(
            source,
            code = error.code(),
            error = %error,
            "content source degraded to placeholders"
        );
        Self::Degraded {
            error,
            placeholders: (0..count.max(1))
                .map(|_| ContentItem::placeholder(title))
                .collect(),
        }
    }

    /// Give every placeholder an explicit link. No-op on live outcomes.
    pub fn with_placeholder_link(mut self, link: &str) -> Self {
        if let Self::Degraded { placeholders, .. } = &mut self {
            for item in placeholders {
                item.link = Some(link.to_string());
            }
        }
        self
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn error(&self) -> Option<&WellnessError> {
        match self {
            Self::Live(_) => None,
            Self::Degraded { error, .. } => Some(error),
        }
    }

    pub fn items(&self) -> &[ContentItem] {
        match self {
            Self::Live(items) => items,
            Self::Degraded { placeholders, .. } => placeholders,
        }
    }

    pub fn into_items(self) -> Vec<ContentItem> {
        match self {
            Self::Live(items) => items,
            Self::Degraded { placeholders, .. } => placeholders,
        }
    }
}

/// One external provider behind a failure-isolating boundary.
pub trait ContentSource {
    fn name(&self) -> &'static str;
    fn fetch(&self, query: &str, limit: usize) -> SourceOutcome;
}

/// Collapse runs of whitespace (feeds wrap titles across lines).
pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
