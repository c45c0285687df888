use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("claritycare/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
    pub base_url: String,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.duckduckgo.com".to_string(),
            max_results: 3,
        }
    }
}

/// Upper bound on headlines shown at once, whatever the provider returns.
pub const MAX_NEWS_DISPLAY: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub base_url: String,
    pub query: String,
    pub language: String,
    pub limit: usize,
    pub display_limit: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org".to_string(),
            query: "mental health OR wellness".to_string(),
            language: "en".to_string(),
            limit: 5,
            display_limit: MAX_NEWS_DISPLAY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PapersConfig {
    pub base_url: String,
    pub query: String,
    pub max_results: usize,
}

impl Default for PapersConfig {
    fn default() -> Self {
        Self {
            base_url: "http://export.arxiv.org/api/query".to_string(),
            query: "mental health OR mindfulness".to_string(),
            max_results: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f64,
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            base_url: None,
            temperature: 0.7,
            system_prompt: "You are a compassionate AI therapist. Provide empathetic and helpful guidance."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WellnessConfig {
    pub http: HttpConfig,
    pub search: SearchConfig,
    pub news: NewsConfig,
    pub papers: PapersConfig,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialWellnessConfig {
    http: Option<HttpConfig>,
    search: Option<SearchConfig>,
    news: Option<NewsConfig>,
    papers: Option<PapersConfig>,
    assistant: Option<AssistantConfig>,
}

type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(var: &str) -> Option<String> {
    env::var(var).ok()
}

fn lookup_trimmed(get: EnvLookup<'_>, var: &str) -> Option<String> {
    get(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or_f64(get: EnvLookup<'_>, var: &str, fallback: f64) -> f64 {
    lookup_trimmed(get, var)
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(fallback)
}

fn env_or_u64(get: EnvLookup<'_>, var: &str, fallback: u64) -> u64 {
    lookup_trimmed(get, var)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(fallback)
}

fn env_or_usize(get: EnvLookup<'_>, var: &str, fallback: usize) -> usize {
    lookup_trimmed(get, var)
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(fallback)
}

fn env_or_bool(get: EnvLookup<'_>, var: &str, fallback: bool) -> bool {
    match lookup_trimmed(get, var).as_deref() {
        Some("1" | "true" | "TRUE" | "yes" | "on") => true,
        Some("0" | "false" | "FALSE" | "no" | "off") => false,
        _ => fallback,
    }
}

fn env_or_string(get: EnvLookup<'_>, var: &str, fallback: &str) -> String {
    lookup_trimmed(get, var).unwrap_or_else(|| fallback.to_string())
}

fn env_or_option(get: EnvLookup<'_>, var: &str, fallback: Option<String>) -> Option<String> {
    lookup_trimmed(get, var).or(fallback)
}

fn validate(cfg: &WellnessConfig) -> Result<()> {
    if cfg.http.timeout_secs == 0 {
        return Err(anyhow!("invalid http timeout: must be >= 1 second"));
    }
    if cfg.search.max_results == 0 {
        return Err(anyhow!("invalid search max results: must be >= 1"));
    }
    if cfg.news.limit == 0 || cfg.news.display_limit == 0 {
        return Err(anyhow!("invalid news limits: limit and display limit must be >= 1"));
    }
    if cfg.news.display_limit > MAX_NEWS_DISPLAY {
        return Err(anyhow!(
            "invalid news display limit: must be <= {MAX_NEWS_DISPLAY}"
        ));
    }
    if cfg.papers.max_results == 0 {
        return Err(anyhow!("invalid papers max results: must be >= 1"));
    }
    if cfg.news.query.trim().is_empty() || cfg.papers.query.trim().is_empty() {
        return Err(anyhow!("invalid insight queries: news and papers queries cannot be empty"));
    }
    let t = cfg.assistant.temperature;
    if !(0.0..=2.0).contains(&t) {
        return Err(anyhow!("invalid assistant temperature: require 0.0 <= temperature <= 2.0"));
    }
    Ok(())
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(custom) = lookup_trimmed(&process_env, "CLARITY_CONFIG_PATH") {
        return Some(PathBuf::from(custom));
    }

    let home = dirs::home_dir()?;
    Some(home.join(".claritycare").join("claritycare.toml"))
}

fn merge_toml(base: &mut WellnessConfig, raw: &str) -> Result<()> {
    let parsed: PartialWellnessConfig = toml::from_str(raw)?;
    if let Some(http) = parsed.http {
        base.http = http;
    }
    if let Some(search) = parsed.search {
        base.search = search;
    }
    if let Some(news) = parsed.news {
        base.news = news;
    }
    if let Some(papers) = parsed.papers {
        base.papers = papers;
    }
    if let Some(assistant) = parsed.assistant {
        base.assistant = assistant;
    }
    Ok(())
}

fn merge_file_config(base: &mut WellnessConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    merge_toml(base, &raw)
        .map_err(|err| anyhow!("failed to parse claritycare config {}: {err}", path.display()))
}

fn apply_env_overrides(cfg: &mut WellnessConfig, get: EnvLookup<'_>) {
    cfg.http.timeout_secs = env_or_u64(get, "CLARITY_HTTP_TIMEOUT_SECS", cfg.http.timeout_secs);
    cfg.http.user_agent = env_or_string(get, "CLARITY_USER_AGENT", &cfg.http.user_agent);

    cfg.search.enabled = env_or_bool(get, "CLARITY_SEARCH_ENABLED", cfg.search.enabled);
    cfg.search.base_url = env_or_string(get, "CLARITY_SEARCH_BASE_URL", &cfg.search.base_url);
    cfg.search.max_results =
        env_or_usize(get, "CLARITY_SEARCH_MAX_RESULTS", cfg.search.max_results);

    cfg.news.base_url = env_or_string(get, "CLARITY_NEWS_BASE_URL", &cfg.news.base_url);
    cfg.news.query = env_or_string(get, "CLARITY_NEWS_QUERY", &cfg.news.query);
    cfg.news.language = env_or_string(get, "CLARITY_NEWS_LANGUAGE", &cfg.news.language);
    cfg.news.limit = env_or_usize(get, "CLARITY_NEWS_LIMIT", cfg.news.limit);
    cfg.news.display_limit =
        env_or_usize(get, "CLARITY_NEWS_DISPLAY_LIMIT", cfg.news.display_limit);

    cfg.papers.base_url = env_or_string(get, "CLARITY_PAPERS_BASE_URL", &cfg.papers.base_url);
    cfg.papers.query = env_or_string(get, "CLARITY_PAPERS_QUERY", &cfg.papers.query);
    cfg.papers.max_results =
        env_or_usize(get, "CLARITY_PAPERS_MAX_RESULTS", cfg.papers.max_results);

    cfg.assistant.provider = env_or_option(
        get,
        "CLARITY_ASSISTANT_PROVIDER",
        cfg.assistant.provider.take(),
    );
    cfg.assistant.model = env_or_option(get, "CLARITY_ASSISTANT_MODEL", cfg.assistant.model.take());
    cfg.assistant.base_url = env_or_option(
        get,
        "CLARITY_ASSISTANT_BASE_URL",
        cfg.assistant.base_url.take(),
    );
    cfg.assistant.temperature = env_or_f64(
        get,
        "CLARITY_ASSISTANT_TEMPERATURE",
        cfg.assistant.temperature,
    );
    cfg.assistant.system_prompt = env_or_string(
        get,
        "CLARITY_SYSTEM_PROMPT",
        &cfg.assistant.system_prompt,
    );
}

pub fn load_config() -> Result<WellnessConfig> {
    let mut cfg = WellnessConfig::default();
    merge_file_config(&mut cfg)?;
    apply_env_overrides(&mut cfg, &process_env);
    validate(&cfg)?;
    Ok(cfg)
}
