use crate::wellness::config::{AssistantConfig, HttpConfig};
use crate::wellness::util::{http_client, truncate_with_ellipsis};
use anyhow::{Context, Result};
use serde_json::Value;
use std::env;

const MAX_ERROR_BODY_CHARS: usize = 300;
const ANTHROPIC_MAX_TOKENS: u64 = 1024;

/// The opaque AI capability: one prompt in, one reply out.
pub trait Responder {
    fn label(&self) -> &str;
    fn respond(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteProvider {
    Mistral,
    OpenAi,
    Anthropic,
    OpenAiCompatible,
}

impl RemoteProvider {
    pub fn label(self) -> &'static str {
        match self {
            RemoteProvider::Mistral => "mistral",
            RemoteProvider::OpenAi => "openai",
            RemoteProvider::Anthropic => "anthropic",
            RemoteProvider::OpenAiCompatible => "openai-compatible",
        }
    }

    fn default_base_url(self) -> Option<&'static str> {
        match self {
            RemoteProvider::Mistral => Some("https://api.mistral.ai"),
            RemoteProvider::OpenAi => Some("https://api.openai.com"),
            RemoteProvider::Anthropic => Some("https://api.anthropic.com"),
            RemoteProvider::OpenAiCompatible => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteModelConfig {
    pub provider: RemoteProvider,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
}

type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(var: &str) -> Option<String> {
    env::var(var).ok()
}

fn env_non_empty(get: EnvLookup<'_>, var: &str) -> Option<String> {
    get(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_provider_alias(raw: &str) -> Option<RemoteProvider> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mistral" => Some(RemoteProvider::Mistral),
        "openai" => Some(RemoteProvider::OpenAi),
        "anthropic" | "claude" => Some(RemoteProvider::Anthropic),
        "openai-compatible" | "compatible" | "deepseek" => Some(RemoteProvider::OpenAiCompatible),
        _ => None,
    }
}

fn parse_prefixed_model(raw: &str) -> (Option<RemoteProvider>, String) {
    let trimmed = raw.trim();
    if let Some((prefix, model)) = trimmed.split_once(':')
        && let Some(provider) = parse_provider_alias(prefix)
    {
        return (Some(provider), model.trim().to_string());
    }
    (None, trimmed.to_string())
}

fn infer_provider_from_model(model: &str) -> Option<RemoteProvider> {
    let lower = model.trim().to_ascii_lowercase();
    if lower.starts_with("mistral-")
        || lower.starts_with("open-mistral")
        || lower.starts_with("open-mixtral")
        || lower.starts_with("ministral-")
    {
        return Some(RemoteProvider::Mistral);
    }
    if lower.starts_with("deepseek-") {
        return Some(RemoteProvider::OpenAiCompatible);
    }
    if lower.starts_with("claude-") {
        return Some(RemoteProvider::Anthropic);
    }
    if lower.starts_with("gpt-")
        || lower.starts_with("o1")
        || lower.starts_with("o3")
        || lower.starts_with("o4")
    {
        return Some(RemoteProvider::OpenAi);
    }
    None
}

fn first_available_provider(get: EnvLookup<'_>) -> Option<RemoteProvider> {
    if env_non_empty(get, "MISTRAL_API_KEY").is_some() {
        return Some(RemoteProvider::Mistral);
    }
    if env_non_empty(get, "AI_API_KEY").is_some() {
        return Some(RemoteProvider::OpenAiCompatible);
    }
    if env_non_empty(get, "OPENAI_API_KEY").is_some() {
        return Some(RemoteProvider::OpenAi);
    }
    if env_non_empty(get, "ANTHROPIC_API_KEY").is_some() {
        return Some(RemoteProvider::Anthropic);
    }
    None
}

fn default_model_for_provider(provider: RemoteProvider) -> &'static str {
    match provider {
        RemoteProvider::Mistral => "mistral-large-latest",
        RemoteProvider::OpenAi => "gpt-4.1-mini",
        RemoteProvider::Anthropic => "claude-3-5-haiku-latest",
        RemoteProvider::OpenAiCompatible => "deepseek-chat",
    }
}

fn resolve_api_key(get: EnvLookup<'_>, provider: RemoteProvider) -> Option<String> {
    match provider {
        RemoteProvider::Mistral => {
            env_non_empty(get, "MISTRAL_API_KEY").or_else(|| env_non_empty(get, "AI_API_KEY"))
        }
        RemoteProvider::OpenAi => {
            env_non_empty(get, "OPENAI_API_KEY").or_else(|| env_non_empty(get, "AI_API_KEY"))
        }
        RemoteProvider::Anthropic => {
            env_non_empty(get, "ANTHROPIC_API_KEY").or_else(|| env_non_empty(get, "AI_API_KEY"))
        }
        RemoteProvider::OpenAiCompatible => env_non_empty(get, "AI_API_KEY")
            .or_else(|| env_non_empty(get, "DEEPSEEK_API_KEY"))
            .or_else(|| env_non_empty(get, "OPENAI_API_KEY")),
    }
}

fn resolve_base_url(
    get: EnvLookup<'_>,
    cfg: &AssistantConfig,
    provider: RemoteProvider,
    model: &str,
) -> Option<String> {
    if let Some(base) = cfg.base_url.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        return Some(base.to_string());
    }
    if provider == RemoteProvider::OpenAiCompatible {
        if let Some(base) = env_non_empty(get, "AI_BASE_URL") {
            return Some(base);
        }
        if model.trim().to_ascii_lowercase().starts_with("deepseek-") {
            return Some("https://api.deepseek.com".to_string());
        }
    }
    provider.default_base_url().map(str::to_string)
}

/// Pick provider, model, key and endpoint. Explicit provider wins, then a
/// `provider:model` prefix, then the model name, then whichever key is set.
pub fn resolve_remote_config(cfg: &AssistantConfig, get: EnvLookup<'_>) -> Option<RemoteModelConfig> {
    let configured_model = cfg
        .model
        .clone()
        .filter(|m| !m.trim().is_empty())
        .or_else(|| env_non_empty(get, "AI_MODEL"));

    let mut chosen_provider = cfg
        .provider
        .as_deref()
        .and_then(parse_provider_alias)
        .or_else(|| env_non_empty(get, "AI_PROVIDER").as_deref().and_then(parse_provider_alias));
    let (prefixed_provider, mut model) = configured_model
        .as_deref()
        .map(parse_prefixed_model)
        .unwrap_or((None, String::new()));
    if chosen_provider.is_none() {
        chosen_provider = prefixed_provider
            .or_else(|| infer_provider_from_model(&model))
            .or_else(|| first_available_provider(get));
    }

    let provider = chosen_provider?;
    if model.trim().is_empty() {
        model = default_model_for_provider(provider).to_string();
    }
    let api_key = resolve_api_key(get, provider)?;
    let base_url = resolve_base_url(get, cfg, provider, &model)?;
    Some(RemoteModelConfig {
        provider,
        model,
        api_key,
        base_url,
    })
}

pub fn extract_chat_completion_text(json: &Value) -> Option<String> {
    let choices = json.get("choices").and_then(Value::as_array)?;
    let first = choices.first()?;
    let content = first.get("message")?.get("content")?;
    match content {
        Value::String(s) => Some(s.to_string()),
        Value::Array(parts) => {
            let mut chunks = Vec::new();
            for part in parts {
                if let Some(text) = part.get("text").and_then(Value::as_str) {
                    chunks.push(text.to_string());
                }
            }
            if chunks.is_empty() {
                None
            } else {
                Some(chunks.join("\n"))
            }
        }
        _ => None,
    }
}

pub fn extract_anthropic_text(json: &Value) -> Option<String> {
    let mut chunks = Vec::new();
    let content = json.get("content").and_then(Value::as_array)?;
    for part in content {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            chunks.push(text.to_string());
        }
    }
    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n"))
    }
}

fn ensure_success(label: &str, response: reqwest::blocking::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        anyhow::bail!(
            "{label} call failed with status {status}: {}",
            truncate_with_ellipsis(body.trim(), MAX_ERROR_BODY_CHARS)
        );
    }
    response
        .json()
        .with_context(|| format!("{label} response was not JSON"))
}

/// Mistral, OpenAI and compatible endpoints share the chat-completions shape.
pub struct ChatCompletionsResponder {
    pub provider: RemoteProvider,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub system_prompt: String,
    pub http: HttpConfig,
}

impl Responder for ChatCompletionsResponder {
    fn label(&self) -> &str {
        self.provider.label()
    }

    fn respond(&self, prompt: &str) -> Result<String> {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/v1/chat/completions");
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": self.system_prompt},
                {"role": "user", "content": prompt}
            ],
            "temperature": self.temperature
        });

        let client = http_client(&self.http)?;
        let response = client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .with_context(|| format!("{} request failed", self.label()))?;
        let json = ensure_success(self.label(), response)?;
        extract_chat_completion_text(&json)
            .with_context(|| format!("{} response missing text content", self.label()))
    }
}

pub struct AnthropicResponder {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub system_prompt: String,
    pub http: HttpConfig,
}

impl Responder for AnthropicResponder {
    fn label(&self) -> &str {
        RemoteProvider::Anthropic.label()
    }

    fn respond(&self, prompt: &str) -> Result<String> {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/v1/messages");
        let payload = serde_json::json!({
            "model": self.model,
            "max_tokens": ANTHROPIC_MAX_TOKENS,
            // Anthropic caps temperature at 1.0.
            "temperature": self.temperature.min(1.0),
            "system": self.system_prompt,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let client = http_client(&self.http)?;
        let response = client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()
            .context("anthropic request failed")?;
        let json = ensure_success(self.label(), response)?;
        extract_anthropic_text(&json).context("anthropic response missing text content")
    }
}

/// Stand-in when no credential is configured; every turn gets a diagnostic.
pub struct UnconfiguredResponder;

impl Responder for UnconfiguredResponder {
    fn label(&self) -> &str {
        "unconfigured"
    }

    fn respond(&self, _prompt: &str) -> Result<String> {
        anyhow::bail!(
            "no AI provider configured; set MISTRAL_API_KEY (or OPENAI_API_KEY, ANTHROPIC_API_KEY, AI_API_KEY with AI_BASE_URL)"
        )
    }
}

fn build_responder(remote: RemoteModelConfig, cfg: &AssistantConfig, http: &HttpConfig) -> Box<dyn Responder> {
    match remote.provider {
        RemoteProvider::Anthropic => Box::new(AnthropicResponder {
            base_url: remote.base_url,
            api_key: remote.api_key,
            model: remote.model,
            temperature: cfg.temperature,
            system_prompt: cfg.system_prompt.clone(),
            http: http.clone(),
        }),
        provider => Box::new(ChatCompletionsResponder {
            provider,
            base_url: remote.base_url,
            api_key: remote.api_key,
            model: remote.model,
            temperature: cfg.temperature,
            system_prompt: cfg.system_prompt.clone(),
            http: http.clone(),
        }),
    }
}

pub fn responder_from_config(cfg: &AssistantConfig, http: &HttpConfig) -> Box<dyn Responder> {
    match resolve_remote_config(cfg, &process_env) {
        Some(remote) => {
            tracing::debug!(
                provider = remote.provider.label(),
                model = %remote.model,
                "assistant provider resolved"
            );
            build_responder(remote, cfg, http)
        }
        None => Box::new(UnconfiguredResponder),
    }
}

pub fn describe_remote_config(cfg: &AssistantConfig) -> Option<(String, String)> {
    resolve_remote_config(cfg, &process_env)
        .map(|remote| (remote.provider.label().to_string(), remote.model))
}
