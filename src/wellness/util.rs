use crate::wellness::config::HttpConfig;
use anyhow::Result;
use reqwest::blocking::Client;
use std::time::Duration;

/// Blocking client with the configured timeout. Every provider call goes
/// through one of these so a slow provider fails instead of stalling a turn.
pub fn http_client(http: &HttpConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(http.timeout_secs))
        .user_agent(http.user_agent.clone())
        .build()?)
}

/// Truncate `input` to at most `max_chars` Unicode characters, stripping
/// control characters and appending `…` when truncated.
pub fn truncate_with_ellipsis(input: &str, max_chars: usize) -> String {
    let clean: String = input.chars().filter(|c| !c.is_control()).collect();
    if clean.chars().count() > max_chars {
        let mut s: String = clean.chars().take(max_chars).collect();
        s.push('…');
        s
    } else {
        clean
    }
}

/// Flatten an error chain into one line for placeholder titles.
pub fn error_chain_text(err: &anyhow::Error) -> String {
    truncate_with_ellipsis(&format!("{err:#}"), 240)
}
