use anyhow::Result;
use std::env;

use crate::commands::CommandReport;
use crate::wellness::config::{load_config, resolve_config_path};
use crate::wellness::news::NEWS_KEY_VAR;
use crate::wellness::responder::describe_remote_config;

include!(concat!(env!("OUT_DIR"), "/clarity_env_allowlist.rs"));

const CREDENTIAL_VARS: &[&str] = &[
    NEWS_KEY_VAR,
    "MISTRAL_API_KEY",
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "AI_API_KEY",
];

fn credential_present(var: &str) -> bool {
    env::var(var).is_ok_and(|v| !v.trim().is_empty())
}

/// Set variables that carry the app prefix but are not read anywhere.
fn unrecognized_env_vars(set: impl Iterator<Item = String>) -> Vec<String> {
    let mut unknown: Vec<String> = set
        .filter(|key| key.starts_with("CLARITY_"))
        .filter(|key| !GENERATED_CLARITY_ENV_ALLOWLIST.contains(&key.as_str()))
        .collect();
    unknown.sort();
    unknown
}

pub fn run() -> Result<CommandReport> {
    let mut report = CommandReport::new("status");
    report.detail(format!("build_uuid={}", env!("BUILD_UUID")));

    match resolve_config_path() {
        Some(path) => {
            report.detail(format!("config_path={}", path.display()));
            report.detail(format!("config_file_present={}", path.is_file()));
        }
        None => report.detail("config_path=unresolved (no home directory)"),
    }

    match load_config() {
        Ok(cfg) => {
            report.detail(format!("http.timeout_secs={}", cfg.http.timeout_secs));
            report.detail(format!("search.enabled={}", cfg.search.enabled));
            report.detail(format!("search.base_url={}", cfg.search.base_url));
            report.detail(format!("news.base_url={}", cfg.news.base_url));
            report.detail(format!("news.display_limit={}", cfg.news.display_limit));
            report.detail(format!("papers.base_url={}", cfg.papers.base_url));
            match describe_remote_config(&cfg.assistant) {
                Some((provider, model)) => {
                    report.detail(format!("assistant.provider={provider}"));
                    report.detail(format!("assistant.model={model}"));
                }
                None => report.detail("assistant.provider=unconfigured"),
            }
        }
        Err(err) => report.issue(format!("config invalid: {err:#}")),
    }

    for var in CREDENTIAL_VARS {
        report.detail(format!("credential.{var}={}", credential_present(var)));
    }

    let recognized: Vec<&str> = GENERATED_CLARITY_ENV_ALLOWLIST
        .iter()
        .copied()
        .filter(|key| env::var_os(key).is_some())
        .collect();
    report.detail(format!("env.recognized={}", recognized.join(",")));
    for key in unrecognized_env_vars(env::vars().map(|(k, _)| k)) {
        report.issue(format!("env.unrecognized={key}"));
    }

    Ok(report)
}
