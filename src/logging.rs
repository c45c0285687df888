use tracing_subscriber::EnvFilter;

const LOG_FILTER_VAR: &str = "CLARITY_LOG";
const DEFAULT_FILTER: &str = "warn";

fn resolve_filter(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Events go to stderr so command output on
/// stdout stays machine-readable.
pub fn init() {
    let raw = std::env::var(LOG_FILTER_VAR).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(resolve_filter(raw.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
