use serde::Deserialize;
use std::env;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Runtime configuration for the extraction engine.
///
/// Immutable after construction; safe to share across concurrent extraction
/// calls.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Timeout for the single web fetch an extraction performs.
    pub http_timeout_secs: u64,
    /// User agent sent with web fetches. Defaults to a desktop browser UA;
    /// many sites refuse obvious bot agents.
    pub user_agent: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ExtractionConfig {
    pub fn from_env() -> Self {
        Self {
            http_timeout_secs: parse_env_or("CASTPREP_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: env::var("CASTPREP_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        }
    }
}
