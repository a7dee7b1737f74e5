use crate::domain::error::DomainError;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5001";
pub const DEFAULT_SESSION_DB: &str = "./tradejournal.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub session_db: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            session_db: DEFAULT_SESSION_DB.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, DomainError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or blank keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = get("TRADEJOURNAL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        url::Url::parse(&api_url)
            .map_err(|e| DomainError::InvalidInput(format!("TRADEJOURNAL_API_URL '{api_url}': {e}")))?;

        let timeout = match get("TRADEJOURNAL_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| DomainError::InvalidInput(format!("TRADEJOURNAL_TIMEOUT_SECS must be a positive integer, got '{raw}'")))?,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            session_db: get("TRADEJOURNAL_SESSION_DB").unwrap_or_else(|| DEFAULT_SESSION_DB.into()),
            timeout: Duration::from_secs(timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap(), Config::default());
    }

    #[test]
    fn overrides_and_trailing_slash() {
        let cfg = Config::from_lookup(lookup(&[
            ("TRADEJOURNAL_API_URL", "https://journal.example.com/"),
            ("TRADEJOURNAL_TIMEOUT_SECS", "5"),
            ("TRADEJOURNAL_SESSION_DB", ":memory:"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_url, "https://journal.example.com");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.session_db, ":memory:");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("TRADEJOURNAL_TIMEOUT_SECS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("TRADEJOURNAL_API_URL", "not a url")])).is_err());
    }
}
