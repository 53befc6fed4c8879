use crate::core::{DEFAULT_MAX_ATTEMPTS, parse_proxy_list};
use crate::error::{Error, Result};

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const API_BASE_VAR: &str = "GROQ_API_BASE";
pub const MODEL_VAR: &str = "GROQ_MODEL";
pub const MAX_ATTEMPTS_VAR: &str = "YT_MAX_ATTEMPTS";
/// Checked in order; the first non-empty one wins.
pub const PROXY_VARS: [&str; 2] = ["YT_PROXIES", "YT_PROXY"];

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub proxies: Vec<String>,
    pub max_attempts: usize,
}

impl Settings {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = non_empty(API_KEY_VAR).ok_or(Error::MissingApiKey {
            env_var: API_KEY_VAR,
        })?;

        let proxies = PROXY_VARS
            .iter()
            .find_map(|name| non_empty(name))
            .map(|raw| parse_proxy_list(&raw))
            .unwrap_or_default();

        let max_attempts = match non_empty(MAX_ATTEMPTS_VAR) {
            Some(raw) => parse_max_attempts(&raw)?,
            None => DEFAULT_MAX_ATTEMPTS,
        };

        Ok(Self {
            api_key,
            api_base: non_empty(API_BASE_VAR).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: non_empty(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            proxies,
            max_attempts,
        })
    }
}

fn parse_max_attempts(raw: &str) -> Result<usize> {
    raw.parse().map_err(|_| Error::InvalidSetting {
        name: MAX_ATTEMPTS_VAR,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let settings = settings(&[(API_KEY_VAR, "gsk_test")]).unwrap();
        assert_eq!(
            settings,
            Settings {
                api_key: "gsk_test".into(),
                api_base: DEFAULT_API_BASE.into(),
                model: DEFAULT_MODEL.into(),
                proxies: Vec::new(),
                max_attempts: DEFAULT_MAX_ATTEMPTS,
            }
        );
    }

    #[test]
    fn api_key_is_required() {
        assert!(matches!(
            settings(&[]),
            Err(Error::MissingApiKey { env_var: API_KEY_VAR })
        ));
        assert!(matches!(
            settings(&[(API_KEY_VAR, "   ")]),
            Err(Error::MissingApiKey { .. })
        ));
    }

    #[test]
    fn plural_proxy_variable_wins() {
        let settings = settings(&[
            (API_KEY_VAR, "k"),
            ("YT_PROXIES", "http://a:1, http://b:2"),
            ("YT_PROXY", "http://c:3"),
        ])
        .unwrap();
        assert_eq!(settings.proxies, vec!["http://a:1", "http://b:2"]);
    }

    #[test]
    fn empty_plural_falls_through_to_singular() {
        let settings = settings(&[
            (API_KEY_VAR, "k"),
            ("YT_PROXIES", " "),
            ("YT_PROXY", "http://c:3"),
        ])
        .unwrap();
        assert_eq!(settings.proxies, vec!["http://c:3"]);
    }

    #[test]
    fn overrides() {
        let settings = settings(&[
            (API_KEY_VAR, "k"),
            (API_BASE_VAR, "http://localhost:8080/v1"),
            (MODEL_VAR, "llama-3.3-70b-versatile"),
            (MAX_ATTEMPTS_VAR, "2"),
        ])
        .unwrap();
        assert_eq!(settings.api_base, "http://localhost:8080/v1");
        assert_eq!(settings.model, "llama-3.3-70b-versatile");
        assert_eq!(settings.max_attempts, 2);
    }

    #[test]
    fn bad_attempt_budget_is_rejected() {
        let err = settings(&[(API_KEY_VAR, "k"), (MAX_ATTEMPTS_VAR, "many")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for YT_MAX_ATTEMPTS: \"many\"");
    }
}
