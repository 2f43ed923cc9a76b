use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Application-level constants
pub const APP_NAME: &str = "MedGuard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_VISION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_EXTRACTION_MAX_TOKENS: u32 = 1000;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "medguard=debug,medguard_lib=debug,tower_http=info"
    } else {
        "medguard=info,medguard_lib=info"
    }
}

/// Get the application data directory.
/// ~/MedGuard/ on all platforms, falling back to the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the SQLite database.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("medguard.db")
}

/// Settings for the external vision extraction service.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Service credential. `None` puts uploads in demo mode.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_VISION_BASE_URL.to_string(),
            model: DEFAULT_VISION_MODEL.to_string(),
            timeout_secs: DEFAULT_EXTRACTION_TIMEOUT_SECS,
            max_tokens: DEFAULT_EXTRACTION_MAX_TOKENS,
        }
    }
}

/// Process configuration, built once at startup and handed to each component.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub extraction: ExtractionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ExtractionConfig::default();
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let extraction = ExtractionConfig {
            api_key: non_blank("OPENAI_API_KEY"),
            base_url: non_blank("MEDGUARD_VISION_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: non_blank("MEDGUARD_VISION_MODEL").unwrap_or(defaults.model),
            timeout_secs: positive_or(
                "MEDGUARD_EXTRACTION_TIMEOUT_SECS",
                non_blank("MEDGUARD_EXTRACTION_TIMEOUT_SECS"),
                defaults.timeout_secs,
            ),
            max_tokens: positive_or(
                "MEDGUARD_EXTRACTION_MAX_TOKENS",
                non_blank("MEDGUARD_EXTRACTION_MAX_TOKENS"),
                defaults.max_tokens,
            ),
        };

        Self {
            database_path: non_blank("MEDGUARD_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            bind_addr: parse_or(
                "MEDGUARD_BIND_ADDR",
                non_blank("MEDGUARD_BIND_ADDR"),
                SocketAddr::from(([127, 0, 0, 1], 8000)),
            ),
            extraction,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, "Ignoring unparseable setting, using default");
            default
        }),
    }
}

/// Like `parse_or`, but zero also falls back to the default.
fn positive_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Default + PartialEq + Copy,
{
    let value = parse_or(key, raw, default);
    if value == T::default() {
        tracing::warn!(key, "Ignoring zero setting, using default");
        return default;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("MedGuard"));
    }

    #[test]
    fn defaults_when_environment_empty() {
        let config = AppConfig::from_lookup(|_| None);
        assert!(config.extraction.api_key.is_none());
        assert_eq!(config.extraction.model, "gpt-4o-mini");
        assert_eq!(config.extraction.timeout_secs, 60);
        assert_eq!(config.extraction.max_tokens, 1000);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.database_path.ends_with("medguard.db"));
    }

    #[test]
    fn blank_api_key_counts_as_absent() {
        let config = AppConfig::from_lookup(lookup_from(&[("OPENAI_API_KEY", "   ")]));
        assert!(config.extraction.api_key.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("MEDGUARD_VISION_BASE_URL", "http://localhost:9999/v1/"),
            ("MEDGUARD_EXTRACTION_TIMEOUT_SECS", "15"),
            ("MEDGUARD_BIND_ADDR", "0.0.0.0:9000"),
            ("MEDGUARD_DATABASE_PATH", "/tmp/mg.db"),
        ]));
        assert_eq!(config.extraction.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.extraction.base_url, "http://localhost:9999/v1");
        assert_eq!(config.extraction.timeout_secs, 15);
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.database_path, PathBuf::from("/tmp/mg.db"));
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MEDGUARD_EXTRACTION_TIMEOUT_SECS", "soon"),
            ("MEDGUARD_BIND_ADDR", "not-an-address"),
        ]));
        assert_eq!(config.extraction.timeout_secs, DEFAULT_EXTRACTION_TIMEOUT_SECS);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn zero_timeout_and_token_budget_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MEDGUARD_EXTRACTION_TIMEOUT_SECS", "0"),
            ("MEDGUARD_EXTRACTION_MAX_TOKENS", "0"),
        ]));
        assert_eq!(config.extraction.timeout_secs, DEFAULT_EXTRACTION_TIMEOUT_SECS);
        assert_eq!(config.extraction.max_tokens, ExtractionConfig::default().max_tokens);
    }
}
