//! Runtime configuration: environment-driven endpoints plus an optional JSON
//! file for the AI layer (`config/ai.json`). Everything has a usable default
//! so the binary boots with no configuration at all — the AI simply stays
//! disabled and the pipeline runs on its deterministic paths.

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

pub const DEFAULT_GDELT_BASE: &str = "https://api.gdeltproject.org/api/v2/geo/geo";
pub const DEFAULT_GEOCODE_BASE: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";
pub const DEFAULT_COINGECKO_BASE: &str = "https://api.coingecko.com/api/v3/simple/price";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub gdelt_base: String,
    pub geocode_base: String,
    pub coingecko_base: String,
    /// Article vault (PostgREST endpoint); absent means archiving is off.
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR),
            gdelt_base: env_or("GDELT_BASE_URL", DEFAULT_GDELT_BASE),
            geocode_base: env_or("GEOCODE_BASE_URL", DEFAULT_GEOCODE_BASE),
            coingecko_base: env_or("COINGECKO_BASE_URL", DEFAULT_COINGECKO_BASE),
            supabase_url: env::var("SUPABASE_URL").ok().filter(|s| !s.is_empty()),
            supabase_key: env::var("SUPABASE_KEY").ok().filter(|s| !s.is_empty()),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// AI layer config, loaded from `config/ai.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// Currently only "openrouter".
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Chat model id; `None` uses the crate default.
    #[serde(default)]
    pub model: Option<String>,
    /// "ENV" means: read from OPENROUTER_API_KEY.
    #[serde(default)]
    pub api_key: String,
}

fn default_provider() -> String {
    "openrouter".to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: None,
            api_key: String::new(),
        }
    }
}

impl AiConfig {
    /// Load from file; missing/invalid file yields the disabled default.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let mut cfg: AiConfig = fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        cfg.provider = cfg.provider.to_lowercase();
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = env::var("OPENROUTER_API_KEY").unwrap_or_default();
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ai_config_is_disabled() {
        let cfg = AiConfig::load_or_default("does/not/exist.json");
        assert!(!cfg.enabled);
        assert_eq!(cfg.provider, "openrouter");
    }
}
