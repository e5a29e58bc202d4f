//! Shared configuration used across all Scry crates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Global application configuration (CLI + core). Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Application identity shown in the CLI banner.
    pub app_name: String,
    /// Root directory of the knowledge base; `topics/`, `synthesis/`, and `index.md`
    /// live under it.
    pub research_root: String,
    /// Reasoner mode (e.g. "mock", "live").
    pub llm_mode: String,
    /// Cap on web search results, forwarded to the reasoner prompt.
    pub max_search_results: u32,
    /// Cap on sources fetched in full, forwarded to the reasoner prompt.
    pub max_sources_to_fetch: u32,
    /// Extra classification keywords per domain key ("tech", "policy",
    /// "thought-leadership", "general"). Merged on top of the built-ins, never
    /// replacing them.
    #[serde(default)]
    pub domain_keywords: HashMap<String, Vec<String>>,
}

impl ResearchConfig {
    /// Knowledge base root as a path.
    pub fn research_root_path(&self) -> PathBuf {
        PathBuf::from(&self.research_root)
    }

    /// Configured extra keywords for a domain key. Unknown keys yield nothing.
    pub fn extra_keywords(&self, key: &str) -> &[String] {
        self.domain_keywords
            .get(key)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Load config from file and environment. Precedence: env `SCRY_CONFIG` path > `config/researcher.toml` > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("SCRY_CONFIG").unwrap_or_else(|_| "config/researcher".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", "Scry Researcher")?
            .set_default("research_root", "./research")?
            .set_default("llm_mode", "mock")?
            .set_default("max_search_results", 10_i64)?
            .set_default("max_sources_to_fetch", 5_i64)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("SCRY").separator("__"))
            .build()?;

        built.try_deserialize()
    }
}
