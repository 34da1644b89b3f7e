//! Configuration types for report generation runs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Findings document to read
    #[serde(default = "default_findings_path")]
    pub findings_path: PathBuf,
}

fn default_findings_path() -> PathBuf {
    PathBuf::from("data/sast.md")
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            findings_path: default_findings_path(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination for the rendered HTML report
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

fn default_report_path() -> PathBuf {
    PathBuf::from("ai-lamb-report.html")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
        }
    }
}

/// Completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// API key; `${VAR}` references are expanded from the environment
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override for OpenAI-compatible proxies and self-hosted gateways
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request timeout; an unresponsive service must not hang the run
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first attempt, for transient failures only
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> usize {
    1
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Complete report-run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl ReportConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from default locations with cascade:
    /// 1. ./ailamb.toml (local override)
    /// 2. ~/.ailamb/config.toml (global defaults)
    /// 3. Built-in defaults
    pub fn load_default() -> Self {
        if let Ok(config) = Self::from_file("ailamb.toml") {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let global_path = home.join(".ailamb").join("config.toml");
            if let Ok(config) = Self::from_file(&global_path) {
                return config;
            }
        }

        Self::default()
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".ailamb").join("config.toml"))
    }

    /// Expand environment variables in the API key field
    pub fn expand_env_vars(&mut self) {
        if let Some(ref key) = self.provider.api_key {
            if key.starts_with("${") && key.ends_with('}') {
                let var_name = &key[2..key.len() - 1];
                if let Ok(value) = std::env::var(var_name) {
                    self.provider.api_key = Some(value);
                }
            }
        }
    }

    /// Resolve the API key: explicit config value wins over the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.provider
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.input.findings_path, PathBuf::from("data/sast.md"));
        assert_eq!(
            config.output.report_path,
            PathBuf::from("ai-lamb-report.html")
        );
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.max_retries, 1);
        assert_eq!(config.provider.timeout_secs, 60);
    }

    #[test]
    fn test_parse_provider_only_config() {
        let toml = r#"
[provider]
model = "gpt-4o"
max_tokens = 2048
"#;
        let config = ReportConfig::parse(toml).unwrap();
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.provider.max_tokens, 2048);
        // Untouched sections keep their defaults.
        assert_eq!(config.input.findings_path, PathBuf::from("data/sast.md"));
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[input]
findings_path = "scans/latest.md"

[output]
report_path = "out/report.html"

[provider]
model = "gpt-4o"
api_key = "sk-test"
base_url = "http://localhost:4000/v1"
timeout_secs = 10
max_retries = 2
"#;
        let config = ReportConfig::parse(toml).unwrap();
        assert_eq!(config.input.findings_path, PathBuf::from("scans/latest.md"));
        assert_eq!(config.output.report_path, PathBuf::from("out/report.html"));
        assert_eq!(
            config.provider.base_url.as_deref(),
            Some("http://localhost:4000/v1")
        );
        assert_eq!(config.provider.timeout_secs, 10);
        assert_eq!(config.provider.max_retries, 2);
    }

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("AILAMB_TEST_KEY", "expanded_value");
        let toml = r#"
[provider]
api_key = "${AILAMB_TEST_KEY}"
"#;
        let mut config = ReportConfig::parse(toml).unwrap();
        config.expand_env_vars();
        assert_eq!(config.provider.api_key, Some("expanded_value".to_string()));
        std::env::remove_var("AILAMB_TEST_KEY");
    }

    #[test]
    fn test_explicit_key_beats_environment() {
        let toml = r#"
[provider]
api_key = "sk-explicit"
"#;
        let config = ReportConfig::parse(toml).unwrap();
        assert_eq!(config.resolve_api_key(), Some("sk-explicit".to_string()));
    }

    #[test]
    fn test_global_config_path() {
        let path = ReportConfig::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().ends_with(".ailamb/config.toml"));
    }
}
