//! Server configuration

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::Path;
use vendorscope_store::FileStoreConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "vendorscope-server")]
#[command(about = "Vendor-usage evidence checks over public sources", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    /// Engine policy file (source pools, thresholds, boosts)
    #[arg(short, long)]
    pub policy: Option<String>,

    /// Vendor profile file (vendor name, products, rejection patterns)
    #[arg(long)]
    pub profile: Option<String>,

    /// Directory for the result cache and status files
    #[arg(long)]
    pub store_dir: Option<String>,

    /// Listen address
    #[arg(short = 'l', long, default_value = "0.0.0.0")]
    pub listen: String,

    /// Listen port
    #[arg(short = 'P', long, default_value = "8080")]
    pub port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

/// Environment variable holding the search provider key
pub const SEARCH_API_KEY_VAR: &str = "SERPER_API_KEY";

/// Environment variable holding the context verifier key; deep verification
/// is off without it
pub const VERIFIER_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Secrets from the environment. Never read from the config file or the
/// command line.
#[derive(Clone, Default)]
pub struct Credentials {
    pub search_api_key: Option<String>,
    pub verifier_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Credentials from a variable lookup, blank values treated as absent
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            search_api_key: non_blank(SEARCH_API_KEY_VAR),
            verifier_api_key: non_blank(VERIFIER_API_KEY_VAR),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("search_api_key", &self.search_api_key.as_ref().map(|_| "<set>"))
            .field("verifier_api_key", &self.verifier_api_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub verifier: VerifierConfig,

    #[serde(default)]
    pub store: FileStoreConfig,

    /// Engine policy file; built-in tables when absent
    #[serde(default)]
    pub policy_path: Option<String>,

    /// Vendor profile file; built-in profile when absent
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = if Path::new(&cli.config).exists() {
            let content = std::fs::read_to_string(&cli.config)?;
            Self::from_yaml(&content)?
        } else {
            Self::default()
        };

        if let Some(policy) = &cli.policy {
            config.policy_path = Some(policy.clone());
        }

        if let Some(profile) = &cli.profile {
            config.profile_path = Some(profile.clone());
        }

        if let Some(dir) = &cli.store_dir {
            config.store.dir = dir.into();
        }

        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Search provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_results_per_query")]
    pub results_per_query: u32,

    /// Country code sent as `gl`
    #[serde(default = "default_country")]
    pub country: String,

    /// Interface language sent as `hl`
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            results_per_query: default_results_per_query(),
            country: default_country(),
            language: default_language(),
            timeout_secs: default_search_timeout(),
        }
    }
}

/// Per-run limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Pause between successive queries
    #[serde(default = "default_query_delay")]
    pub query_delay_ms: u64,

    /// Wall-clock limit of a run; partial results are saved when hit
    #[serde(default = "default_run_timeout")]
    pub timeout_secs: u64,

    /// Deep-context fetches allowed per run
    #[serde(default = "default_max_url_fetches")]
    pub max_url_fetches: u32,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_hours: i64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            query_delay_ms: default_query_delay(),
            timeout_secs: default_run_timeout(),
            max_url_fetches: default_max_url_fetches(),
            cache_ttl_hours: default_cache_ttl(),
        }
    }
}

/// Page fetch settings for deep-context verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Body text kept per page, in characters
    #[serde(default = "default_page_text_limit")]
    pub max_text_chars: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_text_chars: default_page_text_limit(),
            user_agent: default_user_agent(),
        }
    }
}

/// OpenAI-compatible context verifier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Use the verifier when a key is present
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_verifier_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Page text sent to the model, in characters
    #[serde(default = "default_page_text_limit")]
    pub max_text_chars: usize,

    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_verifier_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_text_chars: default_page_text_limit(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://google.serper.dev".to_string()
}

fn default_results_per_query() -> u32 {
    10
}

fn default_country() -> String {
    "br".to_string()
}

fn default_language() -> String {
    "pt-br".to_string()
}

fn default_search_timeout() -> u64 {
    15
}

fn default_query_delay() -> u64 {
    300
}

fn default_run_timeout() -> u64 {
    140
}

fn default_max_url_fetches() -> u32 {
    80
}

fn default_cache_ttl() -> i64 {
    24
}

fn default_fetch_timeout() -> u64 {
    5
}

fn default_page_text_limit() -> usize {
    1000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_verifier_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.2
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["vendorscope-server"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = ServerConfig::from_yaml("{}").unwrap();
        assert_eq!(config.run.max_url_fetches, 80);
        assert_eq!(config.run.cache_ttl_hours, 24);
        assert_eq!(config.search.results_per_query, 10);
        assert_eq!(config.verifier.model, "gpt-4o-mini");
        assert!(config.verifier.enabled);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
run:
  query_delay_ms: 0
  timeout_secs: 30
search:
  country: pt
store:
  dir: /var/lib/vendorscope
"#;
        let config = ServerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.run.query_delay_ms, 0);
        assert_eq!(config.run.timeout_secs, 30);
        assert_eq!(config.run.max_url_fetches, 80);
        assert_eq!(config.search.country, "pt");
        assert_eq!(config.search.language, "pt-br");
        assert_eq!(config.store.dir, std::path::PathBuf::from("/var/lib/vendorscope"));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = cli(&[
            "--config",
            "/nonexistent/config.yaml",
            "--policy",
            "policy.yaml",
            "--store-dir",
            "/tmp/vs",
        ]);
        let config = ServerConfig::load(&cli).unwrap();
        assert_eq!(config.policy_path.as_deref(), Some("policy.yaml"));
        assert_eq!(config.store.dir, std::path::PathBuf::from("/tmp/vs"));
    }

    fn env(vars: &[(&str, &str)]) -> Credentials {
        let vars: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Credentials::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_blank_credentials_are_absent() {
        let creds = env(&[(SEARCH_API_KEY_VAR, "  ")]);
        assert!(creds.search_api_key.is_none());
        assert!(creds.verifier_api_key.is_none());
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let creds = env(&[(SEARCH_API_KEY_VAR, "s3cr3t-key"), (VERIFIER_API_KEY_VAR, "sk-1")]);
        assert_eq!(creds.search_api_key.as_deref(), Some("s3cr3t-key"));
        assert_eq!(creds.verifier_api_key.as_deref(), Some("sk-1"));
        assert!(!format!("{:?}", creds).contains("s3cr3t-key"));
    }

    #[test]
    fn test_api_keys_not_accepted_as_flags() {
        let argv = ["vendorscope-server", "--serper-api-key", "s3cr3t-key"];
        assert!(Cli::try_parse_from(argv).is_err());
        let argv = ["vendorscope-server", "--openai-api-key", "sk-1"];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
