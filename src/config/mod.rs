//! Configuration management
//!
//! This module handles loading and parsing configuration for the storefront edge.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! The deployment-facing variables keep their platform names (`STRAPI_URL`,
//! `STRAPI_TOKEN`, `REVALIDATE_SECRET`, `VERCEL_TOKEN`, `VERCEL_TEAM_ID`,
//! `VITE_STRAPI_URL`); everything else uses the `KICKOFF_` prefix.
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream CMS configuration
    #[serde(default)]
    pub cms: CmsConfig,
    /// Revalidation webhook configuration
    #[serde(default)]
    pub revalidate: RevalidateConfig,
    /// CDN purge API configuration
    #[serde(default)]
    pub cdn: CdnConfig,
    /// In-process response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Frontend data client configuration
    #[serde(default)]
    pub client: ClientConfig,
    /// Storefront presentation configuration
    #[serde(default)]
    pub site: SiteConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

/// Upstream CMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    /// Base URL of the CMS (without the `/api` suffix)
    #[serde(default = "default_cms_url")]
    pub url: String,
    /// Optional bearer token sent with every upstream request
    #[serde(default)]
    pub token: Option<String>,
    /// Upstream request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            url: default_cms_url(),
            token: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_cms_url() -> String {
    "http://localhost:1337".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Revalidation webhook configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevalidateConfig {
    /// Shared secret expected in the `x-webhook-secret` header.
    /// When unset, every webhook call is rejected.
    #[serde(default)]
    pub secret: Option<String>,
    /// Public host used to build purge URLs. Falls back to the request `Host` header.
    #[serde(default)]
    pub public_host: Option<String>,
}

/// CDN purge API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnConfig {
    /// API token for the purge endpoint
    #[serde(default)]
    pub token: Option<String>,
    /// Team the deployment belongs to
    #[serde(default)]
    pub team_id: Option<String>,
    /// Purge endpoint
    #[serde(default = "default_purge_endpoint")]
    pub purge_endpoint: String,
    /// Purge request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            token: None,
            team_id: None,
            purge_endpoint: default_purge_endpoint(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_purge_endpoint() -> String {
    "https://api.vercel.com/v1/purge".to_string()
}

impl CdnConfig {
    /// Purging is only attempted when both the token and the team id are set
    pub fn purge_enabled(&self) -> bool {
        matches!((&self.token, &self.team_id), (Some(t), Some(id)) if !t.is_empty() && !id.is_empty())
    }
}

/// In-process response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether upstream responses are cached in-process
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Cache TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Maximum number of cached upstream responses
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_seconds: default_ttl(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}

fn default_ttl() -> u64 {
    300
}

fn default_max_capacity() -> u64 {
    1_000
}

/// How the frontend data client reaches content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClientMode {
    /// Query the CMS directly with full populate directives (development)
    Direct,
    /// Go through the cached `/api` routes (production, default)
    #[default]
    Proxy,
}

impl ClientMode {
    /// Parse a mode name, accepting the environment aliases too
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "direct" | "development" | "dev" => Some(Self::Direct),
            "proxy" | "production" | "prod" => Some(Self::Proxy),
            _ => None,
        }
    }
}

/// Frontend data client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Environment switch
    #[serde(default)]
    pub mode: ClientMode,
    /// Base URL of the deployed site (proxy mode prefixes `/api`)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base URL for relative CMS media paths (`VITE_STRAPI_URL`)
    #[serde(default = "default_cms_url")]
    pub media_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: ClientMode::default(),
            api_base_url: default_api_base_url(),
            media_url: default_cms_url(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

/// Storefront presentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// External commerce customer login page
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// External commerce cart page
    #[serde(default = "default_cart_url")]
    pub cart_url: String,
    /// Optional directory with `.html` templates overriding the built-in ones
    #[serde(default)]
    pub templates_path: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            cart_url: default_cart_url(),
            templates_path: None,
        }
    }
}

fn default_login_url() -> String {
    "https://kick-off-couture-urq1r.myshopify.com/account/login".to_string()
}

fn default_cart_url() -> String {
    "https://kick-off-couture-urq1r.myshopify.com/cart".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Recognised variables:
    /// - STRAPI_URL, STRAPI_TOKEN
    /// - REVALIDATE_SECRET
    /// - VERCEL_TOKEN, VERCEL_TEAM_ID
    /// - VITE_STRAPI_URL
    /// - KICKOFF_SERVER_HOST, KICKOFF_SERVER_PORT, KICKOFF_SERVER_CORS_ORIGIN
    /// - KICKOFF_PUBLIC_HOST
    /// - KICKOFF_CACHE_ENABLED, KICKOFF_CACHE_TTL_SECONDS
    /// - KICKOFF_CLIENT_MODE, KICKOFF_CLIENT_API_BASE_URL
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        // Server configuration
        if let Some(host) = env_non_empty("KICKOFF_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_non_empty("KICKOFF_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Some(cors_origin) = env_non_empty("KICKOFF_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        // CMS
        if let Some(url) = env_non_empty("STRAPI_URL") {
            self.cms.url = url;
        }
        if let Some(token) = env_non_empty("STRAPI_TOKEN") {
            self.cms.token = Some(token);
        }

        // Webhook
        if let Some(secret) = env_non_empty("REVALIDATE_SECRET") {
            self.revalidate.secret = Some(secret);
        }
        if let Some(host) = env_non_empty("KICKOFF_PUBLIC_HOST") {
            self.revalidate.public_host = Some(host);
        }

        // CDN
        if let Some(token) = env_non_empty("VERCEL_TOKEN") {
            self.cdn.token = Some(token);
        }
        if let Some(team_id) = env_non_empty("VERCEL_TEAM_ID") {
            self.cdn.team_id = Some(team_id);
        }

        // Cache
        if let Some(enabled) = env_non_empty("KICKOFF_CACHE_ENABLED") {
            if let Ok(enabled) = enabled.parse::<bool>() {
                self.cache.enabled = enabled;
            }
        }
        if let Some(ttl) = env_non_empty("KICKOFF_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.cache.ttl_seconds = ttl;
            }
        }

        // Client
        if let Some(mode) = env_non_empty("KICKOFF_CLIENT_MODE") {
            if let Some(mode) = ClientMode::parse(&mode) {
                self.client.mode = mode;
            }
        }
        if let Some(base) = env_non_empty("KICKOFF_CLIENT_API_BASE_URL") {
            self.client.api_base_url = base;
        }
        if let Some(media) = env_non_empty("VITE_STRAPI_URL") {
            self.client.media_url = media;
        }
    }
}

/// Read an environment variable, treating an empty value as unset
fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
const ENV_KEYS: &[&str] = &[
    "KICKOFF_SERVER_HOST",
    "KICKOFF_SERVER_PORT",
    "KICKOFF_SERVER_CORS_ORIGIN",
    "STRAPI_URL",
    "STRAPI_TOKEN",
    "REVALIDATE_SECRET",
    "KICKOFF_PUBLIC_HOST",
    "VERCEL_TOKEN",
    "VERCEL_TEAM_ID",
    "KICKOFF_CACHE_ENABLED",
    "KICKOFF_CACHE_TTL_SECONDS",
    "KICKOFF_CLIENT_MODE",
    "KICKOFF_CLIENT_API_BASE_URL",
    "VITE_STRAPI_URL",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        let guard = super::CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        for key in super::ENV_KEYS {
            std::env::remove_var(key);
        }
        guard
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_config.yml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cms.url, "http://localhost:1337");
        assert_eq!(config.cms.token, None);
        assert_eq!(config.revalidate.secret, None);
        assert!(!config.cdn.purge_enabled());
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_seconds, 300);
        assert_eq!(config.client.mode, ClientMode::Proxy);
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cdn.purge_endpoint, "https://api.vercel.com/v1/purge");
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "cms:\n  url: \"https://cms.example.com\"\n").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.cms.url, "https://cms.example.com");
        assert_eq!(config.cms.timeout_seconds, 30);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"
server:
  host: "127.0.0.1"
  port: 9000
cms:
  url: "https://cms.example.com"
  token: "cms-token"
revalidate:
  secret: "hush"
  public_host: "www.example.com"
cdn:
  token: "cdn-token"
  team_id: "team_1"
cache:
  enabled: false
  ttl_seconds: 60
client:
  mode: direct
  media_url: "https://media.example.com"
site:
  templates_path: "templates"
"#).unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.cms.token.as_deref(), Some("cms-token"));
        assert_eq!(config.revalidate.secret.as_deref(), Some("hush"));
        assert_eq!(config.revalidate.public_host.as_deref(), Some("www.example.com"));
        assert!(config.cdn.purge_enabled());
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.client.mode, ClientMode::Direct);
        assert_eq!(config.client.media_url, "https://media.example.com");
        assert_eq!(config.site.templates_path, Some(PathBuf::from("templates")));
    }

    #[test]
    fn test_load_invalid_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: not_a_number\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_purge_requires_token_and_team() {
        let mut cdn = CdnConfig::default();
        assert!(!cdn.purge_enabled());
        cdn.token = Some("token".to_string());
        assert!(!cdn.purge_enabled());
        cdn.team_id = Some(String::new());
        assert!(!cdn.purge_enabled());
        cdn.team_id = Some("team".to_string());
        assert!(cdn.purge_enabled());
    }

    #[test]
    fn test_client_mode_parse_aliases() {
        assert_eq!(ClientMode::parse("development"), Some(ClientMode::Direct));
        assert_eq!(ClientMode::parse("DIRECT"), Some(ClientMode::Direct));
        assert_eq!(ClientMode::parse("production"), Some(ClientMode::Proxy));
        assert_eq!(ClientMode::parse("staging"), None);
    }

    #[test]
    fn test_env_override_platform_variables() {
        let _guard = lock_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "cms:\n  url: \"http://file-cms\"\n").unwrap();

        std::env::set_var("STRAPI_URL", "https://env-cms");
        std::env::set_var("STRAPI_TOKEN", "env-token");
        std::env::set_var("REVALIDATE_SECRET", "env-secret");
        std::env::set_var("VERCEL_TOKEN", "vercel");
        std::env::set_var("VERCEL_TEAM_ID", "team");
        std::env::set_var("VITE_STRAPI_URL", "https://media");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.cms.url, "https://env-cms");
        assert_eq!(config.cms.token.as_deref(), Some("env-token"));
        assert_eq!(config.revalidate.secret.as_deref(), Some("env-secret"));
        assert!(config.cdn.purge_enabled());
        assert_eq!(config.client.media_url, "https://media");

        for key in super::ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_override_empty_values_ignored() {
        let _guard = lock_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "cms:\n  token: \"file-token\"\n").unwrap();

        std::env::set_var("STRAPI_TOKEN", "");
        std::env::set_var("REVALIDATE_SECRET", "   ");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.cms.token.as_deref(), Some("file-token"));
        assert_eq!(config.revalidate.secret, None);

        for key in super::ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_override_invalid_values_ignored() {
        let _guard = lock_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: 8081\n").unwrap();

        std::env::set_var("KICKOFF_SERVER_PORT", "not_a_number");
        std::env::set_var("KICKOFF_CACHE_TTL_SECONDS", "-5");
        std::env::set_var("KICKOFF_CLIENT_MODE", "staging");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.cache.ttl_seconds, 300);
        assert_eq!(config.client.mode, ClientMode::Proxy);

        for key in super::ENV_KEYS {
            std::env::remove_var(key);
        }
    }
}
