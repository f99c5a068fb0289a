//! Configuration loading, validation, and management for FinAid.
//!
//! Loads configuration from `~/.finaid/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.finaid/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// Retrieval engine settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Context budget and prompt formatting
    #[serde(default)]
    pub context: ContextConfig,

    /// Synthetic data files
    #[serde(default)]
    pub data: DataConfig,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    7860
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// When false every request is allowed
    #[serde(default)]
    pub enabled: bool,

    /// Static bearer tokens accepted as-is
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,

    /// HS256 secret for JWT signature checks. Unset = claims-only validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,

    /// Maximum accepted age of a JWT's `iat` claim
    #[serde(default = "default_jwt_max_age")]
    pub jwt_max_age_secs: u64,

    /// JWT subjects allowed to call the API
    #[serde(default = "default_allowed_subjects")]
    pub allowed_subjects: Vec<String>,
}

fn default_jwt_max_age() -> u64 {
    3600
}
fn default_allowed_subjects() -> Vec<String> {
    vec!["TEST_SERVICE1".into(), "TEST_SERVICE_2".into()]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tokens: vec![],
            jwt_secret: None,
            jwt_max_age_secs: default_jwt_max_age(),
            allowed_subjects: default_allowed_subjects(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("tokens", &format!("[{} REDACTED]", self.tokens.len()))
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("jwt_max_age_secs", &self.jwt_max_age_secs)
            .field("allowed_subjects", &self.allowed_subjects)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// "sequential" or "parallel"
    #[serde(default = "default_retrieval_mode")]
    pub mode: String,

    /// Per-source timeout. Unset = sources may take as long as they need.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_timeout_ms: Option<u64>,

    /// Priority used when a request names no sources
    #[serde(default = "default_priority")]
    pub default_priority: Vec<String>,

    /// Student record REST endpoint. Unset = stub text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_record_api_url: Option<String>,

    /// Available-aid REST endpoint. Unset = stub text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_aid_api_url: Option<String>,

    /// Timeout of the REST client itself
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Whether the registrar-backed `student_record` source is registered
    #[serde(default = "default_true")]
    pub enable_registrar_source: bool,
}

fn default_retrieval_mode() -> String {
    "sequential".into()
}
fn default_priority() -> Vec<String> {
    vec![
        "student_record".into(),
        "available_aid_api".into(),
        "faiss".into(),
    ]
}
fn default_http_timeout() -> u64 {
    30
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            mode: default_retrieval_mode(),
            source_timeout_ms: None,
            default_priority: default_priority(),
            student_record_api_url: None,
            available_aid_api_url: None,
            http_timeout_secs: default_http_timeout(),
            enable_registrar_source: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Token budget for the assembled context
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,

    /// "default" or "phi-4"
    #[serde(default = "default_prompt_mode")]
    pub prompt_mode: String,

    /// "heuristic" (≈4 chars per token), "whitespace" or "bpe" (cl100k_base)
    #[serde(default = "default_tokenizer")]
    pub tokenizer: String,
}

fn default_max_tokens() -> i64 {
    2048
}
fn default_prompt_mode() -> String {
    "default".into()
}
fn default_tokenizer() -> String {
    "heuristic".into()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            prompt_mode: default_prompt_mode(),
            tokenizer: default_tokenizer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON array of student profiles
    #[serde(default = "default_students_path")]
    pub students_path: PathBuf,

    /// JSON array of prior aid determinations (optional file)
    #[serde(default = "default_determinations_path")]
    pub determinations_path: PathBuf,
}

fn default_students_path() -> PathBuf {
    AppConfig::data_dir().join("students.json")
}
fn default_determinations_path() -> PathBuf {
    AppConfig::data_dir().join("determinations.json")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            students_path: default_students_path(),
            determinations_path: default_determinations_path(),
        }
    }
}

const RETRIEVAL_MODES: &[&str] = &["sequential", "parallel"];
const PROMPT_MODES: &[&str] = &["default", "phi-4"];
const TOKENIZERS: &[&str] = &["heuristic", "whitespace", "bpe"];

impl AppConfig {
    /// Load configuration from the default path (~/.finaid/config.toml),
    /// then apply environment overrides:
    /// - `FINAID_HOST`, `FINAID_PORT`
    /// - `FINAID_AUTH_TOKEN` (adds a static token and enables auth)
    /// - `FINAID_JWT_SECRET` (sets the secret and enables auth)
    /// - `FINAID_DATA_DIR` (relocates both data files)
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (usually `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("FINAID_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("FINAID_PORT") {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("FINAID_PORT is not a valid port: {port}"))
            })?;
        }

        if let Some(token) = lookup("FINAID_AUTH_TOKEN").filter(|t| !t.is_empty()) {
            if !self.auth.tokens.contains(&token) {
                self.auth.tokens.push(token);
            }
            self.auth.enabled = true;
        }

        if let Some(secret) = lookup("FINAID_JWT_SECRET").filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = Some(secret);
            self.auth.enabled = true;
        }

        if let Some(dir) = lookup("FINAID_DATA_DIR") {
            let dir = PathBuf::from(dir);
            self.data.students_path = dir.join("students.json");
            self.data.determinations_path = dir.join("determinations.json");
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".finaid")
    }

    /// Get the default data directory path.
    pub fn data_dir() -> PathBuf {
        Self::config_dir().join("data")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError("server.port must be non-zero".into()));
        }

        if self.context.max_tokens <= 0 {
            return Err(ConfigError::ValidationError(
                "context.max_tokens must be greater than 0".into(),
            ));
        }

        if self.retrieval.source_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "retrieval.source_timeout_ms must be greater than 0 when set".into(),
            ));
        }

        check_one_of("retrieval.mode", &self.retrieval.mode, RETRIEVAL_MODES)?;
        check_one_of("context.prompt_mode", &self.context.prompt_mode, PROMPT_MODES)?;
        check_one_of("context.tokenizer", &self.context.tokenizer, TOKENIZERS)?;

        if self.auth.enabled && self.auth.tokens.is_empty() && self.auth.jwt_secret.is_none() {
            return Err(ConfigError::ValidationError(
                "auth.enabled requires at least one token or a jwt_secret".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `config` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn check_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{field} must be one of {allowed:?}, got \"{value}\""
        )))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            retrieval: RetrievalConfig::default(),
            context: ContextConfig::default(),
            data: DataConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 7860);
        assert_eq!(config.retrieval.mode, "sequential");
        assert!(config.retrieval.source_timeout_ms.is_none());
        assert!(!config.auth.enabled);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.retrieval.default_priority, config.retrieval.default_priority);
    }

    #[test]
    fn invalid_prompt_mode_rejected() {
        let mut config = AppConfig::default();
        config.context.prompt_mode = "llama".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("context.prompt_mode"));
    }

    #[test]
    fn tokenizer_choices() {
        let mut config = AppConfig::default();
        config.context.tokenizer = "bpe".into();
        assert!(config.validate().is_ok());

        config.context.tokenizer = "sentencepiece".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("context.tokenizer"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.source_timeout_ms = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn auth_without_credentials_rejected() {
        let mut config = AppConfig::default();
        config.auth.enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[retrieval]
mode = "parallel"
source_timeout_ms = 1500
default_priority = ["faiss", "s3"]

[context]
max_tokens = 512
prompt_mode = "phi-4"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.retrieval.mode, "parallel");
        assert_eq!(config.retrieval.source_timeout_ms, Some(1500));
        assert_eq!(config.retrieval.default_priority, vec!["faiss", "s3"]);
        assert_eq!(config.context.max_tokens, 512);
        assert_eq!(config.context.tokenizer, "heuristic");
        assert_eq!(config.server.port, 7860);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FINAID_PORT", "9000"),
            ("FINAID_AUTH_TOKEN", "secret-token"),
            ("FINAID_DATA_DIR", "/srv/finaid"),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(config.auth.enabled);
        assert_eq!(config.auth.tokens, vec!["secret-token"]);
        assert_eq!(config.data.students_path, PathBuf::from("/srv/finaid/students.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_port_env_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|key| (key == "FINAID_PORT").then(|| "not-a-port".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.auth.tokens = vec!["super-secret".into()];
        config.auth.jwt_secret = Some("jwt-secret".into());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("jwt-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
