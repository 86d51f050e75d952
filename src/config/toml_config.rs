use crate::adapters::gemini::{DEFAULT_API_ENDPOINT, DEFAULT_MODEL};
use crate::adapters::image::DEFAULT_MAX_IMAGE_EDGE;
use crate::config::{validate_provider, OutputFormat};
use crate::core::analyzer::DEFAULT_TIMEOUT_SECONDS;
use crate::core::retry::{DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS};
use crate::core::ConfigProvider;
use crate::utils::error::{BioGuardError, Result};
use crate::utils::validation::Validate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// 命令列 `--api-key`/`GEMINI_API_KEY`，不從檔案讀取
    #[serde(skip)]
    cli_api_key: Option<String>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub timeout_seconds: Option<u64>,
    pub max_attempts: Option<u32>,
    pub backoff_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageConfig {
    pub max_long_edge: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    pub verbose: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BioGuardError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| BioGuardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn with_cli_api_key(mut self, api_key: Option<String>) -> Self {
        self.cli_api_key = api_key;
        self
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output.format.unwrap_or_default()
    }

    pub fn verbose(&self) -> bool {
        self.output.verbose.unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        self.model.endpoint.as_deref().unwrap_or(DEFAULT_API_ENDPOINT)
    }

    fn model_name(&self) -> &str {
        self.model.name.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    fn api_key(&self) -> Option<&str> {
        self.cli_api_key.as_deref()
    }

    fn file_api_key(&self) -> Option<&str> {
        // 未替換的 ${VAR} 視為未設定
        self.model
            .api_key
            .as_deref()
            .filter(|k| !ENV_VAR_PATTERN.is_match(k))
    }

    fn timeout_seconds(&self) -> u64 {
        self.analysis.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn max_attempts(&self) -> u32 {
        self.analysis.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    fn backoff_ms(&self) -> u64 {
        self.analysis
            .backoff_ms
            .unwrap_or(DEFAULT_BACKOFF.as_millis() as u64)
    }

    fn max_image_edge(&self) -> u32 {
        self.image.max_long_edge.unwrap_or(DEFAULT_MAX_IMAGE_EDGE)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[model]
name = "gemini-1.5-pro"
endpoint = "https://proxy.example.com/v1beta"
api_key = "abc123"

[analysis]
timeout_seconds = 60
max_attempts = 3
backoff_ms = 250

[image]
max_long_edge = 1024

[output]
format = "json"
verbose = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.model_name(), "gemini-1.5-pro");
        assert_eq!(config.api_endpoint(), "https://proxy.example.com/v1beta");
        assert_eq!(config.file_api_key(), Some("abc123"));
        assert_eq!(config.api_key(), None);
        assert_eq!(config.timeout_seconds(), 60);
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.backoff_ms(), 250);
        assert_eq!(config.max_image_edge(), 1024);
        assert_eq!(config.output_format(), OutputFormat::Json);
        assert!(config.verbose());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.model_name(), "gemini-1.5-flash");
        assert_eq!(config.api_endpoint(), DEFAULT_API_ENDPOINT);
        assert_eq!(config.file_api_key(), None);
        assert_eq!(config.timeout_seconds(), 35);
        assert_eq!(config.max_attempts(), 2);
        assert_eq!(config.backoff_ms(), 600);
        assert_eq!(config.max_image_edge(), 1400);
        assert_eq!(config.output_format(), OutputFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BIOGUARD_TEST_KEY", "from-env");

        let toml_content = r#"
[model]
api_key = "${BIOGUARD_TEST_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.file_api_key(), Some("from-env"));

        std::env::remove_var("BIOGUARD_TEST_KEY");
    }

    #[test]
    fn test_unresolved_env_var_is_treated_as_missing() {
        let toml_content = r#"
[model]
api_key = "${BIOGUARD_SURELY_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.file_api_key(), None);
    }

    #[test]
    fn test_cli_api_key_is_kept_apart_from_file_key() {
        let config = TomlConfig::from_toml_str(
            r#"
[model]
api_key = "toml-key"
"#,
        )
        .unwrap()
        .with_cli_api_key(Some("cli-key".to_string()));

        assert_eq!(config.api_key(), Some("cli-key"));
        assert_eq!(config.file_api_key(), Some("toml-key"));
        assert!(!format!("{:?}", config).contains("toml-key"));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[model]
endpoint = "invalid-url"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[analysis]
max_attempts = 0
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[analysis\ntimeout_seconds = ").unwrap_err();
        assert!(matches!(err, BioGuardError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[analysis]
timeout_seconds = 20
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.timeout_seconds(), 20);
    }
}
