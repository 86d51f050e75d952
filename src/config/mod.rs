pub mod cli;
pub mod toml_config;

use crate::adapters::gemini::{DEFAULT_API_ENDPOINT, DEFAULT_MODEL};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_positive_number, validate_range,
    validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

pub const TIMEOUT_RANGE_SECONDS: (u64, u64) = (10, 90);
pub const MAX_ATTEMPTS_RANGE: (u32, u32) = (1, 5);
pub const MAX_BACKOFF_MS: u64 = 10_000;
pub const MIN_IMAGE_EDGE: u32 = 64;
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// stderr 日誌格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Clone, Serialize, Deserialize, Parser)]
#[command(name = "bioguard")]
#[command(about = "Analyze a packaged food photo and report a preventive health-risk verdict")]
pub struct CliConfig {
    /// Path to the food product image (png, jpg, jpeg)
    pub image: String,

    /// Optional TOML configuration file; its values replace the flags below
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    #[arg(long, default_value = "35")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "2")]
    pub max_attempts: u32,

    #[arg(long, default_value = "600")]
    pub backoff_ms: u64,

    #[arg(long, default_value = "1400")]
    pub max_image_edge: u32,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("image", &self.image)
            .field("config", &self.config)
            .field("api_endpoint", &self.api_endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_ms", &self.backoff_ms)
            .field("max_image_edge", &self.max_image_edge)
            .field("output", &self.output)
            .field("log_format", &self.log_format)
            .field("verbose", &self.verbose)
            .finish()
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn backoff_ms(&self) -> u64 {
        self.backoff_ms
    }

    fn max_image_edge(&self) -> u32 {
        self.max_image_edge
    }
}

/// 所有設定來源共用的數值檢查
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_url("api_endpoint", config.api_endpoint())?;
    validate_non_empty_string("model", config.model_name())?;
    validate_range(
        "timeout_seconds",
        config.timeout_seconds(),
        TIMEOUT_RANGE_SECONDS.0,
        TIMEOUT_RANGE_SECONDS.1,
    )?;
    validate_range(
        "max_attempts",
        config.max_attempts(),
        MAX_ATTEMPTS_RANGE.0,
        MAX_ATTEMPTS_RANGE.1,
    )?;
    validate_range("backoff_ms", config.backoff_ms(), 0, MAX_BACKOFF_MS)?;
    validate_positive_number("max_image_edge", config.max_image_edge(), MIN_IMAGE_EDGE)?;
    Ok(())
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_file_extension("image", &self.image, IMAGE_EXTENSIONS)?;
        validate_provider(self)
    }
}
