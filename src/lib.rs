pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::gemini::GeminiClient;
pub use config::{cli::LocalImageSource, toml_config::TomlConfig, LogFormat, OutputFormat};
pub use crate::core::analyzer::RiskAnalyzer;
pub use crate::core::normalizer::{extract_json_candidate, parse_and_validate};
pub use crate::core::retry::{analyze_with_retry, RetryDecision, RetryPolicy, TokioSleeper};
pub use domain::model::{InferenceImage, RiskAssessment, RiskLevel, Uncertainty};
pub use utils::error::{BioGuardError, NormalizationFailure, Result};
