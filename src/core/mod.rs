pub mod analyzer;
pub mod normalizer;
pub mod prompt;
pub mod report;
pub mod retry;

pub use crate::domain::model::{InferenceImage, RiskAssessment, RiskLevel, Uncertainty};
pub use crate::domain::ports::{ConfigProvider, ImageSource, InferenceClient, Sleeper};
pub use crate::utils::error::Result;
