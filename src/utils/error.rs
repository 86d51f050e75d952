use thiserror::Error;

/// 模型輸出正規化失敗的種類（可重試）
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizationFailure {
    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model response is not valid JSON")]
    MalformedJson,

    #[error("model response JSON is not an object")]
    UnexpectedShape,

    #[error("risk level is missing or not LOW/HIGH")]
    InvalidRiskLevel,

    #[error("warning message is missing or blank")]
    MissingWarning,
}

impl NormalizationFailure {
    /// 穩定的機器可讀代碼
    pub fn code(&self) -> &'static str {
        match self {
            NormalizationFailure::EmptyResponse => "empty_model_response",
            NormalizationFailure::MalformedJson => "invalid_json",
            NormalizationFailure::UnexpectedShape => "json_not_object",
            NormalizationFailure::InvalidRiskLevel => "missing_or_invalid_risk_level",
            NormalizationFailure::MissingWarning => "missing_warning_ar",
        }
    }
}

#[derive(Error, Debug)]
pub enum BioGuardError {
    #[error("ai_output_invalid:{} after {attempts} attempt(s)", .last.code())]
    AiOutputInvalid {
        last: NormalizationFailure,
        attempts: u32,
    },

    #[error("Inference timed out after {seconds}s")]
    InferenceTimeout { seconds: u64 },

    #[error("Inference service returned {status}: {message}")]
    InferenceServiceError { status: u16, message: String },

    #[error("API request failed: {0}")]
    ApiError(reqwest::Error),

    #[error("missing_api_key")]
    MissingApiKey,

    #[error("Image processing error: {message}")]
    ImageError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    ModelOutput,
    Inference,
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// URL 可能帶有憑證，一律剝除
impl From<reqwest::Error> for BioGuardError {
    fn from(e: reqwest::Error) -> Self {
        BioGuardError::ApiError(e.without_url())
    }
}

impl From<image::ImageError> for BioGuardError {
    fn from(e: image::ImageError) -> Self {
        BioGuardError::ImageError {
            message: e.to_string(),
        }
    }
}

impl BioGuardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BioGuardError::AiOutputInvalid { .. } => ErrorCategory::ModelOutput,
            BioGuardError::InferenceTimeout { .. }
            | BioGuardError::InferenceServiceError { .. }
            | BioGuardError::ApiError(_) => ErrorCategory::Inference,
            BioGuardError::ImageError { .. } => ErrorCategory::Input,
            BioGuardError::MissingApiKey
            | BioGuardError::ConfigValidationError { .. }
            | BioGuardError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            BioGuardError::IoError(_) | BioGuardError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 模型或網路問題，使用者重試即可
            ErrorCategory::ModelOutput | ErrorCategory::Inference => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者的訊息，不含任何技術細節或原始 JSON
    pub fn user_friendly_message(&self) -> String {
        let msg = match self {
            BioGuardError::AiOutputInvalid { .. } => {
                "تعذر استخراج نتيجة موثوقة من الصورة. حاول تصوير جدول المكونات بشكل أوضح."
            }
            BioGuardError::InferenceTimeout { .. } => {
                "انتهت مهلة التحليل. حاول مرة أخرى بصورة أوضح أو أعد المحاولة لاحقاً."
            }
            BioGuardError::InferenceServiceError { .. } | BioGuardError::ApiError(_) => {
                "حدث خطأ أثناء التحليل. حاول مرة أخرى."
            }
            BioGuardError::MissingApiKey => {
                "لم يتم العثور على مفتاح API. عيّن GEMINI_API_KEY أو GOOGLE_API_KEY."
            }
            BioGuardError::ImageError { .. } => "تعذر قراءة الصورة. حاول رفع صورة أخرى واضحة.",
            BioGuardError::ConfigValidationError { .. }
            | BioGuardError::InvalidConfigValueError { .. } => "إعدادات غير صالحة. راجع ملف الإعدادات.",
            BioGuardError::IoError(_) | BioGuardError::SerializationError(_) => {
                "حدث خطأ غير متوقع. حاول مرة أخرى."
            }
        };
        msg.to_string()
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            BioGuardError::AiOutputInvalid { last, .. } => format!(
                "Model output failed validation ({}); retake the photo focusing on the ingredients panel",
                last.code()
            ),
            BioGuardError::InferenceTimeout { seconds } => format!(
                "Increase --timeout-seconds (currently {}) or retry later",
                seconds
            ),
            BioGuardError::InferenceServiceError { status, .. } if *status == 401 || *status == 403 => {
                "Check that the API key is valid for the Gemini API".to_string()
            }
            BioGuardError::InferenceServiceError { .. } | BioGuardError::ApiError(_) => {
                "Check network connectivity and the configured API endpoint".to_string()
            }
            BioGuardError::MissingApiKey => {
                "Set GEMINI_API_KEY or GOOGLE_API_KEY, or pass --api-key".to_string()
            }
            BioGuardError::ImageError { .. } => {
                "Use a readable PNG or JPEG image".to_string()
            }
            BioGuardError::ConfigValidationError { .. }
            | BioGuardError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            BioGuardError::IoError(_) => "Check file paths and permissions".to_string(),
            BioGuardError::SerializationError(_) => "Report this as a bug".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BioGuardError>;
