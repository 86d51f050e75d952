use crate::domain::model::InferenceImage;
use crate::domain::ports::{ConfigProvider, InferenceClient};
use crate::utils::error::{BioGuardError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_API_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiClient {
    api_endpoint: String,
    api_key: String,
    model_name: String,
    client: Client,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_endpoint", &self.api_endpoint)
            .field("api_key", &"***")
            .field("model_name", &self.model_name)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_endpoint: String, api_key: String, model_name: String) -> Self {
        Self {
            api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
            api_key,
            model_name,
            client: Client::new(),
        }
    }

    /// API key 依序取自 CLI 參數、`GEMINI_API_KEY`、`GOOGLE_API_KEY`、設定檔
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let api_key = resolve_api_key(
            config.api_key(),
            std::env::var("GEMINI_API_KEY").ok().as_deref(),
            std::env::var("GOOGLE_API_KEY").ok().as_deref(),
            config.file_api_key(),
        )
        .ok_or(BioGuardError::MissingApiKey)?;

        Ok(Self::new(
            config.api_endpoint().to_string(),
            api_key,
            config.model_name().to_string(),
        ))
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_endpoint, self.model_name
        )
    }
}

/// 依優先順序取第一個非空白的 key
pub fn resolve_api_key(
    explicit: Option<&str>,
    gemini_env: Option<&str>,
    google_env: Option<&str>,
    from_file: Option<&str>,
) -> Option<String> {
    [explicit, gemini_env, google_env, from_file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|k| !k.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn generate(&self, prompt: &str, image: &InferenceImage) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: general_purpose::STANDARD.encode(&image.data),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 512,
            },
        };

        tracing::debug!("📡 Calling Gemini model: {}", self.model_name);

        let response = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let e = BioGuardError::from(e);
                tracing::error!("Gemini API request failed: {}", e);
                e
            })?;

        let status = response.status();
        tracing::debug!("📡 Gemini response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error: {} - {}", status, error_text);
            return Err(BioGuardError::InferenceServiceError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: GenerateResponse = response.json().await?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(BioGuardError::InferenceServiceError {
                status: status.as_u16(),
                message: "No text candidate in model response".to_string(),
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url_trims_trailing_slash() {
        let client = GeminiClient::new(
            "https://example.com/v1beta/".to_string(),
            "k".to_string(),
            "gemini-1.5-flash".to_string(),
        );
        assert_eq!(
            client.generate_url(),
            "https://example.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_serialization_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: "p".to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: "AAAA".to_string(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 512,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "p");
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/jpeg"
        );
        assert_eq!(json["generation_config"]["max_output_tokens"], 512);
    }

    #[test]
    fn test_resolve_api_key_order() {
        let key = |a, b, c, d| resolve_api_key(a, b, c, d);

        assert_eq!(
            key(Some("cli"), Some("gemini"), Some("google"), Some("file")).as_deref(),
            Some("cli")
        );
        assert_eq!(
            key(None, Some("gemini"), Some("google"), Some("file")).as_deref(),
            Some("gemini")
        );
        assert_eq!(
            key(None, None, Some("google"), Some("file")).as_deref(),
            Some("google")
        );
        assert_eq!(key(None, None, None, Some("file")).as_deref(), Some("file"));
        assert_eq!(key(None, None, None, None), None);
    }

    #[test]
    fn test_resolve_api_key_skips_blank_values() {
        assert_eq!(
            resolve_api_key(Some("  "), Some(""), None, Some("file")).as_deref(),
            Some("file")
        );
        assert_eq!(resolve_api_key(Some(" "), None, None, None), None);
    }

    #[test]
    fn test_from_config_prefers_cli_key_over_file_key() {
        let config = crate::config::toml_config::TomlConfig::from_toml_str(
            r#"
[model]
api_key = "toml-key"
"#,
        )
        .unwrap()
        .with_cli_api_key(Some("cli-key".to_string()));

        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.api_key, "cli-key");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = GeminiClient::new(
            "https://example.com/v1beta".to_string(),
            "SECRET123".to_string(),
            "gemini-1.5-flash".to_string(),
        );
        assert!(!format!("{:?}", client).contains("SECRET123"));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_api_key() {
        let client = GeminiClient::new(
            "http://127.0.0.1:1/v1beta".to_string(),
            "SECRET123".to_string(),
            "m".to_string(),
        );
        let err = client
            .generate("p", &InferenceImage::jpeg(vec![0]))
            .await
            .unwrap_err();

        assert!(matches!(err, BioGuardError::ApiError(_)));
        assert!(!err.to_string().contains("SECRET123"));
        assert!(!format!("{:?}", err).contains("SECRET123"));
    }
}
