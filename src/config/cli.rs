use crate::core::ImageSource;
use crate::utils::error::Result;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct LocalImageSource {
    base_path: Option<String>,
}

impl LocalImageSource {
    pub fn new() -> Self {
        Self { base_path: None }
    }

    /// 相對路徑以 `base_path` 為根
    pub fn with_base_path(base_path: String) -> Self {
        Self {
            base_path: Some(base_path),
        }
    }
}

impl ImageSource for LocalImageSource {
    async fn read_image(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = match &self.base_path {
            Some(base) => Path::new(base).join(path),
            None => Path::new(path).to_path_buf(),
        };
        tracing::debug!("📁 Reading image from {}", full_path.display());
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }
}
