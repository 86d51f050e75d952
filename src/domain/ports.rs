use crate::domain::model::InferenceImage;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 多模態模型：給定提示與影像，回傳原始文字
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, prompt: &str, image: &InferenceImage) -> Result<String>;
}

/// 重試之間的等待，測試時可替換成不真正睡眠的實作
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub trait ImageSource: Send + Sync {
    fn read_image(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn model_name(&self) -> &str;
    /// 明確指定的 key（CLI 參數），優先於環境變數
    fn api_key(&self) -> Option<&str>;
    /// 設定檔中的 key，環境變數都沒有時才使用
    fn file_api_key(&self) -> Option<&str> {
        None
    }
    fn timeout_seconds(&self) -> u64;
    fn max_attempts(&self) -> u32;
    fn backoff_ms(&self) -> u64;
    fn max_image_edge(&self) -> u32;
}
