use crate::core::normalizer::parse_and_validate;
use crate::domain::model::RiskAssessment;
use crate::domain::ports::Sleeper;
use crate::utils::error::{BioGuardError, Result};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    GiveUp,
}

/// 只針對模型輸出無效的情況重新取樣；傳輸錯誤不在此重試
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// `max_attempts` 至少為 1
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// `failed_attempts` 為目前已失敗的次數（從 1 開始）
    pub fn decide(&self, failed_attempts: u32) -> RetryDecision {
        if failed_attempts < self.max_attempts {
            RetryDecision::Retry(self.backoff)
        } else {
            RetryDecision::GiveUp
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 呼叫 `fetch` 取得模型輸出並驗證，失敗時依 `policy` 重試。
///
/// `fetch` 回傳的錯誤（逾時、網路、驗證）會立即往上傳遞。
/// 重試耗盡時回傳 [`BioGuardError::AiOutputInvalid`]，帶有最後一次的失敗種類。
pub async fn analyze_with_retry<F, Fut, S>(
    mut fetch: F,
    policy: &RetryPolicy,
    sleeper: &S,
) -> Result<RiskAssessment>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String>>,
    S: Sleeper + ?Sized,
{
    let mut failed_attempts = 0;

    loop {
        let raw = fetch().await?;
        tracing::debug!("🧾 Raw model output ({} bytes): {}", raw.len(), raw);

        match parse_and_validate(&raw) {
            Ok(assessment) => {
                tracing::info!(
                    "✅ Model output validated on attempt {}/{}",
                    failed_attempts + 1,
                    policy.max_attempts()
                );
                return Ok(assessment);
            }
            Err(failure) => {
                failed_attempts += 1;
                tracing::warn!(
                    "⚠️ Attempt {}/{} produced invalid output: {}",
                    failed_attempts,
                    policy.max_attempts(),
                    failure.code()
                );

                match policy.decide(failed_attempts) {
                    RetryDecision::Retry(delay) => {
                        tracing::debug!("⏳ Retrying in {:?}", delay);
                        sleeper.sleep(delay).await;
                    }
                    RetryDecision::GiveUp => {
                        tracing::error!(
                            "❌ Giving up after {} attempt(s), last failure: {}",
                            failed_attempts,
                            failure.code()
                        );
                        return Err(BioGuardError::AiOutputInvalid {
                            last: failure,
                            attempts: failed_attempts,
                        });
                    }
                }
            }
        }
    }
}
