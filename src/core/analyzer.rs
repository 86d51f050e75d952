use crate::core::prompt::build_prompt;
use crate::core::retry::{analyze_with_retry, RetryPolicy, TokioSleeper};
use crate::domain::model::{InferenceImage, RiskAssessment};
use crate::domain::ports::{ConfigProvider, InferenceClient, Sleeper};
use crate::utils::error::{BioGuardError, Result};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 35;

/// 無條件進位，避免次秒逾時顯示為 0 秒
fn timeout_seconds(timeout: Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}

pub struct RiskAnalyzer<C: InferenceClient, S: Sleeper = TokioSleeper> {
    client: C,
    sleeper: S,
    policy: RetryPolicy,
    timeout: Duration,
}

impl<C: InferenceClient> RiskAnalyzer<C, TokioSleeper> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            policy: RetryPolicy::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    pub fn from_config<P: ConfigProvider>(client: C, config: &P) -> Self {
        Self::new(client)
            .with_policy(RetryPolicy::new(
                config.max_attempts(),
                Duration::from_millis(config.backoff_ms()),
            ))
            .with_timeout(Duration::from_secs(config.timeout_seconds()))
    }
}

impl<C: InferenceClient, S: Sleeper> RiskAnalyzer<C, S> {
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> RiskAnalyzer<C, S2> {
        RiskAnalyzer {
            client: self.client,
            sleeper,
            policy: self.policy,
            timeout: self.timeout,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 每次呼叫都受 `timeout` 限制，逾時視為失敗且不重試
    pub async fn analyze(&self, image: &InferenceImage) -> Result<RiskAssessment> {
        let prompt = build_prompt();
        let prompt = prompt.as_str();
        let client = &self.client;
        let timeout = self.timeout;

        tracing::info!(
            "🔬 Analyzing image ({} bytes, timeout {:?}, up to {} attempt(s))",
            image.data.len(),
            timeout,
            self.policy.max_attempts()
        );

        let fetch = move || async move {
            match tokio::time::timeout(timeout, client.generate(prompt, image)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::error!("⏱️ Inference call exceeded {:?}", timeout);
                    Err(BioGuardError::InferenceTimeout {
                        seconds: timeout_seconds(timeout),
                    })
                }
            }
        };

        analyze_with_retry(fetch, &self.policy, &self.sleeper).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_seconds_rounds_up() {
        assert_eq!(timeout_seconds(Duration::from_millis(50)), 1);
        assert_eq!(timeout_seconds(Duration::from_secs(35)), 35);
        assert_eq!(timeout_seconds(Duration::from_millis(35_001)), 36);
        assert_eq!(timeout_seconds(Duration::ZERO), 0);
    }
}
