use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::GeminiSettings;

use super::context::HistoryEntry;
use super::llm::ChatBackend;

/// 重试策略：只对限流和服务暂不可用重试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &GeminiSettings) -> Self {
        RetryPolicy {
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(settings.base_backoff_ms),
        }
    }

    /// 第 attempt 次失败后的等待时间：1x, 2x, 4x ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// 一次调用的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResult {
    Success { text: String, tokens_used: u64 },
    Failure { error: String },
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success { .. })
    }
}

/// 统一的结果信封，调用方不需要区分错误类型
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallEnvelope {
    pub success: bool,
    pub text: String,
    pub tokens_used: u64,
    pub error: String,
}

impl From<CallResult> for CallEnvelope {
    fn from(result: CallResult) -> Self {
        match result {
            CallResult::Success { text, tokens_used } => CallEnvelope {
                success: true,
                text,
                tokens_used,
                error: String::new(),
            },
            CallResult::Failure { error } => CallEnvelope {
                success: false,
                error,
                ..CallEnvelope::default()
            },
        }
    }
}

const MAX_RETRIES_EXCEEDED: &str = "max retries exceeded";

/// 发送一条消息，按策略重试，所有结果都收敛为 CallResult
pub async fn send_message<B>(
    backend: &B,
    user_message: &str,
    history: &[HistoryEntry],
    policy: &RetryPolicy,
) -> CallResult
where
    B: ChatBackend + ?Sized,
{
    for attempt in 0..=policy.max_retries {
        let started = Instant::now();
        match backend.exchange(user_message, history).await {
            Ok(reply) => {
                info!(
                    model = backend.model(),
                    tokens = reply.tokens_used,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "OK"
                );
                return CallResult::Success {
                    text: reply.text,
                    tokens_used: reply.tokens_used,
                };
            }
            Err(e) => {
                let description = e.to_string();
                error!(
                    attempt = attempt + 1,
                    class = ?e.class(),
                    "Attempt failed: {}",
                    truncate(&description, 120)
                );

                if e.is_transient() && attempt < policy.max_retries {
                    let delay = policy.delay_for(attempt);
                    warn!(delay_ms = delay.as_millis() as u64, "retrying after backoff");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return CallResult::Failure { error: description };
            }
        }
    }

    CallResult::Failure {
        error: MAX_RETRIES_EXCEEDED.to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
