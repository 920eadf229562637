use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::config::{Config, GeminiSettings};
use crate::error::ChatError;
use crate::types::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ModelList,
};

use super::context::HistoryEntry;

/// 一次成功交换的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub tokens_used: u64,
}

/// 支持 generateContent 的模型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub display_name: Option<String>,
}

/// 连接自检结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub detail: String,
}

/// 对话后端，重试层只依赖这个接口
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn model(&self) -> &str;

    async fn exchange(
        &self,
        user_message: &str,
        history: &[HistoryEntry],
    ) -> Result<Reply, ChatError>;
}

/// Gemini generateContent 客户端，构建后不可变
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    system_prompt: String,
    generation: GenerationConfig,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("generation", &self.generation)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        settings: &GeminiSettings,
        system_prompt: impl Into<String>,
    ) -> Result<Self, ChatError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ChatError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(GeminiClient {
            client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            system_prompt: system_prompt.into(),
            generation: GenerationConfig {
                max_output_tokens: settings.max_output_tokens,
                temperature: settings.temperature,
                top_p: settings.top_p,
                top_k: settings.top_k,
            },
        })
    }

    /// 从环境读取 GEMINI_API_KEY 后构建，缺少密钥时不发起任何请求
    pub fn from_config(config: &Config, system_prompt: impl Into<String>) -> Result<Self, ChatError> {
        Self::from_lookup(config, system_prompt, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(
        config: &Config,
        system_prompt: impl Into<String>,
        lookup: F,
    ) -> Result<Self, ChatError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = Config::api_key_from(lookup)?;
        let client = Self::new(api_key, &config.gemini, system_prompt)?;
        debug!(model = %client.model, "GeminiClient ready");
        Ok(client)
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    pub(crate) fn build_request(
        &self,
        user_message: &str,
        history: &[HistoryEntry],
    ) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history.iter().map(HistoryEntry::to_content).collect();
        contents.push(Content::new("user", user_message));

        GenerateContentRequest {
            contents,
            system_instruction: Content::instruction(&self.system_prompt),
            generation_config: self.generation.clone(),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ChatError> {
        let response = request
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ChatError::Network(describe_transport_error(e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChatError::Network(describe_transport_error(e)))?;

        if !status.is_success() {
            // 优先取 error.message，解析失败时用原始响应体
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }

    /// 列出支持 generateContent 的模型（去掉 models/ 前缀）
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ChatError> {
        let url = format!("{}/models", self.base_url);
        let body = self.send(self.client.get(&url)).await?;
        let list: ModelList = serde_json::from_str(&body)
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        Ok(list
            .models
            .into_iter()
            .filter(|m| m.supported_generation_methods.iter().any(|g| g == "generateContent"))
            .map(|m| ModelInfo {
                name: m.name.trim_start_matches("models/").to_string(),
                display_name: m.display_name,
            })
            .collect())
    }

    /// 连接自检：发送一句简单问候
    pub async fn ping(&self) -> ConnectionStatus {
        match self.exchange("Say OK", &[]).await {
            Ok(reply) if !reply.text.trim().is_empty() => ConnectionStatus {
                connected: true,
                detail: format!("Connected - model: {}", self.model),
            },
            Ok(_) => ConnectionStatus {
                connected: false,
                detail: "Empty response".to_string(),
            },
            Err(e) => ConnectionStatus {
                connected: false,
                detail: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn exchange(
        &self,
        user_message: &str,
        history: &[HistoryEntry],
    ) -> Result<Reply, ChatError> {
        let request = self.build_request(user_message, history);
        debug!(model = %self.model, history = history.len(), "Gemini API request");

        let body = self
            .send(self.client.post(self.generate_url()).json(&request))
            .await?;

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .first_text()
            .ok_or_else(|| ChatError::InvalidResponse("响应中没有 candidates 文本".to_string()))?
            .to_string();

        Ok(Reply {
            text,
            tokens_used: parsed.total_tokens(),
        })
    }
}

/// 去掉 URL，key 在查询参数里，不能进日志
fn describe_transport_error(err: reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    format!("{}: {}", kind, err.without_url())
}
