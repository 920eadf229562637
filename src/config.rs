use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ChatError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 配置根目录 ~/.careerai
fn home_base() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".careerai")
}

/// 应用信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub description: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            title: "CareerAI".to_string(),
            description: "AI-powered career guidance: resume tips, interview prep, job search strategies".to_string(),
        }
    }
}

/// Gemini 模型与生成参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub model: String,
    pub base_url: String,
    pub max_output_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub base_backoff_ms: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        GeminiSettings {
            model: "gemini-2.5-flash".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_output_tokens: 1024,
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            timeout_secs: 30,
            max_retries: 2,
            base_backoff_ms: 1000,
        }
    }
}

/// 对话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub max_history_turns: usize,
    pub show_token_usage: bool,
    pub show_session_info: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            max_history_turns: 10,
            show_token_usage: true,
            show_session_info: true,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// 是否同时输出到 stderr（交互模式下默认关闭）
    pub console: bool,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            console: false,
            file: Some(home_base().join("logs").join("app.log")),
        }
    }
}

/// 统一配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub gemini: GeminiSettings,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        home_base().join("config.toml")
    }

    /// 从文件加载配置，文件不存在时使用默认值
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败：{}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("解析配置文件失败：{}", path.display()))?;

        Ok(config)
    }

    /// 从默认位置加载配置并应用环境变量覆盖
    pub fn load_default() -> Result<Self> {
        let mut config = Self::load(&Self::default_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// 环境变量覆盖：GEMINI_MODEL、MAX_OUTPUT_TOKENS、LOG_LEVEL
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = non_empty("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(max) = non_empty("MAX_OUTPUT_TOKENS") {
            self.gemini.max_output_tokens = max
                .trim()
                .parse()
                .with_context(|| format!("MAX_OUTPUT_TOKENS 不是有效整数：{}", max))?;
        }
        if let Some(level) = non_empty("LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// 读取 GEMINI_API_KEY，密钥只来自环境，不写入配置文件
    pub fn api_key_from<F>(lookup: F) -> Result<String, ChatError>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("GEMINI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ChatError::MissingApiKey)
    }

    /// 保存配置到文件
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
