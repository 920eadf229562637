use thiserror::Error;

/// 一次对话调用可能出现的错误
#[derive(Debug, Error)]
pub enum ChatError {
    /// 缺少 GEMINI_API_KEY
    #[error("GEMINI_API_KEY 环境变量未设置，请在系统环境或 .env 中配置")]
    MissingApiKey,

    /// 构建 HTTP 客户端失败
    #[error("HTTP 客户端初始化失败：{0}")]
    Http(#[from] reqwest::Error),

    /// 远端返回非 2xx
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// 超时、连接失败等传输层错误
    #[error("网络错误：{0}")]
    Network(String),

    /// 2xx 但响应结构不符合预期
    #[error("响应解析失败：{0}")]
    InvalidResponse(String),
}

/// 错误的处理类别，决定是否重试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 配置问题，构建阶段即失败，永不重试
    Configuration,
    /// 限流或服务暂不可用
    Transient,
    /// 其他一切错误
    Permanent,
}

impl ChatError {
    pub fn class(&self) -> FailureClass {
        match self {
            ChatError::MissingApiKey | ChatError::Http(_) => FailureClass::Configuration,
            ChatError::Api { status, .. } if is_transient_status(*status) => {
                FailureClass::Transient
            }
            ChatError::Network(msg) if mentions_transient_status(msg) => FailureClass::Transient,
            _ => FailureClass::Permanent,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() == FailureClass::Transient
    }
}

/// 429 Too Many Requests / 503 Service Unavailable
fn is_transient_status(status: u16) -> bool {
    status == 429 || status == 503
}

fn mentions_transient_status(msg: &str) -> bool {
    msg.contains("429") || msg.contains("503")
}
