use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// 面向用户的修复提示类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintCategory {
    Credential,
    Permission,
    Quota,
    ModelNotFound,
    Network,
    Generic,
}

/// 按顺序匹配，先命中者优先
static RULES: Lazy<Vec<(Regex, HintCategory)>> = Lazy::new(|| {
    [
        (r"(?i)gemini_api_key|environment variable", HintCategory::Credential),
        (r"(?i)api_key|api key|invalid.*\bkey\b", HintCategory::Credential),
        (r"(?i)permission|\b403\b", HintCategory::Permission),
        (r"(?i)quota|exhausted|\b429\b", HintCategory::Quota),
        (r"(?i)not found|\b404\b", HintCategory::ModelNotFound),
        (r"(?i)network|connection|timeout|timed out", HintCategory::Network),
    ]
    .into_iter()
    .map(|(pattern, category)| (Regex::new(pattern).unwrap(), category))
    .collect()
});

impl HintCategory {
    /// 根据错误描述判断提示类别
    pub fn classify(error: &str) -> Self {
        RULES
            .iter()
            .find(|(re, _)| re.is_match(error))
            .map(|(_, category)| *category)
            .unwrap_or(HintCategory::Generic)
    }

    pub fn label(&self) -> &'static str {
        match self {
            HintCategory::Credential => "credential",
            HintCategory::Permission => "permission",
            HintCategory::Quota => "quota",
            HintCategory::ModelNotFound => "model-not-found",
            HintCategory::Network => "network",
            HintCategory::Generic => "generic",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            HintCategory::Credential => {
                "🔑 GEMINI_API_KEY 缺失或无效。请在 https://aistudio.google.com/apikey 获取有效密钥并设置环境变量。"
            }
            HintCategory::Permission => {
                "🔒 API 密钥没有权限。请确认 Google Cloud 项目中已启用 Gemini API。"
            }
            HintCategory::Quota => {
                "⏱️ 触发限流或配额耗尽。请稍等一分钟再试，或在 https://aistudio.google.com 查看配额。"
            }
            HintCategory::ModelNotFound => {
                "🤖 模型不存在。请修改配置中的 gemini.model，或运行 'careerai models' 查看可用模型。"
            }
            HintCategory::Network => "🌐 网络错误。请检查网络连接后重试。",
            HintCategory::Generic => "📋 请复制上面的错误信息并查阅 Gemini API 文档。",
        }
    }
}

impl fmt::Display for HintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
