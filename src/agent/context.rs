use crate::types::Content;

use super::session::{Role, Session};

/// 发往 API 的历史条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

impl HistoryEntry {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        HistoryEntry {
            role,
            text: text.into(),
        }
    }

    /// 转换为 Gemini contents 条目
    pub fn to_content(&self) -> Content {
        Content::new(self.role.as_str(), &self.text)
    }
}

/// 取最近 max_turns 轮对话（每轮一问一答，最多 2 * max_turns 条）
pub fn windowed_history(session: &Session, max_turns: usize) -> Vec<HistoryEntry> {
    let messages = session.messages();
    let keep = max_turns.saturating_mul(2).min(messages.len());

    messages[messages.len() - keep..]
        .iter()
        .map(|m| HistoryEntry::new(m.role(), m.content()))
        .collect()
}

/// 窗口历史，去掉末尾尚未回答的用户消息（它会作为新一轮单独发送）
pub fn history_before_latest(session: &Session, max_turns: usize) -> Vec<HistoryEntry> {
    let mut history = windowed_history(session, max_turns);
    if history.last().map(|e| e.role) == Some(Role::User) {
        history.pop();
    }
    history
}
