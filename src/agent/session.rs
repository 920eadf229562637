use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// 单条消息，创建后不可变
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
    token_count: Option<u64>,
}

impl Message {
    fn new(role: Role, content: &str, tokens: u64) -> Self {
        // 只有模型回复才携带用量
        let token_count = (role == Role::Model && tokens > 0).then_some(tokens);
        Message {
            role,
            content: content.to_string(),
            created_at: Utc::now(),
            token_count,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn token_count(&self) -> Option<u64> {
        self.token_count
    }
}

/// 会话 - 一段对话的消息日志和 token 计数
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    messages: Vec<Message>,
    total_tokens_used: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        // 只取 UUID 前 8 位作为短 ID
        let id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        Session {
            id,
            created_at: Utc::now(),
            messages: Vec::new(),
            total_tokens_used: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 追加消息并累加 token
    pub fn append(&mut self, role: Role, content: &str, tokens: u64) {
        self.messages.push(Message::new(role, content, tokens));
        self.total_tokens_used = self.total_tokens_used.saturating_add(tokens);
    }

    /// 消息数量
    pub fn count(&self) -> usize {
        self.messages.len()
    }

    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// 清空历史，保留 ID 和创建时间
    pub fn clear(&mut self) {
        self.messages.clear();
        self.total_tokens_used = 0;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn total_tokens_used(&self) -> u64 {
        self.total_tokens_used
    }
}
