use tracing::{error, info};

use crate::hints::HintCategory;

use super::context::history_before_latest;
use super::llm::ChatBackend;
use super::retry::{send_message, CallEnvelope, CallResult, RetryPolicy};
use super::session::{Role, Session};

/// 一轮对话的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub envelope: CallEnvelope,
    /// 失败时给出的修复提示类别
    pub hint: Option<HintCategory>,
}

impl TurnOutcome {
    pub fn is_success(&self) -> bool {
        self.envelope.success
    }
}

/// 持有一个会话和一个后端，一次只处理一轮
pub struct Agent<B: ChatBackend> {
    session: Session,
    backend: B,
    policy: RetryPolicy,
    max_history_turns: usize,
}

impl<B: ChatBackend> Agent<B> {
    pub fn new(backend: B, policy: RetryPolicy, max_history_turns: usize) -> Self {
        let session = Session::new();
        info!(session = session.id(), "New session started");
        Agent {
            session,
            backend,
            policy,
            max_history_turns,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    pub async fn chat(&mut self, user_input: &str) -> TurnOutcome {
        self.session.append(Role::User, user_input, 0);
        let history = history_before_latest(&self.session, self.max_history_turns);

        let result = send_message(&self.backend, user_input, &history, &self.policy).await;

        let hint = match &result {
            CallResult::Success { text, tokens_used } => {
                self.session.append(Role::Model, text, *tokens_used);
                info!(
                    session = self.session.id(),
                    tokens = *tokens_used,
                    "Turn complete"
                );
                None
            }
            CallResult::Failure { error: message } => {
                error!(session = self.session.id(), "API call failed: {}", message);
                Some(HintCategory::classify(message))
            }
        };

        TurnOutcome {
            envelope: result.into(),
            hint,
        }
    }

    /// 清空当前会话历史
    pub fn clear_history(&mut self) {
        self.session.clear();
        info!(session = self.session.id(), "Session cleared");
    }

    /// 开始新会话，返回新 ID
    pub fn new_session(&mut self) -> &str {
        self.session = Session::new();
        info!(session = self.session.id(), "New session started");
        self.session.id()
    }
}
