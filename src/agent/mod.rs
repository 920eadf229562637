pub mod context;
pub mod core;
pub mod llm;
pub mod retry;
pub mod session;

pub use context::{history_before_latest, windowed_history, HistoryEntry};
pub use core::{Agent, TurnOutcome};
pub use llm::{ChatBackend, ConnectionStatus, GeminiClient, ModelInfo, Reply};
pub use retry::{send_message, CallEnvelope, CallResult, RetryPolicy};
pub use session::{Message, Role, Session};
