pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod hints;
pub mod logging;
pub mod prompts;
pub mod types;

pub use agent::{Agent, CallEnvelope, CallResult, GeminiClient, RetryPolicy, Session};
pub use cli::run_cli;
pub use config::{ChatConfig, Config, GeminiSettings, LoggingConfig};
pub use error::{ChatError, FailureClass};
pub use hints::HintCategory;
