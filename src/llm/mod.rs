pub mod agents;
pub mod client;
pub mod error_handler;

pub use agents::{extract_commands, PredictorAgent, SummarizerAgent};
pub use client::{LlmClient, LlmProvider, LlmRequest, LlmResponse};
pub use error_handler::{ErrorHandler, LlmError, RetryConfig};
