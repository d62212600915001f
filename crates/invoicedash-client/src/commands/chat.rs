use crate::ClientResult;
use crate::chat::{ChatClient, ChatMode, segments};
use crate::config::AppConfig;
use crate::contracts::envelope::{SuccessEnvelope, endpoint};

#[derive(Debug)]
pub struct ChatRunOptions<'a> {
    pub query: &'a str,
    pub mode: ChatMode,
    pub config: &'a AppConfig,
}

/// Buffered mode returns the service's answer as-is; segmented mode returns
/// the ordered event frames.
pub fn run(options: ChatRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let client = ChatClient::new(options.config)?;
    let response = client.ask(options.query)?;
    match options.mode {
        ChatMode::Buffered => endpoint("chat", response),
        ChatMode::Segmented => endpoint("chat", segments(&response)),
    }
}
