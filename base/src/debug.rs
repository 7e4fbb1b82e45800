// File: base/src/debug.rs
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::chat::{ChatTarget, ChatTransport};
use crate::constants::chat::REPORT_TIMEOUT;

/// Diagnostic output shared by the bot's services.
///
/// Debug lines only go to the log. Errors are logged and mirrored to the
/// error-report conversation when one is configured.
#[derive(Clone)]
pub struct DebugOutput {
    name: String,
    chat: Arc<dyn ChatTransport>,
    err_report: Option<ChatTarget>,
}

impl DebugOutput {
    pub fn new(name: &str, chat: Arc<dyn ChatTransport>, err_report_conv: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            chat,
            err_report: err_report_conv.map(ChatTarget::parse),
        }
    }

    pub fn debug(&self, message: &str) {
        debug!(bot = %self.name, "{}", message);
    }

    pub async fn error(&self, message: &str) {
        error!(bot = %self.name, "{}", message);
        self.report(message).await;
    }

    /// Sends `message` to the error-report conversation. Delivery failures
    /// are logged and otherwise ignored.
    pub async fn report(&self, message: &str) {
        let Some(target) = &self.err_report else {
            debug!("No error report conversation configured, skipping report");
            return;
        };

        let body = format!("{}: {}", self.name, message);
        match timeout(REPORT_TIMEOUT, self.chat.send_message(target, &body)).await {
            Ok(Ok(())) => info!("Error report sent to {}", target),
            Ok(Err(e)) => warn!("Failed to send error report to {}: {}", target, e),
            Err(_) => warn!("Error report to {} timed out", target),
        }
    }
}
