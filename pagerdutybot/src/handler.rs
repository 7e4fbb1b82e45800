// File: pagerdutybot/src/handler.rs
use async_trait::async_trait;
use base::chat::{ChatHandler, ChatMessage, ChatTarget, ChatTransport};
use base::{DebugOutput, Result};
use std::sync::Arc;
use tracing::debug;

use crate::db::PagerDutyDb;
use crate::options::webhook_url;

const INTEGRATE_COMMAND: &str = "!pagerduty integrate";

/// Chat command handler of the PagerDuty bot
pub struct Handler {
    chat: Arc<dyn ChatTransport>,
    debug: DebugOutput,
    db: PagerDutyDb,
    http_prefix: String,
}

impl Handler {
    pub fn new(
        chat: Arc<dyn ChatTransport>,
        debug: DebugOutput,
        db: PagerDutyDb,
        http_prefix: &str,
    ) -> Self {
        Self {
            chat,
            debug,
            db,
            http_prefix: http_prefix.to_string(),
        }
    }

    async fn handle_integrate(&self, message: &ChatMessage) -> Result<()> {
        let id = self.db.create_webhook(&message.conversation_id).await?;
        let body = format!(
            "Success! New URL to configure as a PagerDuty webhook: {}",
            webhook_url(&self.http_prefix, &id)
        );
        self.chat
            .send_message(&ChatTarget::Conversation(message.conversation_id.clone()), &body)
            .await
    }
}

#[async_trait]
impl ChatHandler for Handler {
    async fn handle_message(&self, message: &ChatMessage) -> Result<()> {
        if !is_command(&message.body, INTEGRATE_COMMAND) {
            return Ok(());
        }

        debug!(conv = %message.conversation_id, "integrate requested by {}", message.sender);
        if let Err(e) = self.handle_integrate(message).await {
            self.debug
                .error(&format!("failed to create webhook: {}", e))
                .await;
        }
        Ok(())
    }
}

fn is_command(body: &str, command: &str) -> bool {
    let body = body.trim().to_lowercase();
    body == command || body.starts_with(&format!("{} ", command))
}
