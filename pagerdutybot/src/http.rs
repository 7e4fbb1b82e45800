// File: pagerdutybot/src/http.rs
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use base::chat::{ChatTarget, ChatTransport};
use base::{DebugOutput, Result, Shutdown, WebhookService};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::db::PagerDutyDb;

/// Longest payload excerpt forwarded into chat, in characters
pub const MAX_FORWARDED_CHARS: usize = 2000;

#[derive(Clone)]
struct WebhookState {
    db: PagerDutyDb,
    chat: Arc<dyn ChatTransport>,
    debug: DebugOutput,
}

/// HTTP endpoint receiving PagerDuty events
pub struct HttpSrv {
    addr: String,
    state: WebhookState,
    stopped: Shutdown,
}

impl HttpSrv {
    pub fn new(
        addr: &str,
        db: PagerDutyDb,
        chat: Arc<dyn ChatTransport>,
        debug: DebugOutput,
    ) -> Self {
        Self {
            addr: addr.to_string(),
            state: WebhookState { db, chat, debug },
            stopped: Shutdown::new(),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/pagerdutybot", get(health))
            .route("/pagerdutybot/{id}", post(handle_webhook))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.is_triggered()
    }
}

#[async_trait]
impl WebhookService for HttpSrv {
    async fn listen(&self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        info!("Webhook server running on http://{}", listener.local_addr()?);

        let stopped = self.stopped.clone();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { stopped.wait().await })
            .await?;

        info!("Webhook server stopped");
        Ok(())
    }

    fn stop(&self) {
        if self.stopped.trigger() {
            info!("Stopping webhook server");
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn handle_webhook(
    State(state): State<WebhookState>,
    Path(id): Path<String>,
    body: Bytes,
) -> StatusCode {
    let conv_id = match state.db.get_webhook_conv(&id).await {
        Ok(Some(conv_id)) => conv_id,
        Ok(None) => {
            warn!("Webhook request for unknown id {}", id);
            return StatusCode::NOT_FOUND;
        }
        Err(e) => {
            state
                .debug
                .error(&format!("failed to look up webhook {}: {}", id, e))
                .await;
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    let notice = format_notice(&String::from_utf8_lossy(&body));
    let target = ChatTarget::Conversation(conv_id);
    if let Err(e) = state.chat.send_message(&target, &notice).await {
        state
            .debug
            .error(&format!("failed to forward webhook {}: {}", id, e))
            .await;
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    StatusCode::OK
}

/// Wraps a raw payload in the fixed notification text
pub fn format_notice(payload: &str) -> String {
    let payload = payload.trim();
    let excerpt: String = payload.chars().take(MAX_FORWARDED_CHARS).collect();
    let ellipsis = if excerpt.len() < payload.len() { "\n..." } else { "" };
    format!("PagerDuty notification received:\n```\n{}{}\n```", excerpt, ellipsis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_keeps_short_payload() {
        let notice = format_notice("{\"event\":\"incident.trigger\"}\n");
        assert!(notice.starts_with("PagerDuty notification received:"));
        assert!(notice.contains("{\"event\":\"incident.trigger\"}\n```"));
        assert!(!notice.contains("..."));
    }

    #[test]
    fn test_notice_truncates_long_payload() {
        let payload = "é".repeat(MAX_FORWARDED_CHARS + 10);
        let notice = format_notice(&payload);
        assert_eq!(notice.matches('é').count(), MAX_FORWARDED_CHARS);
        assert!(notice.ends_with("\n...\n```"));
    }
}
