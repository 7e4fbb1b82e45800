//! Chat transport backed by the keybase CLI
//!
//! `keybase status` checks the service is up and logged in, `keybase chat api`
//! executes one JSON request per call and `keybase chat api-listen` streams
//! incoming messages as JSON lines.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::{
    Advertisement, ChatConnectParams, ChatConnector, ChatHandler, ChatMessage, ChatTarget,
    ChatTransport,
};
use crate::constants::chat::API_CALL_TIMEOUT;
use crate::errors::{BotError, Result};

/// Connects [`KeybaseChat`] instances
pub struct KeybaseConnector;

#[async_trait]
impl ChatConnector for KeybaseConnector {
    async fn connect(&self, params: &ChatConnectParams) -> Result<Arc<dyn ChatTransport>> {
        let chat = KeybaseChat::start(params).await?;
        Ok(Arc::new(chat))
    }
}

pub struct KeybaseChat {
    location: String,
    home: Option<String>,
    username: String,
}

#[derive(Debug, Deserialize)]
struct StatusOutput {
    #[serde(rename = "Username", default)]
    username: String,
    #[serde(rename = "LoggedIn", default)]
    logged_in: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    result: Option<Value>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListenEnvelope {
    #[serde(rename = "type")]
    kind: String,
    msg: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    id: u64,
    conversation_id: String,
    channel: RawChannel,
    sender: RawSender,
    content: RawContent,
}

#[derive(Debug, Deserialize)]
struct RawChannel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawSender {
    username: String,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(rename = "type")]
    kind: String,
    text: Option<RawText>,
}

#[derive(Debug, Deserialize)]
struct RawText {
    body: String,
}

impl KeybaseChat {
    pub async fn start(params: &ChatConnectParams) -> Result<Self> {
        let mut chat = Self {
            location: params.location.clone(),
            home: params.home.clone(),
            username: String::new(),
        };
        chat.username = chat.status().await?;
        info!(username = %chat.username, "Connected to keybase");
        Ok(chat)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.location);
        if let Some(home) = &self.home {
            cmd.arg("--home").arg(home);
        }
        cmd.kill_on_drop(true);
        cmd
    }

    async fn status(&self) -> Result<String> {
        let output = self
            .command()
            .args(["status", "--json"])
            .output()
            .await
            .map_err(|e| BotError::Connection(format!("failed to run {}: {}", self.location, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BotError::Connection(format!(
                "keybase status failed: {}",
                stderr.trim()
            )));
        }

        let status: StatusOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| BotError::Connection(format!("unreadable keybase status: {}", e)))?;
        if !status.logged_in || status.username.is_empty() {
            return Err(BotError::Connection("keybase is not logged in".to_string()));
        }
        Ok(status.username)
    }

    async fn api_call(&self, method: &str, options: Value) -> Result<Value> {
        let payload = json!({ "method": method, "params": { "options": options } });
        debug!("Chat API call: {}", method);

        let mut cmd = self.command();
        cmd.args(["chat", "api", "-m"]).arg(payload.to_string());

        let output = timeout(API_CALL_TIMEOUT, cmd.output())
            .await
            .map_err(|_| BotError::Chat(format!("{} timed out", method)))?
            .map_err(|e| BotError::Chat(format!("{} could not run: {}", method, e)))?;

        if !output.status.success() && output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BotError::Chat(format!("{} failed: {}", method, stderr.trim())));
        }

        parse_api_response(method, &output.stdout)
    }
}

#[async_trait]
impl ChatTransport for KeybaseChat {
    async fn advertise_commands(&self, advertisement: &Advertisement) -> Result<()> {
        let options = serde_json::to_value(advertisement)
            .map_err(|e| BotError::Advertisement(e.to_string()))?;
        self.api_call("advertisecommands", options)
            .await
            .map_err(|e| BotError::Advertisement(e.to_string()))?;
        Ok(())
    }

    async fn send_message(&self, target: &ChatTarget, body: &str) -> Result<()> {
        let mut options = target.to_options();
        options["message"] = json!({ "body": body });
        self.api_call("send", options).await?;
        Ok(())
    }

    async fn listen(&self, handler: Arc<dyn ChatHandler>) -> Result<()> {
        let mut child = self
            .command()
            .args(["chat", "api-listen"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| BotError::Connection(format!("failed to start api-listen: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BotError::Connection("api-listen has no stdout".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();

        info!("Listening for chat messages as {}", self.username);
        while let Some(line) = lines.next_line().await? {
            let Some(message) = parse_listen_line(&line) else {
                continue;
            };
            if message.sender == self.username {
                continue;
            }

            debug!(
                conversation = %message.conversation_id,
                sender = %message.sender,
                "Chat message received"
            );
            if let Err(e) = handler.handle_message(&message).await {
                warn!("Handler failed for message {}: {}", message.id, e);
            }
        }

        let status = child.wait().await?;
        Err(BotError::Connection(format!(
            "chat listener exited: {}",
            status
        )))
    }
}

fn parse_api_response(method: &str, stdout: &[u8]) -> Result<Value> {
    let response: ApiResponse = serde_json::from_slice(stdout)
        .map_err(|e| BotError::Chat(format!("{} returned unreadable output: {}", method, e)))?;

    if let Some(error) = response.error {
        return Err(BotError::Chat(format!(
            "{} failed ({}): {}",
            method, error.code, error.message
        )));
    }
    Ok(response.result.unwrap_or(Value::Null))
}

/// Extracts a text message from one `api-listen` line. Anything else
/// (joins, reactions, edits, malformed lines) yields `None`.
fn parse_listen_line(line: &str) -> Option<ChatMessage> {
    let envelope: ListenEnvelope = serde_json::from_str(line).ok()?;
    if envelope.kind != "chat" {
        return None;
    }
    let msg = envelope.msg?;
    if msg.content.kind != "text" {
        return None;
    }
    let text = msg.content.text?;

    Some(ChatMessage {
        id: msg.id,
        conversation_id: msg.conversation_id,
        channel_name: msg.channel.name,
        sender: msg.sender.username,
        body: text.body,
    })
}
