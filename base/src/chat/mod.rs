//! Chat transport seam
//!
//! The bot only needs four capabilities from its chat client: connect,
//! advertise commands, send a message and listen for incoming messages.
//! `keybase` implements them on top of the keybase CLI; tests provide
//! in-memory versions.

pub mod keybase;
mod types;

pub use keybase::{KeybaseChat, KeybaseConnector};
pub use types::{
    Advertisement, BotCommand, ChatMessage, ChatTarget, CommandAdvertisement,
    ExtendedDescription,
};

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::Result;

/// Parameters needed to attach to the chat service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConnectParams {
    pub location: String,
    pub home: Option<String>,
    pub err_report_conv: Option<String>,
}

#[async_trait]
pub trait ChatConnector: Send + Sync {
    async fn connect(&self, params: &ChatConnectParams) -> Result<Arc<dyn ChatTransport>>;
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn advertise_commands(&self, advertisement: &Advertisement) -> Result<()>;

    async fn send_message(&self, target: &ChatTarget, body: &str) -> Result<()>;

    /// Blocks until the underlying connection ends
    async fn listen(&self, handler: Arc<dyn ChatHandler>) -> Result<()>;
}

#[async_trait]
pub trait ChatHandler: Send + Sync {
    async fn handle_message(&self, message: &ChatMessage) -> Result<()>;
}
