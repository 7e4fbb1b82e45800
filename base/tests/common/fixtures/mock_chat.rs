//! In-memory chat transport for testing the bot runtime
//!
//! Records everything the bot advertises and sends, and lets tests script
//! how `listen` behaves.

use async_trait::async_trait;
use base::chat::{
    Advertisement, ChatConnectParams, ChatConnector, ChatHandler, ChatMessage, ChatTarget,
    ChatTransport,
};
use base::{BotError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// What `listen` does once called
#[derive(Debug, Clone)]
pub enum ListenBehavior {
    /// Never returns on its own
    Forever,
    /// Returns immediately with a connection error
    Fail(String),
    /// Delivers the messages, then keeps the connection open
    Deliver(Vec<ChatMessage>),
}

pub struct MockChat {
    listen: ListenBehavior,
    fail_advertise: bool,
    fail_send_to: Vec<ChatTarget>,
    advertised: Mutex<Vec<Advertisement>>,
    sent: Mutex<Vec<(ChatTarget, String)>>,
    listens: AtomicUsize,
}

impl MockChat {
    pub fn new(listen: ListenBehavior) -> Self {
        Self {
            listen,
            fail_advertise: false,
            fail_send_to: Vec::new(),
            advertised: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            listens: AtomicUsize::new(0),
        }
    }

    pub fn failing_advertise(mut self) -> Self {
        self.fail_advertise = true;
        self
    }

    /// Sends to `target` fail; other targets still succeed
    pub fn failing_send_to(mut self, target: &str) -> Self {
        self.fail_send_to.push(ChatTarget::parse(target));
        self
    }

    pub async fn advertised(&self) -> Vec<Advertisement> {
        self.advertised.lock().await.clone()
    }

    pub async fn sent(&self) -> Vec<(ChatTarget, String)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, target: &str) -> Vec<String> {
        let target = ChatTarget::parse(target);
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(t, _)| *t == target)
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub fn listen_count(&self) -> usize {
        self.listens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for MockChat {
    async fn advertise_commands(&self, advertisement: &Advertisement) -> Result<()> {
        if self.fail_advertise {
            return Err(BotError::Advertisement("commands rejected".to_string()));
        }
        self.advertised.lock().await.push(advertisement.clone());
        Ok(())
    }

    async fn send_message(&self, target: &ChatTarget, body: &str) -> Result<()> {
        if self.fail_send_to.contains(target) {
            return Err(BotError::Chat(format!("cannot send to {}", target)));
        }
        self.sent.lock().await.push((target.clone(), body.to_string()));
        Ok(())
    }

    async fn listen(&self, handler: Arc<dyn ChatHandler>) -> Result<()> {
        self.listens.fetch_add(1, Ordering::SeqCst);
        match &self.listen {
            ListenBehavior::Forever => std::future::pending().await,
            ListenBehavior::Fail(reason) => Err(BotError::Connection(reason.clone())),
            ListenBehavior::Deliver(messages) => {
                for message in messages {
                    handler.handle_message(message).await?;
                }
                std::future::pending().await
            }
        }
    }
}

/// Connector handing out a shared [`MockChat`]
pub struct MockConnector {
    chat: Arc<MockChat>,
    fail: bool,
    connects: AtomicUsize,
    last_params: Mutex<Option<ChatConnectParams>>,
}

impl MockConnector {
    pub fn new(chat: Arc<MockChat>) -> Self {
        Self {
            chat,
            fail: false,
            connects: AtomicUsize::new(0),
            last_params: Mutex::new(None),
        }
    }

    pub fn unreachable() -> Self {
        let mut connector = Self::new(Arc::new(MockChat::new(ListenBehavior::Forever)));
        connector.fail = true;
        connector
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub async fn last_params(&self) -> Option<ChatConnectParams> {
        self.last_params.lock().await.clone()
    }
}

#[async_trait]
impl ChatConnector for MockConnector {
    async fn connect(&self, params: &ChatConnectParams) -> Result<Arc<dyn ChatTransport>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().await = Some(params.clone());
        if self.fail {
            return Err(BotError::Connection("keybase is not running".to_string()));
        }
        Ok(self.chat.clone())
    }
}
