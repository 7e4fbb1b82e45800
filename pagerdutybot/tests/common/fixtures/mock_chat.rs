//! Recording chat transport

use async_trait::async_trait;
use base::chat::{
    Advertisement, ChatConnectParams, ChatConnector, ChatHandler, ChatTarget, ChatTransport,
};
use base::{BotError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub enum ListenBehavior {
    Forever,
    Fail(String),
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

    async fn listen(&self, _handler: Arc<dyn ChatHandler>) -> Result<()> {
        self.listens.fetch_add(1, Ordering::SeqCst);
        match &self.listen {
            ListenBehavior::Forever => std::future::pending().await,
            ListenBehavior::Fail(reason) => Err(BotError::Connection(reason.clone())),
        }
    }
}

pub struct MockConnector {
    chat: Arc<MockChat>,
    connects: AtomicUsize,
}

impl MockConnector {
    pub fn new(chat: Arc<MockChat>) -> Self {
        Self {
            chat,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatConnector for MockConnector {
    async fn connect(&self, _params: &ChatConnectParams) -> Result<Arc<dyn ChatTransport>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.chat.clone())
    }
}
