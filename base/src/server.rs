// File: base/src/server.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::chat::{Advertisement, ChatConnector, ChatHandler, ChatTarget, ChatTransport};
use crate::config::BaseOptions;
use crate::constants::logs::{REPORT_FETCH_TIMEOUT, REPORT_TAIL_LINES};
use crate::constants::shutdown::GRACE_PERIOD;
use crate::debug::DebugOutput;
use crate::errors::{BotError, Result};
use crate::group::ServiceGroup;
use crate::logs::{fetch_latest, CloudWatchLogService, LogService};
use crate::shutdown::Shutdown;
use crate::signals::{handle_signals, WebhookService};

/// Where failure reports read the bot's own latest log lines from
#[derive(Clone)]
struct LogSource {
    service: Arc<dyn LogService>,
    log_group: String,
}

/// Runtime shared by every bot: a connected chat transport, diagnostics and
/// the coordination of the bot's long-running services.
#[derive(Clone)]
pub struct Server {
    name: String,
    chat: Arc<dyn ChatTransport>,
    debug: DebugOutput,
    announcement: Option<ChatTarget>,
    log_source: Option<LogSource>,
    log_timeout: Duration,
    shutdown: Shutdown,
    grace: Duration,
}

impl Server {
    /// Attaches to the chat service. Failure is a connection error.
    pub async fn start(
        name: &str,
        connector: &dyn ChatConnector,
        options: &BaseOptions,
    ) -> Result<Self> {
        let params = options.connect_params();
        let chat = connector.connect(&params).await.map_err(|e| match e {
            BotError::Connection(_) => e,
            other => BotError::Connection(other.to_string()),
        })?;
        info!("{} connected to chat via {}", name, params.location);

        let debug = DebugOutput::new(name, chat.clone(), params.err_report_conv.as_deref());

        let log_source = match options.aws() {
            Some(aws) => match CloudWatchLogService::connect(&aws.region).await {
                Ok(service) => Some(LogSource {
                    service: Arc::new(service),
                    log_group: aws.log_group,
                }),
                Err(e) => {
                    warn!("Failure reports will not include logs: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            chat,
            debug,
            announcement: options
                .announcement
                .as_deref()
                .filter(|a| !a.trim().is_empty())
                .map(ChatTarget::parse),
            log_source,
            log_timeout: REPORT_FETCH_TIMEOUT,
            shutdown: Shutdown::new(),
            grace: GRACE_PERIOD,
        })
    }

    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Reads failure-report log lines from `service` instead of CloudWatch
    pub fn with_log_source(mut self, service: Arc<dyn LogService>, log_group: &str) -> Self {
        self.log_source = Some(LogSource {
            service,
            log_group: log_group.to_string(),
        });
        self
    }

    pub fn with_log_timeout(mut self, log_timeout: Duration) -> Self {
        self.log_timeout = log_timeout;
        self
    }

    pub fn chat(&self) -> Arc<dyn ChatTransport> {
        self.chat.clone()
    }

    pub fn debug_output(&self) -> DebugOutput {
        self.debug.clone()
    }

    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Registers the bot's commands. Failures are mirrored to the error
    /// report conversation before being returned.
    pub async fn advertise(&self, advertisement: &Advertisement) -> Result<()> {
        if let Err(e) = self.chat.advertise_commands(advertisement).await {
            self.debug.error(&format!("advertise error: {}", e)).await;
            return Err(match e {
                BotError::Advertisement(_) => e,
                other => BotError::Advertisement(other.to_string()),
            });
        }
        info!("Advertised commands for {}", advertisement.alias);
        Ok(())
    }

    /// Sends `message` to the announcement conversation, if configured.
    pub async fn send_announcement(&self, message: &str) -> Result<()> {
        let Some(target) = &self.announcement else {
            return Ok(());
        };
        self.chat
            .send_message(target, message)
            .await
            .map_err(|e| BotError::Announcement(e.to_string()))?;
        info!("Announced {} in {}", self.name, target);
        Ok(())
    }

    /// Dispatches chat messages to `handler` until the connection ends or
    /// shutdown is triggered.
    pub async fn listen(&self, handler: Arc<dyn ChatHandler>) -> Result<()> {
        tokio::select! {
            result = self.chat.listen(handler) => result,
            _ = self.shutdown.wait() => {
                info!("Chat listener stopped");
                Ok(())
            }
        }
    }

    pub async fn handle_signals(&self, service: Arc<dyn WebhookService>) -> Result<()> {
        handle_signals(service, self.shutdown.clone()).await
    }

    /// Runs the chat listener, the webhook server and the signal watcher
    /// until all of them finish, returning the first failure.
    pub async fn run(
        &self,
        handler: Arc<dyn ChatHandler>,
        webhook: Arc<dyn WebhookService>,
    ) -> Result<()> {
        let mut group = ServiceGroup::new(self.shutdown.clone()).with_grace_period(self.grace);

        let listener = self.clone();
        group.spawn("chat listener", async move { listener.listen(handler).await });

        let server = webhook.clone();
        group.spawn("webhook server", async move { server.listen().await });

        let watcher = self.clone();
        group.spawn("signal watcher", async move {
            watcher.handle_signals(webhook).await
        });

        info!("{} running {} services", self.name, group.len());
        if let Err(e) = group.wait().await {
            self.debug.debug(&format!("wait error: {}", e));
            self.report_failure(&e).await;
            return Err(e);
        }

        info!("{} shut down cleanly", self.name);
        Ok(())
    }

    /// Best-effort failure report with the tail of the bot's own logs.
    pub async fn report_failure(&self, err: &BotError) {
        let mut report = format!("error running bot: {}", err);

        if let Some(source) = &self.log_source {
            let fetch = fetch_latest(source.service.as_ref(), &source.log_group);
            match timeout(self.log_timeout, fetch).await {
                Ok(Ok(lines)) => {
                    let tail = &lines[lines.len().saturating_sub(REPORT_TAIL_LINES)..];
                    if !tail.is_empty() {
                        report.push_str("\n```\n");
                        report.push_str(&tail.join("\n"));
                        report.push_str("\n```");
                    }
                }
                Ok(Err(e)) => warn!("Unable to fetch latest logs for failure report: {}", e),
                Err(_) => warn!(
                    "Fetching latest logs timed out after {:?}, reporting without them",
                    self.log_timeout
                ),
            }
        }

        self.debug.report(&report).await;
    }
}
