// File: pagerdutybot/src/bot.rs
use base::chat::{
    Advertisement, BotCommand, ChatConnector, CommandAdvertisement, ExtendedDescription,
};
use base::constants::chat::LIVENESS_MESSAGE;
use base::{with_database, BotError, Database, Result, Server};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::db::PagerDutyDb;
use crate::handler::Handler;
use crate::http::HttpSrv;
use crate::options::Options;

pub const BOT_NAME: &str = "pagerdutybot";

/// The PagerDuty bot process
pub struct BotServer {
    opts: Options,
    connector: Arc<dyn ChatConnector>,
    grace: Option<Duration>,
}

impl BotServer {
    pub fn new(opts: Options, connector: Arc<dyn ChatConnector>) -> Self {
        Self {
            opts,
            connector,
            grace: None,
        }
    }

    /// Overrides how long siblings get to finish after a failure
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = Some(grace);
        self
    }

    pub fn make_advertisement() -> Advertisement {
        let integrate_extended = "Create a new webhook URL for receiving events from PagerDuty \
             in the current conversation.\n\n\tExample:```\n\t\t!pagerduty integrate```"
            .to_string();

        Advertisement {
            alias: "PagerDuty".to_string(),
            advertisements: vec![CommandAdvertisement {
                typ: "public".to_string(),
                commands: vec![BotCommand {
                    name: "pagerduty integrate".to_string(),
                    description: "Create a new PagerDuty webhook for the current conversation"
                        .to_string(),
                    extended_description: Some(ExtendedDescription {
                        title: "*!pagerduty integrate*\nCreate a PagerDuty webhook".to_string(),
                        desktop_body: integrate_extended.clone(),
                        mobile_body: integrate_extended,
                    }),
                }],
            }],
        }
    }

    /// Connects, opens the database and runs the bot until shutdown or the
    /// first service failure.
    pub async fn go(&self) -> Result<()> {
        let mut server = Server::start(BOT_NAME, self.connector.as_ref(), &self.opts.base).await?;
        if let Some(grace) = self.grace {
            server = server.with_grace_period(grace);
        }

        let result = with_database(self.opts.base.dsn(), |db| self.serve(&server, db)).await;
        if let Err(e) = &result {
            if matches!(e, BotError::Storage(_)) {
                server
                    .debug_output()
                    .error(&format!("database error: {}", e))
                    .await;
            }
        }
        result
    }

    async fn serve(&self, server: &Server, database: Database) -> Result<()> {
        let db = PagerDutyDb::new(database);
        db.ensure_schema().await?;

        server.advertise(&Self::make_advertisement()).await?;

        if let Err(e) = server.send_announcement(LIVENESS_MESSAGE).await {
            if e.is_fatal() {
                return Err(e);
            }
            server
                .debug_output()
                .error(&format!("failed to announce self: {}", e))
                .await;
        }

        let debug = server.debug_output();
        let http = Arc::new(HttpSrv::new(
            &self.opts.http_addr,
            db.clone(),
            server.chat(),
            debug.clone(),
        ));
        let handler = Arc::new(Handler::new(
            server.chat(),
            debug,
            db,
            &self.opts.http_prefix,
        ));

        info!("{} starting services", BOT_NAME);
        server.run(handler, http).await
    }
}
