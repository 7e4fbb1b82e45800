// File: pagerdutybot/src/options.rs
use base::{BaseOptions, Result};
use clap::Parser;

pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Command-line options of the PagerDuty bot
#[derive(Debug, Clone, Parser)]
#[command(name = "pagerdutybot", version, about = "Forwards PagerDuty webhooks into chat")]
pub struct Options {
    #[command(flatten)]
    pub base: BaseOptions,

    /// Desired prefix for generated webhooks
    #[arg(long = "http-prefix", env = "BOT_HTTP_PREFIX", default_value = "")]
    pub http_prefix: String,

    /// Address the webhook server listens on
    #[arg(long = "http-addr", env = "BOT_HTTP_ADDR", default_value = DEFAULT_HTTP_ADDR)]
    pub http_addr: String,
}

impl Options {
    pub async fn load_file(mut self) -> Result<Self> {
        self.base = self.base.load_file().await?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.base.validate()
    }
}

pub fn webhook_url(prefix: &str, id: &str) -> String {
    format!("{}/pagerdutybot/{}", prefix.trim_end_matches('/'), id)
}
