//! PagerDuty chat bot
//!
//! Users run `!pagerduty integrate` in a conversation to get a webhook URL;
//! events PagerDuty posts to that URL are forwarded into the conversation.

pub mod bot;
pub mod db;
pub mod handler;
pub mod http;
pub mod options;

pub use bot::BotServer;
pub use options::Options;

use base::chat::ChatConnector;
use base::constants::exit;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::sync::Arc;
use tracing::error;

/// Parses `args`, runs the bot and returns the process exit code
pub async fn run<I, T>(args: I, connector: Arc<dyn ChatConnector>) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let opts = match Options::try_parse_from(args) {
        Ok(opts) => opts,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{}", e);
            return exit::OK;
        }
        Err(e) => {
            println!("Unable to parse options: {}", e);
            return exit::CONFIGURATION_ERROR;
        }
    };

    let opts = match opts.load_file().await {
        Ok(opts) => opts,
        Err(e) => {
            println!("Unable to parse options: {}", e);
            return exit::CONFIGURATION_ERROR;
        }
    };

    if opts.base.dsn().is_empty() {
        println!("must specify a database DSN");
        return exit::CONFIGURATION_ERROR;
    }
    if let Err(e) = opts.validate() {
        println!("Unable to parse options: {}", e);
        return exit::CONFIGURATION_ERROR;
    }

    let bot = BotServer::new(opts, connector);
    if let Err(e) = bot.go().await {
        error!("Bot exited with error: {}", e);
        println!("error running chat loop: {}", e);
        return exit::CONFIGURATION_ERROR;
    }
    exit::OK
}
