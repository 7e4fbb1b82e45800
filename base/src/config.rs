// File: base/src/config.rs
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::chat::ChatConnectParams;
use crate::errors::{BotError, Result};

const DEFAULT_KEYBASE_LOCATION: &str = "keybase";

/// Options every bot accepts. Command-line flags win over environment
/// variables, which win over the optional TOML options file.
#[derive(Debug, Clone, Args)]
pub struct BaseOptions {
    /// Path to the keybase binary
    #[arg(long = "keybase-bin-path", env = "KEYBASE_BIN")]
    pub keybase_location: Option<String>,

    /// Keybase home directory
    #[arg(long, env = "KEYBASE_HOME")]
    pub home: Option<String>,

    /// Conversation to announce the bot in on startup
    #[arg(long, env = "BOT_ANNOUNCEMENT")]
    pub announcement: Option<String>,

    /// Conversation receiving error reports
    #[arg(long = "err-report-conv", env = "BOT_ERR_REPORT_CONV")]
    pub err_report_conv: Option<String>,

    /// Database connection string
    #[arg(long, env = "BOT_DSN")]
    pub dsn: Option<String>,

    /// AWS region of the CloudWatch log group
    #[arg(long = "aws-region", env = "BOT_AWS_REGION")]
    pub aws_region: Option<String>,

    /// CloudWatch log group the bot writes to
    #[arg(long = "cloudwatch-log-group", env = "BOT_CLOUDWATCH_LOG_GROUP")]
    pub cloudwatch_log_group: Option<String>,

    /// TOML file providing defaults for any option above
    #[arg(long, env = "BOT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// On-disk form of [`BaseOptions`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileOptions {
    pub keybase_location: Option<String>,
    pub home: Option<String>,
    pub announcement: Option<String>,
    pub err_report_conv: Option<String>,
    pub dsn: Option<String>,
    pub aws_region: Option<String>,
    pub cloudwatch_log_group: Option<String>,
}

/// Where the bot's own diagnostic logs live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsOptions {
    pub region: String,
    pub log_group: String,
}

impl BaseOptions {
    /// Fill unset options from the `--config` file, if one was given
    pub async fn load_file(mut self) -> Result<Self> {
        let Some(path) = self.config.clone() else {
            return Ok(self);
        };
        let file = read_options_file(&path).await?;
        self.merge(file);
        info!("Options loaded from {}", path.display());
        Ok(self)
    }

    pub fn merge(&mut self, file: FileOptions) {
        fill(&mut self.keybase_location, file.keybase_location);
        fill(&mut self.home, file.home);
        fill(&mut self.announcement, file.announcement);
        fill(&mut self.err_report_conv, file.err_report_conv);
        fill(&mut self.dsn, file.dsn);
        fill(&mut self.aws_region, file.aws_region);
        fill(&mut self.cloudwatch_log_group, file.cloudwatch_log_group);
    }

    pub fn validate(&self) -> Result<()> {
        if self.dsn().is_empty() {
            return Err(BotError::Configuration(
                "must specify a database DSN".to_string(),
            ));
        }
        match (non_empty(&self.aws_region), non_empty(&self.cloudwatch_log_group)) {
            (Some(_), None) => Err(BotError::Configuration(
                "--aws-region requires --cloudwatch-log-group".to_string(),
            )),
            (None, Some(_)) => Err(BotError::Configuration(
                "--cloudwatch-log-group requires --aws-region".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn keybase_location(&self) -> &str {
        non_empty(&self.keybase_location).unwrap_or(DEFAULT_KEYBASE_LOCATION)
    }

    pub fn dsn(&self) -> &str {
        self.dsn.as_deref().unwrap_or("")
    }

    pub fn connect_params(&self) -> ChatConnectParams {
        ChatConnectParams {
            location: self.keybase_location().to_string(),
            home: non_empty(&self.home).map(str::to_string),
            err_report_conv: non_empty(&self.err_report_conv).map(str::to_string),
        }
    }

    pub fn aws(&self) -> Option<AwsOptions> {
        let region = non_empty(&self.aws_region)?;
        let log_group = non_empty(&self.cloudwatch_log_group)?;
        Some(AwsOptions {
            region: region.to_string(),
            log_group: log_group.to_string(),
        })
    }
}

async fn read_options_file(path: &Path) -> Result<FileOptions> {
    debug!("Reading options file: {}", path.display());
    let content = fs::read_to_string(path).await.map_err(|e| {
        BotError::Configuration(format!("failed to read {}: {}", path.display(), e))
    })?;
    toml::from_str(&content).map_err(|e| {
        BotError::Configuration(format!("failed to parse {}: {}", path.display(), e))
    })
}

fn fill(target: &mut Option<String>, fallback: Option<String>) {
    if non_empty(target).is_none() {
        if let Some(value) = fallback {
            *target = Some(value);
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
