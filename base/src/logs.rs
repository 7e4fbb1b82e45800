//! Retrieval of the bot's most recent diagnostic log lines
//!
//! The latest stream of a log group is the one with the most recent event.
//! Exactly one such stream must come back; an empty or ambiguous answer is
//! an error rather than a guess. Every request is validated before it is
//! sent and nothing is retried.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::types::OrderBy;
use aws_sdk_cloudwatchlogs::Client;
use tracing::debug;

use crate::constants::logs::{LATEST_STREAM_LIMIT, MAX_NAME_LENGTH, MAX_STREAM_LIMIT};
use crate::errors::{BotError, Result};

/// Stream ordering supported by the remote log service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOrder {
    LastEventTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeStreamsRequest {
    pub log_group_name: String,
    pub order_by: StreamOrder,
    pub descending: bool,
    pub limit: i32,
}

impl DescribeStreamsRequest {
    /// Request for the single most recently active stream of `log_group_name`
    pub fn latest(log_group_name: &str) -> Self {
        Self {
            log_group_name: log_group_name.to_string(),
            order_by: StreamOrder::LastEventTime,
            descending: true,
            limit: LATEST_STREAM_LIMIT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_group_name(&self.log_group_name)?;
        if !(1..=MAX_STREAM_LIMIT).contains(&self.limit) {
            return Err(BotError::Validation(format!(
                "limit must be between 1 and {}, got {}",
                MAX_STREAM_LIMIT, self.limit
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetEventsRequest {
    pub log_group_name: String,
    pub log_stream_name: String,
}

impl GetEventsRequest {
    pub fn validate(&self) -> Result<()> {
        validate_group_name(&self.log_group_name)?;
        let name = &self.log_stream_name;
        if name.is_empty() || name.len() > MAX_NAME_LENGTH {
            return Err(BotError::Validation(format!(
                "log stream name must be 1 to {} characters",
                MAX_NAME_LENGTH
            )));
        }
        if name.contains(':') || name.contains('*') {
            return Err(BotError::Validation(format!(
                "log stream name {:?} contains ':' or '*'",
                name
            )));
        }
        Ok(())
    }
}

/// A log stream as described by the remote service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogStreamInfo {
    pub name: Option<String>,
}

/// A log event as delivered by the remote service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEventRecord {
    pub message: Option<String>,
}

/// Region-scoped remote log service.
///
/// Events come back as `Option`s because the service may deliver holes in a
/// batch; [`fetch_latest`] skips them.
#[async_trait]
pub trait LogService: Send + Sync {
    async fn describe_log_streams(
        &self,
        request: &DescribeStreamsRequest,
    ) -> Result<Vec<LogStreamInfo>>;

    async fn get_log_events(&self, request: &GetEventsRequest)
        -> Result<Vec<Option<LogEventRecord>>>;
}

/// CloudWatch Logs backend
pub struct CloudWatchLogService {
    client: Client,
}

impl CloudWatchLogService {
    pub async fn connect(region: &str) -> Result<Self> {
        let region = region.trim();
        if region.is_empty() {
            return Err(BotError::Connection(
                "a region is required to reach CloudWatch Logs".to_string(),
            ));
        }

        // Failures surface to the caller as-is; the SDK must not retry them.
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .retry_config(RetryConfig::disabled())
            .load()
            .await;
        debug!(region, "CloudWatch Logs client configured");

        Ok(Self {
            client: Client::new(&config),
        })
    }
}

#[async_trait]
impl LogService for CloudWatchLogService {
    async fn describe_log_streams(
        &self,
        request: &DescribeStreamsRequest,
    ) -> Result<Vec<LogStreamInfo>> {
        let order_by = match request.order_by {
            StreamOrder::LastEventTime => OrderBy::LastEventTime,
        };

        let output = self
            .client
            .describe_log_streams()
            .log_group_name(&request.log_group_name)
            .order_by(order_by)
            .descending(request.descending)
            .limit(request.limit)
            .send()
            .await
            .map_err(|e| BotError::LogService(DisplayErrorContext(&e).to_string()))?;

        Ok(output
            .log_streams()
            .iter()
            .map(|stream| LogStreamInfo {
                name: stream.log_stream_name().map(str::to_string),
            })
            .collect())
    }

    async fn get_log_events(
        &self,
        request: &GetEventsRequest,
    ) -> Result<Vec<Option<LogEventRecord>>> {
        let output = self
            .client
            .get_log_events()
            .log_group_name(&request.log_group_name)
            .log_stream_name(&request.log_stream_name)
            .send()
            .await
            .map_err(|e| BotError::LogService(DisplayErrorContext(&e).to_string()))?;

        Ok(output
            .events()
            .iter()
            .map(|event| {
                Some(LogEventRecord {
                    message: event.message().map(str::to_string),
                })
            })
            .collect())
    }
}

/// Latest non-empty log messages of `log_group_name`, in delivery order.
pub async fn fetch_latest<S>(service: &S, log_group_name: &str) -> Result<Vec<String>>
where
    S: LogService + ?Sized,
{
    let streams_request = DescribeStreamsRequest::latest(log_group_name);
    streams_request.validate()?;
    let streams = service.describe_log_streams(&streams_request).await?;

    let stream = match streams.as_slice() {
        [stream] => stream,
        _ => {
            return Err(BotError::NotFound(format!(
                "unable to find log groups. Found {} streams",
                streams.len()
            )))
        }
    };

    let stream_name = stream
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| BotError::NotFound(format!("unable to find valid stream {:?}", stream)))?;

    let events_request = GetEventsRequest {
        log_group_name: log_group_name.to_string(),
        log_stream_name: stream_name.to_string(),
    };
    events_request.validate()?;
    let events = service.get_log_events(&events_request).await?;

    let messages: Vec<String> = events
        .into_iter()
        .flatten()
        .filter_map(|event| event.message)
        .filter(|message| !message.is_empty())
        .collect();

    debug!(
        log_group = log_group_name,
        stream = stream_name,
        count = messages.len(),
        "Fetched latest log messages"
    );
    Ok(messages)
}

/// Connects to CloudWatch Logs in `region` and fetches the latest messages.
pub async fn get_latest_cloudwatch_logs(region: &str, log_group_name: &str) -> Result<Vec<String>> {
    let service = CloudWatchLogService::connect(region).await?;
    fetch_latest(&service, log_group_name).await
}

fn validate_group_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return Err(BotError::Validation(format!(
            "log group name must be 1 to {} characters",
            MAX_NAME_LENGTH
        )));
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '/' | '#'));
    if !valid {
        return Err(BotError::Validation(format!(
            "log group name {:?} contains invalid characters",
            name
        )));
    }
    Ok(())
}
