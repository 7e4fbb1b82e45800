//! Scripted remote log service

use async_trait::async_trait;
use base::logs::{
    DescribeStreamsRequest, GetEventsRequest, LogEventRecord, LogService, LogStreamInfo,
};
use base::{BotError, Result};
use std::sync::Mutex;

pub struct MockLogService {
    streams: Vec<LogStreamInfo>,
    events: Vec<Option<LogEventRecord>>,
    fail_describe: Option<String>,
    hang: bool,
    describe_requests: Mutex<Vec<DescribeStreamsRequest>>,
    event_requests: Mutex<Vec<GetEventsRequest>>,
}

impl MockLogService {
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
            events: Vec::new(),
            fail_describe: None,
            hang: false,
            describe_requests: Mutex::new(Vec::new()),
            event_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_stream(mut self, name: Option<&str>) -> Self {
        self.streams.push(LogStreamInfo {
            name: name.map(str::to_string),
        });
        self
    }

    pub fn with_event(mut self, message: Option<&str>) -> Self {
        self.events.push(Some(LogEventRecord {
            message: message.map(str::to_string),
        }));
        self
    }

    /// Adds a hole in the delivered batch
    pub fn with_missing_event(mut self) -> Self {
        self.events.push(None);
        self
    }

    pub fn failing_describe(mut self, reason: &str) -> Self {
        self.fail_describe = Some(reason.to_string());
        self
    }

    /// Never answers, like an unreachable endpoint
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn describe_requests(&self) -> Vec<DescribeStreamsRequest> {
        self.describe_requests.lock().unwrap().clone()
    }

    pub fn event_requests(&self) -> Vec<GetEventsRequest> {
        self.event_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogService for MockLogService {
    async fn describe_log_streams(
        &self,
        request: &DescribeStreamsRequest,
    ) -> Result<Vec<LogStreamInfo>> {
        self.describe_requests.lock().unwrap().push(request.clone());
        if self.hang {
            std::future::pending::<()>().await;
        }
        if let Some(reason) = &self.fail_describe {
            return Err(BotError::LogService(reason.clone()));
        }
        Ok(self.streams.clone())
    }

    async fn get_log_events(
        &self,
        request: &GetEventsRequest,
    ) -> Result<Vec<Option<LogEventRecord>>> {
        self.event_requests.lock().unwrap().push(request.clone());
        Ok(self.events.clone())
    }
}
