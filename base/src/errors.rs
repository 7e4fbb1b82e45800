//! Error types shared by every bot built on `base`
//!
//! Each variant maps to one failure class of the bot runtime so callers can
//! decide what is fatal (everything except `Announcement`) without string
//! matching.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or invalid settings, detected before any service starts
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Chat transport or remote log service could not be reached
    #[error("connection error: {0}")]
    Connection(String),

    /// Outbound request to the remote log service is malformed
    #[error("invalid request: {0}")]
    Validation(String),

    /// Log stream or events absent or ambiguous
    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Bot command registration rejected by the chat transport
    #[error("advertise error: {0}")]
    Advertisement(String),

    /// Liveness announcement could not be delivered
    #[error("announcement error: {0}")]
    Announcement(String),

    /// Chat API call failed after the transport was connected
    #[error("chat error: {0}")]
    Chat(String),

    /// Remote log service rejected or failed a request
    #[error("log service error: {0}")]
    LogService(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task panicked: {0}")]
    Panicked(String),

    /// First failure reported by a member of a service group
    #[error("{service} failed: {source}")]
    ServiceFailure {
        service: String,
        #[source]
        source: Box<BotError>,
    },
}

impl BotError {
    pub fn service_failure(service: &str, source: BotError) -> Self {
        BotError::ServiceFailure {
            service: service.to_string(),
            source: Box::new(source),
        }
    }

    /// Only a failed announcement is tolerated during startup
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BotError::Announcement(_))
    }
}
