//! Shared runtime for chat bots: option handling, the chat transport,
//! service orchestration, scoped database access and remote log retrieval.

pub mod chat;
pub mod config;
pub mod constants;
pub mod database;
pub mod debug;
pub mod errors;
pub mod group;
pub mod logs;
pub mod server;
pub mod shutdown;
pub mod signals;

// Re-export commonly used types
pub use config::{AwsOptions, BaseOptions};
pub use database::{with_database, Database};
pub use debug::DebugOutput;
pub use errors::{BotError, Result};
pub use group::ServiceGroup;
pub use server::Server;
pub use shutdown::Shutdown;
pub use signals::WebhookService;
