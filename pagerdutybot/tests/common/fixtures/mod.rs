//! Shared test utilities for the PagerDuty bot:
//! - Recording chat transport and connector
//! - Database builders

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_chat;
pub mod test_db;

pub use mock_chat::{ListenBehavior, MockChat, MockConnector};
pub use test_db::{file_dsn, memory_db, UNOPENABLE_DSN};
