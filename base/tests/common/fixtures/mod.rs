//! This module provides reusable test utilities:
//! - In-memory chat transport and connector
//! - Scripted remote log service
//! - Option builders

// Allow unused code in test fixtures - not every test binary uses all of them
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_chat;
pub mod mock_logs;
pub mod test_options;

pub use mock_chat::{ListenBehavior, MockChat, MockConnector};
pub use mock_logs::MockLogService;
pub use test_options::test_options;
