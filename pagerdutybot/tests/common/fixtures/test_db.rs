//! Database builders for tests

use base::Database;
use pagerdutybot::db::PagerDutyDb;
use std::path::Path;

/// Points into a directory that does not exist, so opening always fails
pub const UNOPENABLE_DSN: &str = "sqlite:/nonexistent-pagerdutybot-dir/sub/bot.db?mode=rwc";

pub async fn memory_db() -> PagerDutyDb {
    let db = PagerDutyDb::new(Database::open("sqlite::memory:").await.unwrap());
    db.ensure_schema().await.unwrap();
    db
}

/// DSN creating `bot.db` inside `dir`
pub fn file_dsn(dir: &Path) -> String {
    format!("sqlite:{}?mode=rwc", dir.join("bot.db").display())
}
