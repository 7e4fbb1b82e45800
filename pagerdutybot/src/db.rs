// File: pagerdutybot/src/db.rs
use base::{Database, Result};
use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

/// A webhook bound to the conversation that requested it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    pub id: String,
    pub conv_id: String,
    pub ctime: DateTime<Utc>,
}

/// Webhook registry stored alongside the bot's other state
#[derive(Clone, Debug)]
pub struct PagerDutyDb {
    database: Database,
}

impl PagerDutyDb {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS webhooks (
                id TEXT PRIMARY KEY,
                conv_id TEXT NOT NULL,
                ctime DATETIME NOT NULL
            )
            "#,
        )
        .execute(self.database.pool())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_webhooks_conv ON webhooks(conv_id)")
            .execute(self.database.pool())
            .await?;

        debug!("Webhook table initialized");
        Ok(())
    }

    /// Registers a new webhook for `conv_id` and returns its id
    pub async fn create_webhook(&self, conv_id: &str) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        sqlx::query("INSERT INTO webhooks (id, conv_id, ctime) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(conv_id)
            .bind(Utc::now())
            .execute(self.database.pool())
            .await?;

        info!("Created webhook {} for conversation {}", id, conv_id);
        Ok(id)
    }

    pub async fn get_webhook(&self, id: &str) -> Result<Option<Webhook>> {
        let row = sqlx::query("SELECT id, conv_id, ctime FROM webhooks WHERE id = ?")
            .bind(id)
            .fetch_optional(self.database.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(Webhook {
                id: row.try_get("id")?,
                conv_id: row.try_get("conv_id")?,
                ctime: row.try_get("ctime")?,
            })),
            None => Ok(None),
        }
    }

    pub async fn get_webhook_conv(&self, id: &str) -> Result<Option<String>> {
        Ok(self.get_webhook(id).await?.map(|hook| hook.conv_id))
    }
}
