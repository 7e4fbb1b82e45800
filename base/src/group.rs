//! Fork-join group for the bot's long-running services
//!
//! Every member runs on its own task. `wait` returns once all members
//! finished successfully, or as soon as the first one fails. In that case
//! the shared [`Shutdown`] is triggered so well-behaved siblings wind down,
//! stragglers are aborted after the grace period, and the first failure is
//! returned. Later failures are logged only.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::{Id, JoinError, JoinSet};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::constants::shutdown::GRACE_PERIOD;
use crate::errors::{BotError, Result};
use crate::shutdown::Shutdown;

pub struct ServiceGroup {
    tasks: JoinSet<Result<()>>,
    names: HashMap<Id, &'static str>,
    shutdown: Shutdown,
    grace: Duration,
}

impl ServiceGroup {
    pub fn new(shutdown: Shutdown) -> Self {
        Self {
            tasks: JoinSet::new(),
            names: HashMap::new(),
            shutdown,
            grace: GRACE_PERIOD,
        }
    }

    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn spawn<F>(&mut self, name: &'static str, service: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let handle = self.tasks.spawn(service);
        self.names.insert(handle.id(), name);
        debug!(service = name, "Service started");
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub async fn wait(mut self) -> Result<()> {
        let mut failure = None;

        while let Some(joined) = self.tasks.join_next_with_id().await {
            match self.outcome(joined) {
                (name, Ok(())) => info!(service = name, "Service finished"),
                (name, Err(e)) => {
                    warn!(service = name, "Service failed: {}", e);
                    failure = Some(BotError::service_failure(name, e));
                    break;
                }
            }
        }

        let Some(failure) = failure else {
            return Ok(());
        };

        if self.shutdown.trigger() {
            info!("Shutdown triggered by service failure");
        }
        self.drain().await;
        Err(failure)
    }

    /// Collects the remaining members after the first failure.
    async fn drain(&mut self) {
        if self.tasks.is_empty() {
            return;
        }

        let grace = self.grace;
        let settled = timeout(grace, async {
            while let Some(joined) = self.tasks.join_next_with_id().await {
                if let (name, Err(e)) = self.outcome(joined) {
                    debug!(service = name, "Service also failed during shutdown: {}", e);
                }
            }
        })
        .await;

        if settled.is_err() {
            warn!(
                remaining = self.tasks.len(),
                "Services still running after {:?}, aborting",
                grace
            );
            self.tasks.abort_all();
            while self.tasks.join_next().await.is_some() {}
        }
    }

    fn outcome(
        &self,
        joined: std::result::Result<(Id, Result<()>), JoinError>,
    ) -> (&'static str, Result<()>) {
        match joined {
            Ok((id, result)) => (self.name(id), result),
            Err(e) => {
                let name = self.name(e.id());
                let reason = if e.is_panic() {
                    BotError::Panicked(panic_message(e))
                } else {
                    BotError::Panicked("task cancelled".to_string())
                };
                (name, Err(reason))
            }
        }
    }

    fn name(&self, id: Id) -> &'static str {
        self.names.get(&id).copied().unwrap_or("service")
    }
}

fn panic_message(e: JoinError) -> String {
    let payload = e.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
