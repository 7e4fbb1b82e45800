//! OS signal handling.
//!
//! The signal watcher holds a reference to the webhook service it guards.
//! On SIGINT/SIGTERM, or when another service triggered shutdown first, it
//! stops that service and triggers the shared shutdown so the chat listener
//! follows.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::shutdown::Shutdown;

/// Inbound HTTP service the signal watcher can stop
#[async_trait]
pub trait WebhookService: Send + Sync {
    /// Serves requests until [`WebhookService::stop`] is called
    async fn listen(&self) -> Result<()>;

    /// Starts a graceful shutdown of `listen`. Idempotent.
    fn stop(&self);
}

pub async fn handle_signals(service: Arc<dyn WebhookService>, shutdown: Shutdown) -> Result<()> {
    stop_on(service, shutdown, termination_signal()).await
}

/// Stops `service` once `signal` fires or shutdown is requested. The service
/// is stopped even when listening for the signal failed.
async fn stop_on<S>(
    service: Arc<dyn WebhookService>,
    shutdown: Shutdown,
    signal: S,
) -> Result<()>
where
    S: Future<Output = Result<&'static str>>,
{
    let outcome = tokio::select! {
        received = signal => received.map(|name| info!("Received {}, shutting down", name)),
        _ = shutdown.wait() => {
            debug!("Shutdown already requested, stopping webhook service");
            Ok(())
        }
    };

    service.stop();
    shutdown.trigger();
    outcome
}

#[cfg(unix)]
async fn termination_signal() -> Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = terminate.recv() => Ok("SIGTERM"),
        _ = interrupt.recv() => Ok("SIGINT"),
    }
}

#[cfg(not(unix))]
async fn termination_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
