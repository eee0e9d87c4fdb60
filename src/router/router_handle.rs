//! Router Handle - runs the [`InputRouter`] in a tokio task
//!
//! The handle owns the shutdown token and the status channel. Hosts keep it for
//! the lifetime of the input session and flip the lifecycle window through
//! their own [`LifecycleController`](crate::router::LifecycleController).

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dispatch::dispatcher::DispatcherSettings;
use crate::router::error::RouterError;
use crate::router::input_router::{Inactive, InputRouter, RouterParts, RouterStats, RouterStatus};

pub struct RouterHandle {
    shutdown: CancellationToken,
    status: watch::Receiver<RouterStatus>,
    task_handle: Option<JoinHandle<Result<RouterStats, RouterError>>>,
}

impl RouterHandle {
    /// Spawns the router; it stays idle until the lifecycle window opens
    ///
    /// # Arguments
    ///
    /// * `parts` - Producers, core and lifecycle window to route between
    /// * `settings` - Optional dispatcher configuration; uses defaults if None
    pub fn spawn(parts: RouterParts, settings: Option<DispatcherSettings>) -> Self {
        let shutdown = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(RouterStatus::Idle);

        let router = InputRouter::create(parts, settings, shutdown.clone(), status_tx);
        let task_handle = tokio::spawn(async move {
            info!("Spawning input router");
            run(router).await
        });

        Self {
            shutdown,
            status: status_rx,
            task_handle: Some(task_handle),
        }
    }

    pub fn status(&self) -> RouterStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<RouterStatus> {
        self.status.clone()
    }

    /// Waits until the router publishes `wanted`
    ///
    /// Returns `false` if the router task went away first.
    pub async fn wait_for_status(&self, wanted: RouterStatus) -> bool {
        let mut status = self.status.clone();
        let reached = status.wait_for(|current| *current == wanted).await.is_ok();
        reached
    }

    /// Requests shutdown and waits for the router task
    pub async fn shutdown(&mut self) -> Result<RouterStats, RouterError> {
        debug!("Sending shutdown signal to input router");
        self.shutdown.cancel();
        self.join().await
    }

    /// Waits for the router task without requesting shutdown
    ///
    /// Surfaces the fatal error if the core rejected an event.
    pub async fn join(&mut self) -> Result<RouterStats, RouterError> {
        match self.task_handle.take() {
            Some(handle) => match handle.await {
                Ok(result) => {
                    debug!("Input router task completed");
                    result
                }
                Err(e) => {
                    error!("Input router task panicked: {}", e);
                    Err(RouterError::TaskPanicked(e.to_string()))
                }
            },
            None => {
                warn!("Input router already joined");
                Err(RouterError::AlreadyJoined)
            }
        }
    }
}

impl Drop for RouterHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run(mut router: InputRouter<Inactive>) -> Result<RouterStats, RouterError> {
    let mut stats = router.stats().clone();
    while let Some(active) = router.wait_for_window().await {
        router = active.route_until_inactive().await?;
        stats = router.stats().clone();
    }
    info!("Input router stopped: {:?}", stats);
    Ok(stats)
}
