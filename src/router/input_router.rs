//! Lifecycle-gated merge of all input producers
//!
//! # State Machine
//!
//! ```text
//!            wait_for_window            route_until_inactive
//! Inactive ──────────────────► Active ───────────────────────► Inactive
//!    │                                                          │
//!    └── shutdown / lifecycle owner gone ──► (router dropped) ◄─┘
//! ```
//!
//! # Architecture
//!
//! ```text
//! left surface ──► forwarder ──┐
//! right surface ─► forwarder ──┼─► window queue ─► EventNormalizer ─► CoreInputDispatcher
//! physical ──────► forwarder ──┘
//! core feedback ─────────────────► FeedbackHandler
//! ```
//!
//! Each subscription gets a forwarder task that pushes into one queue scoped to
//! the window, so events are delivered in the order they arrived regardless of
//! their source. Forwarders are spawned left, right, physical; that order only
//! decides events that become ready in the same scheduler turn.
//!
//! Subscriptions exist only while the router is `Active`. Leaving the window
//! cancels the forwarders and waits for them, which drops every stream.

use chrono::Local;
use futures::stream::{Stream, StreamExt};
use statum::{machine, state};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dispatch::dispatcher::{CoreInputDispatcher, DispatcherSettings};
use crate::dispatch::emulator::{EmulationCore, FeedbackStream};
use crate::input::events::{RawPhysicalEvent, RawSurfaceEvent, SemanticInputEvent};
use crate::input::normalizer::EventNormalizer;
use crate::input::physical::PhysicalInput;
use crate::input::surface::{SurfaceError, TouchSurface};
use crate::router::error::RouterError;
use crate::router::feedback::FeedbackHandler;
use crate::router::lifecycle::{LifecycleWindow, WindowState};

/// Port that on-screen surfaces report their directions on
pub const SURFACE_PORT: u32 = 0;

const WINDOW_QUEUE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterStatus {
    /// Waiting for the lifecycle window, nothing subscribed
    Idle,
    /// All producers subscribed
    Routing,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    LeftSurface,
    RightSurface,
    Physical,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::LeftSurface => write!(f, "left surface"),
            InputSource::RightSurface => write!(f, "right surface"),
            InputSource::Physical => write!(f, "physical input"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub windows_opened: u64,
    pub delivered: u64,
    pub producer_failures: u64,
    pub feedback_events: u64,
}

/// What a forwarder hands to the router
enum Routed {
    Surface(InputSource, RawSurfaceEvent),
    Physical(RawPhysicalEvent),
    /// The subscription is gone for this window; `failure` is set when it faulted
    Closed {
        source: InputSource,
        failure: Option<SurfaceError>,
    },
}

/// Everything the router consumes, handed over by the host
pub struct RouterParts {
    pub left: Arc<dyn TouchSurface>,
    pub right: Arc<dyn TouchSurface>,
    pub physical: Arc<PhysicalInput>,
    pub core: Arc<dyn EmulationCore>,
    pub lifecycle: LifecycleWindow,
    pub feedback: Box<dyn FeedbackHandler>,
}

#[state]
#[derive(Debug, Clone)]
pub enum RouterState {
    Inactive, // No subscriptions, waiting for the window
    Active,   // Window open, producers merged
}

#[machine]
pub struct InputRouter<S: RouterState> {
    left: Arc<dyn TouchSurface>,
    right: Arc<dyn TouchSurface>,
    physical: Arc<PhysicalInput>,
    core: Arc<dyn EmulationCore>,
    lifecycle: LifecycleWindow,
    feedback: Box<dyn FeedbackHandler>,
    dispatcher: CoreInputDispatcher,
    normalizer: EventNormalizer,
    shutdown: CancellationToken,
    status: watch::Sender<RouterStatus>,
    stats: RouterStats,
    window_generation: u64,
}

impl<S: RouterState> InputRouter<S> {
    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    pub fn dispatcher(&self) -> &CoreInputDispatcher {
        &self.dispatcher
    }

    fn publish(&self, status: RouterStatus) {
        self.status.send_replace(status);
    }
}

impl InputRouter<Inactive> {
    pub fn create(
        parts: RouterParts,
        settings: Option<DispatcherSettings>,
        shutdown: CancellationToken,
        status: watch::Sender<RouterStatus>,
    ) -> Self {
        info!("Initializing input router");
        let dispatcher = CoreInputDispatcher::new(parts.core.clone(), settings);

        let router = Self::new(
            parts.left,
            parts.right,
            parts.physical,
            parts.core,
            parts.lifecycle,
            parts.feedback,
            dispatcher,
            EventNormalizer::default(),
            shutdown,
            status,
            RouterStats::default(),
            0,
        );
        router.publish(RouterStatus::Idle);
        router
    }

    /// Waits until the lifecycle window is open
    ///
    /// Returns `None` once shutdown was requested or the lifecycle owner is
    /// gone; the router has then published [`RouterStatus::Stopped`].
    pub async fn wait_for_window(mut self) -> Option<InputRouter<Active>> {
        loop {
            if self.shutdown.is_cancelled() {
                info!("Shutdown requested while inactive");
                break;
            }
            let state = self.lifecycle.current();
            if state.active {
                info!(
                    "Lifecycle window #{} open, activating router",
                    state.generation
                );
                self.window_generation = state.generation;
                return Some(self.transition());
            }
            if self.lifecycle.is_closed() {
                info!("Lifecycle owner dropped while inactive");
                break;
            }

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {}
                changed = self.lifecycle.changed() => {
                    if changed.is_err() {
                        info!("Lifecycle owner dropped while inactive");
                        break;
                    }
                }
            }
        }

        self.publish(RouterStatus::Stopped);
        None
    }
}

impl InputRouter<Active> {
    /// Merges all producers until the window closes
    ///
    /// A producer that fails or ends loses its subscription for the rest of
    /// this window only. A core error is fatal and ends routing.
    pub async fn route_until_inactive(mut self) -> Result<InputRouter<Inactive>, RouterError> {
        self.stats.windows_opened += 1;
        let window = self.shutdown.child_token();
        let (queue_tx, mut queue) = mpsc::channel(WINDOW_QUEUE);
        let mut forwarders = JoinSet::new();

        for (source, surface) in [
            (InputSource::LeftSurface, &self.left),
            (InputSource::RightSurface, &self.right),
        ] {
            forwarders.spawn(forward(
                source,
                surface.produce_events(),
                queue_tx.clone(),
                window.clone(),
                move |item| match item {
                    Ok(raw) => Routed::Surface(source, raw),
                    Err(e) => Routed::Closed {
                        source,
                        failure: Some(e),
                    },
                },
            ));
        }
        forwarders.spawn(forward(
            InputSource::Physical,
            self.physical.produce_events(),
            queue_tx,
            window.clone(),
            Routed::Physical,
        ));
        let mut feedback: Option<FeedbackStream> = Some(self.core.produce_feedback());

        info!(
            "Subscribed to all producers (window #{})",
            self.window_generation
        );
        self.publish(RouterStatus::Routing);

        let outcome = loop {
            let step = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested while routing");
                    break Ok(());
                }
                changed = self.lifecycle.changed() => match changed {
                    Ok(state) if self.serves(state) => Ok(()),
                    Ok(state) => {
                        info!(
                            "Lifecycle window #{} closed (now #{}, active: {})",
                            self.window_generation, state.generation, state.active
                        );
                        break Ok(());
                    }
                    Err(_) => {
                        warn!("Lifecycle owner dropped while routing");
                        break Ok(());
                    }
                },
                Some(routed) = queue.recv() => self.on_routed(routed),
                item = next_or_pending(&mut feedback) => {
                    match item {
                        Some(event) => {
                            self.stats.feedback_events += 1;
                            self.feedback.handle(event);
                        }
                        None => {
                            debug!("Core feedback stream ended");
                            feedback = None;
                        }
                    }
                    Ok(())
                }
            };

            if let Err(e) = step {
                break Err(e);
            }
        };

        window.cancel();
        drop(queue);
        drop(feedback);
        while let Some(joined) = forwarders.join_next().await {
            if let Err(e) = joined {
                warn!("Forwarder did not finish cleanly: {}", e);
            }
        }

        match outcome {
            Ok(()) => {
                info!(
                    "Unsubscribed from all producers, {} events delivered so far",
                    self.stats.delivered
                );
                self.publish(RouterStatus::Idle);
                Ok(self.transition())
            }
            Err(e) => {
                error!("Routing stopped: {}", e);
                self.publish(RouterStatus::Stopped);
                Err(e)
            }
        }
    }

    fn serves(&self, state: WindowState) -> bool {
        state.active && state.generation == self.window_generation
    }

    fn on_routed(&mut self, routed: Routed) -> Result<(), RouterError> {
        match routed {
            Routed::Surface(source, raw) => {
                let event = self.normalizer.from_surface_event(raw, SURFACE_PORT);
                self.deliver(source, event)
            }
            Routed::Physical(raw) => self.on_physical_event(raw),
            Routed::Closed {
                source,
                failure: Some(e),
            } => {
                error!("{} failed: {}; unsubscribed until next window", source, e);
                self.stats.producer_failures += 1;
                Ok(())
            }
            Routed::Closed {
                source,
                failure: None,
            } => {
                warn!("{} ended, unsubscribed until next window", source);
                Ok(())
            }
        }
    }

    fn on_physical_event(&mut self, raw: RawPhysicalEvent) -> Result<(), RouterError> {
        let age = Local::now().signed_duration_since(raw.timestamp());
        debug!(
            "Physical event received ({} µs old)",
            age.num_microseconds().unwrap_or_default()
        );
        for event in self.normalizer.from_physical_event(&raw) {
            self.deliver(InputSource::Physical, event)?;
        }
        Ok(())
    }

    fn deliver(
        &mut self,
        source: InputSource,
        event: SemanticInputEvent,
    ) -> Result<(), RouterError> {
        debug!("Delivering {:?} from {}", event, source);
        self.dispatcher.dispatch(&event)?;
        self.stats.delivered += 1;
        Ok(())
    }
}

/// Pushes one subscription into the window queue until it closes or the
/// window is cancelled
async fn forward<S, F>(
    source: InputSource,
    mut events: S,
    queue: mpsc::Sender<Routed>,
    window: CancellationToken,
    wrap: F,
) where
    S: Stream + Unpin,
    F: Fn(S::Item) -> Routed,
{
    loop {
        let item = tokio::select! {
            biased;
            _ = window.cancelled() => return,
            item = events.next() => item,
        };
        let routed = match item {
            Some(item) => wrap(item),
            None => Routed::Closed {
                source,
                failure: None,
            },
        };
        let closed = matches!(routed, Routed::Closed { .. });
        if queue.send(routed).await.is_err() || closed {
            debug!("Forwarder for {} finished", source);
            return;
        }
    }
}

/// Next item of an optional subscription; never resolves once it is gone
async fn next_or_pending<S>(subscription: &mut Option<S>) -> Option<S::Item>
where
    S: Stream + Unpin,
{
    match subscription.as_mut() {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}
