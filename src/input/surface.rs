//! Touch-surface boundary and the channel-backed [`VirtualSurface`]
//!
//! A touch surface is anything that can hand out a fresh, restartable stream of
//! [`RawSurfaceEvent`]s for its [`SurfaceConfig`]. The router subscribes when
//! the lifecycle window opens and drops the stream when it closes.
//!
//! [`VirtualSurface`] is fed by the presentation layer after hit-testing: it
//! turns touches on dials into raw events and fans them out to whoever is
//! currently subscribed. Events emitted while nobody listens are dropped.

use futures::stream::{BoxStream, StreamExt};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, oneshot};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use crate::input::codes::{KeyAction, LogicalCode, MotionSource};
use crate::input::events::RawSurfaceEvent;
use crate::layout::{DialKind, SurfaceConfig, SurfaceSide};

pub type SurfaceEventStream = BoxStream<'static, Result<RawSurfaceEvent, SurfaceError>>;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SurfaceError {
    #[error("Code {0} is not bound on this surface")]
    NotOnSurface(LogicalCode),

    #[error("Slot {0} does not hold a stick")]
    NotAStick(u8),

    #[error("Surface has no directional cross")]
    NoCross,

    #[error("Surface faulted: {0}")]
    Faulted(String),
}

/// Producer of raw events for one configured surface
pub trait TouchSurface: Send + Sync {
    fn config(&self) -> &SurfaceConfig;

    /// Starts a new subscription; every call returns an independent stream
    fn produce_events(&self) -> SurfaceEventStream;
}

/// Screen rectangle of a surface once it has been laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

pub struct VirtualSurface {
    config: Arc<SurfaceConfig>,
    sender: broadcast::Sender<RawSurfaceEvent>,
    held_taps: Mutex<HashSet<u8>>,
    layout_listener: Mutex<Option<oneshot::Sender<SurfaceBounds>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl VirtualSurface {
    pub fn new(config: SurfaceConfig, buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        debug!(
            "Created virtual {:?} surface with buffer capacity {}",
            config.side(),
            buffer
        );
        Self {
            config: Arc::new(config),
            sender,
            held_taps: Mutex::new(HashSet::new()),
            layout_listener: Mutex::new(None),
        }
    }

    pub fn side(&self) -> SurfaceSide {
        self.config.side()
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn emit(&self, event: RawSurfaceEvent) {
        match self.sender.send(event) {
            Ok(receivers) => debug!(
                "{:?} surface emitted {:?} to {} subscriber(s)",
                self.side(),
                event,
                receivers
            ),
            Err(_) => debug!("{:?} surface has no subscriber, dropping {:?}", self.side(), event),
        }
    }

    fn ensure_code(&self, code: LogicalCode) -> Result<(), SurfaceError> {
        if self.config.codes().contains(&code) {
            Ok(())
        } else {
            Err(SurfaceError::NotOnSurface(code))
        }
    }

    pub fn press(&self, code: LogicalCode) -> Result<(), SurfaceError> {
        self.ensure_code(code)?;
        self.emit(RawSurfaceEvent::Button {
            code,
            action: KeyAction::Down,
        });
        Ok(())
    }

    pub fn release(&self, code: LogicalCode) -> Result<(), SurfaceError> {
        self.ensure_code(code)?;
        self.emit(RawSurfaceEvent::Button {
            code,
            action: KeyAction::Up,
        });
        Ok(())
    }

    /// Moves the primary cross; x and y are expected in [-1, 1]
    pub fn cross(&self, x: f32, y: f32) -> Result<(), SurfaceError> {
        match self.config.primary() {
            DialKind::Cross { source } => {
                self.emit(RawSurfaceEvent::Direction {
                    source: *source,
                    x,
                    y,
                });
                Ok(())
            }
            _ => Err(SurfaceError::NoCross),
        }
    }

    fn stick_source(&self, slot: u8) -> Result<(MotionSource, &DialKind), SurfaceError> {
        match self.config.dial(slot).map(|dial| &dial.kind) {
            Some(kind @ DialKind::Stick { source, .. }) => Ok((*source, kind)),
            _ => Err(SurfaceError::NotAStick(slot)),
        }
    }

    /// Moves a stick given its rotation in degrees (0 = east, counter-clockwise)
    /// and its deflection; the dial's rotation processor runs first
    pub fn stick(&self, slot: u8, rotation_deg: f32, magnitude: f32) -> Result<(), SurfaceError> {
        let (source, kind) = self.stick_source(slot)?;
        let rotation = match kind {
            DialKind::Stick {
                rotation: Some(processor),
                ..
            } => processor.apply(rotation_deg),
            _ => rotation_deg,
        };
        let (x, y) = polar_to_vector(rotation, magnitude);
        self.emit(RawSurfaceEvent::Direction { source, x, y });
        Ok(())
    }

    /// Fires the stick's double-tap button; it stays pressed until [`lift`](Self::lift)
    pub fn double_tap(&self, slot: u8) -> Result<(), SurfaceError> {
        let (_, kind) = self.stick_source(slot)?;
        if let DialKind::Stick {
            double_tap: Some(button),
            ..
        } = kind
        {
            lock(&self.held_taps).insert(slot);
            self.emit(RawSurfaceEvent::Button {
                code: button.code,
                action: KeyAction::Down,
            });
        }
        Ok(())
    }

    /// Finger left the stick: recentre and release a held double-tap button
    pub fn lift(&self, slot: u8) -> Result<(), SurfaceError> {
        let (source, kind) = self.stick_source(slot)?;
        let was_held = lock(&self.held_taps).remove(&slot);
        if let (
            true,
            DialKind::Stick {
                double_tap: Some(button),
                ..
            },
        ) = (was_held, kind)
        {
            self.emit(RawSurfaceEvent::Button {
                code: button.code,
                action: KeyAction::Up,
            });
        }
        self.emit(RawSurfaceEvent::Direction {
            source,
            x: 0.0,
            y: 0.0,
        });
        Ok(())
    }

    /// One-shot notification for the first completed layout pass
    pub fn layout_ready(&self) -> oneshot::Receiver<SurfaceBounds> {
        let (tx, rx) = oneshot::channel();
        *lock(&self.layout_listener) = Some(tx);
        rx
    }

    /// Reports the laid-out bounds; only the first call after
    /// [`layout_ready`](Self::layout_ready) reaches the listener
    pub fn notify_layout(&self, bounds: SurfaceBounds) {
        if let Some(listener) = lock(&self.layout_listener).take() {
            info!("{:?} surface laid out at {:?}", self.side(), bounds);
            if listener.send(bounds).is_err() {
                debug!("Layout listener went away before the first layout");
            }
        }
    }
}

impl TouchSurface for VirtualSurface {
    fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    fn produce_events(&self) -> SurfaceEventStream {
        let side = self.side();
        debug!("New subscription on {:?} surface", side);
        BroadcastStream::new(self.sender.subscribe())
            .filter_map(move |item| async move {
                match item {
                    Ok(event) => Some(Ok(event)),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!("{:?} surface subscriber lagged, skipped {} events", side, skipped);
                        None
                    }
                }
            })
            .boxed()
    }
}

/// Screen coordinates: x to the right, y downwards
fn polar_to_vector(rotation_deg: f32, magnitude: f32) -> (f32, f32) {
    let magnitude = magnitude.clamp(0.0, 1.0);
    let radians = rotation_deg.to_radians();
    (radians.cos() * magnitude, -radians.sin() * magnitude)
}
