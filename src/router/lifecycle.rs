//! Host-controlled active/inactive gate
//!
//! The host keeps the [`LifecycleController`] and flips it as its own lifecycle
//! moves (resumed, paused). The router only ever observes a
//! [`LifecycleWindow`]. Flipping to the state the window is already in does not
//! notify observers, so repeated activation never causes a second subscription.
//!
//! Every activation opens a new window generation. A watch channel coalesces a
//! quick deactivate/activate pair into one notification; the generation still
//! tells the router that the window it was serving has closed.

use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("Lifecycle owner has been dropped")]
pub struct LifecycleClosed;

/// Snapshot of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub active: bool,
    /// Incremented on every activation
    pub generation: u64,
}

pub struct LifecycleController {
    sender: watch::Sender<WindowState>,
}

/// Creates a gate and its first observer
pub fn lifecycle_window(initially_active: bool) -> (LifecycleController, LifecycleWindow) {
    let (sender, receiver) = watch::channel(WindowState {
        active: initially_active,
        generation: u64::from(initially_active),
    });
    (
        LifecycleController { sender },
        LifecycleWindow { receiver },
    )
}

impl LifecycleController {
    /// Returns `true` when the window actually changed
    pub fn set_active(&self, active: bool) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if current.active == active {
                return false;
            }
            current.active = active;
            if active {
                current.generation += 1;
            }
            true
        });
        if changed {
            info!("Lifecycle window {}", if active { "activated" } else { "deactivated" });
        } else {
            debug!("Lifecycle window already {}", if active { "active" } else { "inactive" });
        }
        changed
    }

    pub fn activate(&self) -> bool {
        self.set_active(true)
    }

    pub fn deactivate(&self) -> bool {
        self.set_active(false)
    }

    pub fn is_active(&self) -> bool {
        self.sender.borrow().active
    }

    pub fn window(&self) -> LifecycleWindow {
        LifecycleWindow {
            receiver: self.sender.subscribe(),
        }
    }
}

#[derive(Clone)]
pub struct LifecycleWindow {
    receiver: watch::Receiver<WindowState>,
}

impl LifecycleWindow {
    pub fn is_active(&self) -> bool {
        self.receiver.borrow().active
    }

    /// Reads the state and marks it as seen
    pub fn current(&mut self) -> WindowState {
        *self.receiver.borrow_and_update()
    }

    pub fn is_closed(&self) -> bool {
        self.receiver.has_changed().is_err()
    }

    /// Waits for the next transition and returns the new state
    pub async fn changed(&mut self) -> Result<WindowState, LifecycleClosed> {
        self.receiver.changed().await.map_err(|_| LifecycleClosed)?;
        Ok(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[test]
    fn repeated_transitions_are_no_ops() {
        let (controller, _window) = lifecycle_window(false);
        assert!(!controller.deactivate());
        assert!(controller.activate());
        assert!(!controller.activate());
        assert!(controller.is_active());
    }

    #[tokio::test]
    async fn observer_sees_transition_once() {
        let (controller, mut window) = lifecycle_window(false);
        controller.activate();
        controller.activate();
        assert_eq!(
            window.changed().await,
            Ok(WindowState {
                active: true,
                generation: 1
            })
        );

        let second = timeout(Duration::from_millis(50), window.changed()).await;
        assert!(second.is_err(), "no second notification expected");
    }

    #[tokio::test]
    async fn quick_toggle_opens_a_new_generation() {
        let (controller, mut window) = lifecycle_window(true);
        assert_eq!(window.current().generation, 1);

        controller.deactivate();
        controller.activate();
        let state = window.changed().await.unwrap();
        assert!(state.active);
        assert_eq!(state.generation, 2);
    }

    #[tokio::test]
    async fn dropping_controller_closes_window() {
        let (controller, mut window) = lifecycle_window(true);
        drop(controller);
        assert!(window.is_closed());
        assert_eq!(window.changed().await, Err(LifecycleClosed));
    }
}
