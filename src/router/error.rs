use thiserror::Error;

use crate::dispatch::emulator::CoreError;

#[derive(Debug, Error)]
pub enum RouterError {
    /// The core refused an event; routing stops
    #[error("Forwarding to the emulation core failed: {0}")]
    Core(#[from] CoreError),

    #[error("Router task panicked: {0}")]
    TaskPanicked(String),

    #[error("Router task already joined")]
    AlreadyJoined,
}
