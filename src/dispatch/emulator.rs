use futures::stream::BoxStream;

use crate::input::codes::{KeyAction, LogicalCode, MotionSource};
use crate::input::events::FeedbackEvent;

pub type FeedbackStream = BoxStream<'static, FeedbackEvent>;

/// Raised by the emulation core when it cannot accept input
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum CoreError {
    #[error("Core rejected key event {code} {action:?}: {reason}")]
    KeyRejected {
        code: LogicalCode,
        action: KeyAction,
        reason: String,
    },

    #[error("Core rejected motion event for {axis_group:?}: {reason}")]
    MotionRejected {
        axis_group: MotionSource,
        reason: String,
    },

    #[error("Emulation session is gone: {0}")]
    SessionClosed(String),
}

/// Input surface of the emulation core
///
/// Implementations are shared with the host (rendering, audio), so every
/// method takes `&self`.
pub trait EmulationCore: Send + Sync {
    fn send_key_event(&self, action: KeyAction, code: LogicalCode) -> Result<(), CoreError>;

    fn send_motion_event(
        &self,
        source: MotionSource,
        x: f32,
        y: f32,
        port: u32,
    ) -> Result<(), CoreError>;

    fn set_frame_speed(&self, multiplier: u32);

    fn set_slow_speed(&self, factor: f32);

    /// Haptic feedback requested by the running game; a fresh stream per call
    fn produce_feedback(&self) -> FeedbackStream;
}
