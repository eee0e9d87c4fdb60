//! Input sources and their normalization
//!
//! ```text
//! VirtualSurface (left) ──┐
//! VirtualSurface (right) ─┼──► EventNormalizer ──► SemanticInputEvent
//! PhysicalInput ──────────┘
//! ```
//!
//! - [`codes`] - Shared code tables ([`LogicalCode`], [`KeyAction`], axes)
//! - [`events`] - Raw and normalized event shapes
//! - [`normalizer`] - Stateless conversion into [`SemanticInputEvent`]
//! - [`surface`] - Touch-surface boundary and the channel-backed surface
//! - [`physical`] - Push-based physical key/motion producer
//! - `gamepad` - gilrs adapter (feature `gamepad`)

pub mod codes;
pub mod events;
#[cfg(feature = "gamepad")]
pub mod gamepad;
pub mod normalizer;
pub mod physical;
pub mod surface;

pub use codes::{AxisId, KeyAction, LogicalCode, MotionSource};
pub use events::{
    FeedbackEvent, MotionSample, RawPhysicalEvent, RawSurfaceEvent, SemanticInputEvent,
};
pub use normalizer::{EventNormalizer, MotionBinding, DEFAULT_MOTION_BINDINGS};
pub use physical::{PhysicalEventStream, PhysicalInput, PhysicalInputSender};
pub use surface::{SurfaceBounds, SurfaceError, SurfaceEventStream, TouchSurface, VirtualSurface};
