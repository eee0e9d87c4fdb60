//! Lifecycle-scoped routing of input into the emulation core
//!
//! [`InputRouter`] is a statum state machine that subscribes to every producer
//! while the host's lifecycle window is open and drops the subscriptions when
//! it closes. [`RouterHandle`] runs it in a tokio task.

pub mod error;
pub mod feedback;
pub mod input_router;
pub mod lifecycle;
pub mod router_handle;

pub use error::RouterError;
pub use feedback::{FeedbackHandler, LoggingFeedback};
pub use input_router::{
    Active, Inactive, InputRouter, InputSource, RouterParts, RouterState, RouterStats,
    RouterStatus, SURFACE_PORT,
};
pub use lifecycle::{
    lifecycle_window, LifecycleClosed, LifecycleController, LifecycleWindow, WindowState,
};
pub use router_handle::RouterHandle;
