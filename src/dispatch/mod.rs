//! Delivery of normalized input into the emulation core
//!
//! [`emulator`] describes the core's input surface, [`dispatcher`] owns the
//! fast-forward/slow-motion state and performs the forwarding.

pub mod dispatcher;
pub mod emulator;

pub use dispatcher::{CoreInputDispatcher, DispatchMode, DispatcherSettings};
pub use emulator::{CoreError, EmulationCore, FeedbackStream};
