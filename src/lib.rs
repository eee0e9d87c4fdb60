//! Input routing for a touch-screen game controller
//!
//! Two radial touch surfaces and an optional physical gamepad feed one
//! emulation core. The router merges their events while the host's lifecycle
//! window is open, normalizes them and forwards them to the core, applying the
//! fast-forward and slow-motion speed modes on the way.
//!
//! - [`theme`] - Colour palette shared by the surfaces
//! - [`layout`] - Dial layouts of the left and right surface
//! - [`input`] - Producers and normalization
//! - [`dispatch`] - Core boundary and speed-mode policy
//! - [`router`] - Lifecycle-gated merge and its task handle
//! - [`config`] - Settings file

pub mod config;
pub mod dispatch;
pub mod input;
pub mod layout;
pub mod router;
pub mod theme;

pub use config::{ConfigError, RouterSettings};
pub use dispatch::{CoreError, CoreInputDispatcher, DispatchMode, DispatcherSettings, EmulationCore};
pub use router::{lifecycle_window, RouterError, RouterHandle, RouterParts, RouterStatus};
