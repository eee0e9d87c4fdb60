//! Declarative layouts of the two radial touch surfaces
//!
//! [`dial`] holds the value types and validation, [`builder`] the fixed
//! control scheme. Everything here is immutable once built and is shared with
//! the touch surfaces through [`std::sync::Arc`].

pub mod builder;
pub mod dial;

pub use builder::{build_surfaces, left_surface, right_surface};
pub use dial::{
    ButtonSpec, DialKind, DialLayout, Gravity, LayoutError, Placement, RotationProcessor,
    SurfaceConfig, SurfaceSide, SURFACE_SOCKETS,
};
