//! Conversion of raw surface and physical input into [`SemanticInputEvent`]s
//!
//! The normalizer keeps no state between calls: identical inputs always give
//! identical outputs. Physical keyboards expose far more codes than the control
//! scheme uses, so unknown codes are filtered here and never reach the core.

use tracing::{debug, trace};

use crate::input::codes::{AxisId, KeyAction, LogicalCode, MotionSource};
use crate::input::events::{MotionSample, RawPhysicalEvent, RawSurfaceEvent, SemanticInputEvent};

/// Which pair of physical axes feeds which axis group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionBinding {
    pub source: MotionSource,
    pub x_axis: AxisId,
    pub y_axis: AxisId,
    pub port: u32,
}

/// Hat switch to D-pad, left stick to left analog, Z/RZ to right analog
pub const DEFAULT_MOTION_BINDINGS: [MotionBinding; 3] = [
    MotionBinding {
        source: MotionSource::Dpad,
        x_axis: AxisId::HatX,
        y_axis: AxisId::HatY,
        port: 0,
    },
    MotionBinding {
        source: MotionSource::AnalogLeft,
        x_axis: AxisId::X,
        y_axis: AxisId::Y,
        port: 0,
    },
    MotionBinding {
        source: MotionSource::AnalogRight,
        x_axis: AxisId::Z,
        y_axis: AxisId::Rz,
        port: 0,
    },
];

#[derive(Debug, Clone)]
pub struct EventNormalizer {
    bindings: Vec<MotionBinding>,
}

impl Default for EventNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MOTION_BINDINGS.to_vec())
    }
}

impl EventNormalizer {
    pub fn new(bindings: Vec<MotionBinding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[MotionBinding] {
        &self.bindings
    }

    /// Touch-surface events map 1:1; directions keep their axis group
    pub fn from_surface_event(&self, raw: RawSurfaceEvent, port: u32) -> SemanticInputEvent {
        match raw {
            RawSurfaceEvent::Button { code, action } => SemanticInputEvent::ButtonTransition {
                code,
                pressed: action.is_pressed(),
            },
            RawSurfaceEvent::Direction { source, x, y } => SemanticInputEvent::DirectionalVector {
                source,
                x,
                y,
                port,
            },
        }
    }

    /// Passes a physical key through, `None` for codes outside [`LogicalCode`]
    pub fn from_physical_key(
        &self,
        action: KeyAction,
        raw_code: i32,
    ) -> Option<SemanticInputEvent> {
        match LogicalCode::from_raw(raw_code) {
            Some(code) => Some(SemanticInputEvent::ButtonTransition {
                code,
                pressed: action.is_pressed(),
            }),
            None => {
                trace!("Dropping unrecognized key code {}", raw_code);
                None
            }
        }
    }

    /// Packages two axis readings as a vector; values are not clamped
    pub fn from_physical_motion(
        &self,
        sample: &MotionSample,
        source: MotionSource,
        x_axis: AxisId,
        y_axis: AxisId,
        port: u32,
    ) -> SemanticInputEvent {
        SemanticInputEvent::DirectionalVector {
            source,
            x: sample.axis_value(x_axis),
            y: sample.axis_value(y_axis),
            port,
        }
    }

    /// Expands one physical event into the events it stands for
    ///
    /// A motion sample yields one vector per configured binding, mirroring how
    /// the platform reports every axis of the device in a single event.
    pub fn from_physical_event(&self, raw: &RawPhysicalEvent) -> Vec<SemanticInputEvent> {
        match raw {
            RawPhysicalEvent::Key {
                action, raw_code, ..
            } => self
                .from_physical_key(*action, *raw_code)
                .into_iter()
                .collect(),
            RawPhysicalEvent::Motion { sample, .. } => {
                let events: Vec<SemanticInputEvent> = self
                    .bindings
                    .iter()
                    .map(|binding| {
                        self.from_physical_motion(
                            sample,
                            binding.source,
                            binding.x_axis,
                            binding.y_axis,
                            binding.port,
                        )
                    })
                    .collect();
                debug!("Motion sample expanded to {} vectors", events.len());
                events
            }
        }
    }
}
