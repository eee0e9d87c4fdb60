use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::input::codes::{LogicalCode, MotionSource};
use crate::theme::Theme;

/// Number of secondary sockets around each radial surface
pub const SURFACE_SOCKETS: u8 = 12;

/// Errors raised while assembling a surface configuration
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LayoutError {
    #[error("Socket {0} is used by more than one dial")]
    DuplicateSlot(u8),

    #[error("Dial in slot {slot} spans {spread} sockets")]
    InvalidSpread { slot: u8, spread: u8 },

    #[error("Slot {slot} is outside the {capacity} sockets of the surface")]
    SlotOutOfRange { slot: u8, capacity: u8 },

    #[error("Primary dial must be a cross or a button cluster, got {0}")]
    InvalidPrimary(String),

    #[error("A button cluster can only be used as primary dial (slot {0})")]
    ClusterInSocket(u8),
}

/// Adjusts the raw stick rotation (degrees) before the vector is emitted
#[derive(Clone, Copy)]
pub struct RotationProcessor(pub fn(f32) -> f32);

impl RotationProcessor {
    pub fn apply(&self, rotation_deg: f32) -> f32 {
        (self.0)(rotation_deg)
    }
}

impl fmt::Debug for RotationProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RotationProcessor")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub code: LogicalCode,
    pub label: String,
    pub content_description: Option<String>,
}

impl ButtonSpec {
    pub fn new(code: LogicalCode, label: &str) -> Self {
        Self {
            code,
            label: label.to_string(),
            content_description: None,
        }
    }

    pub fn described(mut self, description: &str) -> Self {
        self.content_description = Some(description.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub enum DialKind {
    Cross {
        source: MotionSource,
    },
    ButtonCluster(Vec<ButtonSpec>),
    SingleButton(ButtonSpec),
    DoubleButton(ButtonSpec),
    Stick {
        source: MotionSource,
        /// Button fired when the stick is double tapped
        double_tap: Option<ButtonSpec>,
        rotation: Option<RotationProcessor>,
    },
    Empty,
}

impl DialKind {
    fn name(&self) -> &'static str {
        match self {
            DialKind::Cross { .. } => "Cross",
            DialKind::ButtonCluster(_) => "ButtonCluster",
            DialKind::SingleButton(_) => "SingleButton",
            DialKind::DoubleButton(_) => "DoubleButton",
            DialKind::Stick { .. } => "Stick",
            DialKind::Empty => "Empty",
        }
    }

    /// Every logical code this dial can emit as a button
    pub fn codes(&self) -> Vec<LogicalCode> {
        match self {
            DialKind::ButtonCluster(buttons) => buttons.iter().map(|b| b.code).collect(),
            DialKind::SingleButton(button) | DialKind::DoubleButton(button) => vec![button.code],
            DialKind::Stick {
                double_tap: Some(button),
                ..
            } => vec![button.code],
            DialKind::Cross { .. } | DialKind::Stick { .. } | DialKind::Empty => Vec::new(),
        }
    }

    fn default_spread(&self) -> u8 {
        match self {
            DialKind::DoubleButton(_) => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub angle_deg: f32,
    pub radius_offset: f32,
    pub scale: f32,
    /// Number of consecutive sockets the dial covers, starting at its slot
    pub spread: u8,
}

#[derive(Debug, Clone)]
pub struct DialLayout {
    pub slot: u8,
    pub kind: DialKind,
    pub placement: Placement,
}

impl DialLayout {
    /// Dial with the natural width of its kind (double buttons take two sockets)
    pub fn socket(slot: u8, scale: f32, distance: f32, kind: DialKind) -> Self {
        let spread = kind.default_spread();
        Self::spanning(slot, spread, scale, distance, kind)
    }

    pub fn spanning(slot: u8, spread: u8, scale: f32, distance: f32, kind: DialKind) -> Self {
        Self {
            slot,
            kind,
            placement: Placement {
                angle_deg: slot as f32 * 360.0 / SURFACE_SOCKETS as f32,
                radius_offset: distance,
                scale,
                spread,
            },
        }
    }

    pub fn empty(slot: u8) -> Self {
        Self::socket(slot, 1.0, 0.0, DialKind::Empty)
    }

    /// Sockets covered by this dial, wrapping around the ring
    pub fn sockets(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.placement.spread).map(move |offset| (self.slot + offset) % SURFACE_SOCKETS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceSide {
    Left,
    Right,
}

/// Horizontal/vertical pinning used by the presentation layer, each in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gravity {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    side: SurfaceSide,
    primary: DialKind,
    dials: Vec<DialLayout>,
    theme: Arc<Theme>,
    gravity: Gravity,
    margin_dp: f32,
}

impl SurfaceConfig {
    /// Validates the dials and fills every uncovered socket with a placeholder
    pub fn new(
        side: SurfaceSide,
        primary: DialKind,
        dials: Vec<DialLayout>,
        theme: Arc<Theme>,
        gravity: Gravity,
        margin_dp: f32,
    ) -> Result<Self, LayoutError> {
        if !matches!(primary, DialKind::Cross { .. } | DialKind::ButtonCluster(_)) {
            return Err(LayoutError::InvalidPrimary(primary.name().to_string()));
        }

        let mut used = HashSet::new();
        for dial in &dials {
            if dial.slot >= SURFACE_SOCKETS {
                return Err(LayoutError::SlotOutOfRange {
                    slot: dial.slot,
                    capacity: SURFACE_SOCKETS,
                });
            }
            let spread = dial.placement.spread;
            if spread == 0 || spread > SURFACE_SOCKETS {
                return Err(LayoutError::InvalidSpread {
                    slot: dial.slot,
                    spread,
                });
            }
            if matches!(dial.kind, DialKind::ButtonCluster(_)) {
                return Err(LayoutError::ClusterInSocket(dial.slot));
            }
            for socket in dial.sockets() {
                if !used.insert(socket) {
                    return Err(LayoutError::DuplicateSlot(socket));
                }
            }
        }

        let mut dials = dials;
        for slot in 0..SURFACE_SOCKETS {
            if !used.contains(&slot) {
                dials.push(DialLayout::empty(slot));
            }
        }
        dials.sort_by_key(|dial| dial.slot);

        debug!(
            "Built {:?} surface with {} dials, gravity ({}, {})",
            side,
            dials.len(),
            gravity.x,
            gravity.y
        );

        Ok(Self {
            side,
            primary,
            dials,
            theme,
            gravity: Gravity {
                x: gravity.x.clamp(-1.0, 1.0),
                y: gravity.y.clamp(-1.0, 1.0),
            },
            margin_dp,
        })
    }

    pub fn side(&self) -> SurfaceSide {
        self.side
    }

    pub fn primary(&self) -> &DialKind {
        &self.primary
    }

    /// Secondary dials ordered by slot; together they cover all [`SURFACE_SOCKETS`]
    pub fn dials(&self) -> &[DialLayout] {
        &self.dials
    }

    /// Dial anchored at `slot`
    pub fn dial(&self, slot: u8) -> Option<&DialLayout> {
        self.dials.iter().find(|dial| dial.slot == slot)
    }

    /// Dial covering `socket`, whether anchored there or spread over it
    pub fn dial_covering(&self, socket: u8) -> Option<&DialLayout> {
        self.dials
            .iter()
            .find(|dial| dial.sockets().any(|covered| covered == socket))
    }

    /// Every covered socket in ascending order
    pub fn sockets(&self) -> Vec<u8> {
        let mut sockets: Vec<u8> = self.dials.iter().flat_map(|dial| dial.sockets()).collect();
        sockets.sort_unstable();
        sockets
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn gravity(&self) -> Gravity {
        self.gravity
    }

    pub fn margin_dp(&self) -> f32 {
        self.margin_dp
    }

    pub fn codes(&self) -> Vec<LogicalCode> {
        let mut codes = self.primary.codes();
        for dial in &self.dials {
            codes.extend(dial.kind.codes());
        }
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::game_pad_theme;

    fn gravity() -> Gravity {
        Gravity { x: -1.0, y: 1.0 }
    }

    #[test]
    fn duplicate_slot_is_rejected() {
        let start = DialKind::SingleButton(ButtonSpec::new(LogicalCode::Start, "START"));
        let select = DialKind::SingleButton(ButtonSpec::new(LogicalCode::Select, "SELECT"));
        let dials = vec![
            DialLayout::socket(3, 1.0, 0.0, start),
            DialLayout::socket(3, 1.0, 0.0, select),
        ];
        let result = SurfaceConfig::new(
            SurfaceSide::Left,
            DialKind::Cross { source: MotionSource::Dpad },
            dials,
            Arc::new(game_pad_theme()),
            gravity(),
            16.0,
        );
        assert_eq!(result.unwrap_err(), LayoutError::DuplicateSlot(3));
    }

    #[test]
    fn slot_beyond_capacity_is_rejected() {
        let dials = vec![DialLayout::empty(12)];
        let result = SurfaceConfig::new(
            SurfaceSide::Left,
            DialKind::Cross { source: MotionSource::Dpad },
            dials,
            Arc::new(game_pad_theme()),
            gravity(),
            16.0,
        );
        assert_eq!(
            result.unwrap_err(),
            LayoutError::SlotOutOfRange { slot: 12, capacity: 12 }
        );
    }

    #[test]
    fn stick_cannot_be_primary() {
        let result = SurfaceConfig::new(
            SurfaceSide::Right,
            DialKind::Stick {
                source: MotionSource::AnalogRight,
                double_tap: None,
                rotation: None,
            },
            Vec::new(),
            Arc::new(game_pad_theme()),
            gravity(),
            16.0,
        );
        assert!(matches!(result, Err(LayoutError::InvalidPrimary(_))));
    }

    #[test]
    fn unused_sockets_become_placeholders() {
        let config = SurfaceConfig::new(
            SurfaceSide::Left,
            DialKind::Cross { source: MotionSource::Dpad },
            vec![DialLayout::socket(
                6,
                1.0,
                0.0,
                DialKind::SingleButton(ButtonSpec::new(LogicalCode::Start, "START")),
            )],
            Arc::new(game_pad_theme()),
            gravity(),
            16.0,
        )
        .unwrap();

        assert_eq!(config.dials().len(), SURFACE_SOCKETS as usize);
        let empties = config
            .dials()
            .iter()
            .filter(|d| matches!(d.kind, DialKind::Empty))
            .count();
        assert_eq!(empties, 11);
        assert_eq!(config.dial(6).unwrap().placement.angle_deg, 180.0);
    }

    #[test]
    fn spread_dial_covers_its_neighbour() {
        let stick = DialKind::Stick {
            source: MotionSource::AnalogLeft,
            double_tap: None,
            rotation: None,
        };
        let config = SurfaceConfig::new(
            SurfaceSide::Left,
            DialKind::Cross { source: MotionSource::Dpad },
            vec![DialLayout::spanning(11, 2, 2.2, 0.1, stick)],
            Arc::new(game_pad_theme()),
            gravity(),
            16.0,
        )
        .unwrap();

        assert_eq!(config.dials().len(), 11);
        assert_eq!(config.sockets(), (0..SURFACE_SOCKETS).collect::<Vec<_>>());
        assert!(config.dial(0).is_none());
        assert_eq!(config.dial_covering(0).unwrap().slot, 11);
    }

    #[test]
    fn overlapping_spread_is_rejected() {
        let dials = vec![
            DialLayout::socket(
                2,
                1.0,
                0.0,
                DialKind::DoubleButton(ButtonSpec::new(LogicalCode::ButtonR1, "R")),
            ),
            DialLayout::socket(
                3,
                1.0,
                0.0,
                DialKind::SingleButton(ButtonSpec::new(LogicalCode::Start, "START")),
            ),
        ];
        let result = SurfaceConfig::new(
            SurfaceSide::Right,
            DialKind::Cross { source: MotionSource::Dpad },
            dials,
            Arc::new(game_pad_theme()),
            gravity(),
            16.0,
        );
        assert_eq!(result.unwrap_err(), LayoutError::DuplicateSlot(3));
    }

    #[test]
    fn zero_spread_is_rejected() {
        let result = SurfaceConfig::new(
            SurfaceSide::Left,
            DialKind::Cross { source: MotionSource::Dpad },
            vec![DialLayout::spanning(5, 0, 1.0, 0.0, DialKind::Empty)],
            Arc::new(game_pad_theme()),
            gravity(),
            16.0,
        );
        assert_eq!(
            result.unwrap_err(),
            LayoutError::InvalidSpread { slot: 5, spread: 0 }
        );
    }
}
