//! The two fixed control surfaces of the front-end
//!
//! Left: D-pad cross, SELECT, fast-forward, slow motion and the left analog
//! stick (double tap presses L3). Right: the four face buttons, R1, START and
//! the menu button.

use std::sync::Arc;
use tracing::info;

use crate::input::codes::{LogicalCode, MotionSource};
use crate::layout::dial::{
    ButtonSpec, DialKind, DialLayout, Gravity, LayoutError, RotationProcessor, SurfaceConfig,
    SurfaceSide,
};
use crate::theme::{game_pad_theme, Theme};

const SURFACE_MARGIN_DP: f32 = 16.0;

// The left stick's neutral axis sits 10 degrees off
fn left_stick_rotation(rotation: f32) -> f32 {
    rotation - 10.0
}

pub fn left_surface(theme: Arc<Theme>) -> Result<SurfaceConfig, LayoutError> {
    let dials = vec![
        DialLayout::socket(
            2,
            1.0,
            0.0,
            DialKind::SingleButton(ButtonSpec::new(LogicalCode::Select, "SELECT")),
        ),
        DialLayout::socket(
            3,
            1.0,
            0.0,
            DialKind::SingleButton(ButtonSpec::new(LogicalCode::FastForward, "FF")),
        ),
        DialLayout::socket(
            4,
            1.0,
            0.0,
            DialKind::SingleButton(ButtonSpec::new(LogicalCode::SlowMotion, "Slow")),
        ),
        DialLayout::socket(8, 1.0, 0.0, DialKind::Empty),
        DialLayout::spanning(
            9,
            2,
            2.2,
            0.1,
            DialKind::Stick {
                source: MotionSource::AnalogLeft,
                double_tap: Some(
                    ButtonSpec::new(LogicalCode::ThumbL, "L3").described("Left Stick"),
                ),
                rotation: Some(RotationProcessor(left_stick_rotation)),
            },
        ),
    ];

    SurfaceConfig::new(
        SurfaceSide::Left,
        DialKind::Cross {
            source: MotionSource::Dpad,
        },
        dials,
        theme,
        Gravity { x: -1.0, y: 1.0 },
        SURFACE_MARGIN_DP,
    )
}

pub fn right_surface(theme: Arc<Theme>) -> Result<SurfaceConfig, LayoutError> {
    let primary = DialKind::ButtonCluster(vec![
        ButtonSpec::new(LogicalCode::ButtonA, "A").described("Circle"),
        ButtonSpec::new(LogicalCode::ButtonX, "X").described("Triangle"),
        ButtonSpec::new(LogicalCode::ButtonY, "Y").described("Square"),
        ButtonSpec::new(LogicalCode::ButtonB, "B").described("Cross"),
    ]);

    let dials = vec![
        DialLayout::socket(
            2,
            1.0,
            0.0,
            DialKind::DoubleButton(ButtonSpec::new(LogicalCode::ButtonR1, "R")),
        ),
        DialLayout::socket(
            4,
            1.0,
            0.0,
            DialKind::SingleButton(ButtonSpec::new(LogicalCode::Start, "START")),
        ),
        DialLayout::socket(
            10,
            1.0,
            -0.1,
            DialKind::SingleButton(ButtonSpec::new(LogicalCode::Mode, "MENU")),
        ),
    ];

    SurfaceConfig::new(
        SurfaceSide::Right,
        primary,
        dials,
        theme,
        Gravity { x: 1.0, y: 1.0 },
        SURFACE_MARGIN_DP,
    )
}

/// Builds both surfaces around one shared theme
pub fn build_surfaces() -> Result<(SurfaceConfig, SurfaceConfig), LayoutError> {
    let theme = Arc::new(game_pad_theme());
    let left = left_surface(theme.clone())?;
    let right = right_surface(theme)?;
    info!(
        "Built surfaces: left with {} codes, right with {} codes",
        left.codes().len(),
        right.codes().len()
    );
    Ok((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::dial::SURFACE_SOCKETS;
    use std::collections::HashSet;

    fn assert_slots_unique(config: &SurfaceConfig) {
        let slots: HashSet<u8> = config.dials().iter().map(|d| d.slot).collect();
        assert_eq!(slots.len(), config.dials().len());
        assert_eq!(config.sockets(), (0..SURFACE_SOCKETS).collect::<Vec<_>>());
    }

    #[test]
    fn both_surfaces_fill_all_sockets_once() {
        let (left, right) = build_surfaces().unwrap();
        assert_slots_unique(&left);
        assert_slots_unique(&right);
    }

    #[test]
    fn left_surface_carries_speed_controls_and_stick() {
        let (left, _) = build_surfaces().unwrap();
        let codes = left.codes();
        assert!(codes.contains(&LogicalCode::FastForward));
        assert!(codes.contains(&LogicalCode::SlowMotion));
        assert!(codes.contains(&LogicalCode::Select));
        assert!(codes.contains(&LogicalCode::ThumbL));

        match &left.dial(9).unwrap().kind {
            DialKind::Stick {
                source, rotation, ..
            } => {
                assert_eq!(*source, MotionSource::AnalogLeft);
                assert_eq!(rotation.unwrap().apply(90.0), 80.0);
            }
            other => panic!("unexpected dial in slot 9: {other:?}"),
        }
        assert!(left.dial(10).is_none());
        assert_eq!(left.dial_covering(10).unwrap().slot, 9);
        assert_eq!(left.gravity(), Gravity { x: -1.0, y: 1.0 });
    }

    #[test]
    fn right_surface_primary_is_face_buttons() {
        let (_, right) = build_surfaces().unwrap();
        assert_eq!(
            right.primary().codes(),
            vec![
                LogicalCode::ButtonA,
                LogicalCode::ButtonX,
                LogicalCode::ButtonY,
                LogicalCode::ButtonB
            ]
        );
        assert_eq!(right.dial(10).unwrap().placement.radius_offset, -0.1);
        assert_eq!(right.dial(2).unwrap().placement.spread, 2);
        assert_eq!(right.dial_covering(3).unwrap().slot, 2);
        assert_eq!(right.gravity(), Gravity { x: 1.0, y: 1.0 });
    }
}
