//! Fixed colour palette for the radial touch surfaces
//!
//! Colours are stored as straight (non-premultiplied) ARGB so the presentation
//! layer can hand them to any renderer unchanged.

use serde::{Deserialize, Serialize};

const ALPHA_FILL_LIGHT: f32 = 0.2;
const ALPHA_FILL_STRONG: f32 = 0.2;
const ALPHA_FILL_SIMULATED: f32 = 0.4;
const ALPHA_FILL_PRESSED: f32 = 0.6;

const ALPHA_STROKE: f32 = 0.9;
const ALPHA_STROKE_LIGHT: f32 = 0.15 * ALPHA_STROKE;
const ALPHA_STROKE_STRONG: f32 = 0.5 * ALPHA_STROKE;
const ALPHA_STROKE_TEXT: f32 = 0.8 * ALPHA_STROKE;

const STROKE_WIDTH_DP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    pub const BLACK: Argb = Argb::opaque(0, 0, 0);
    pub const WHITE: Argb = Argb::opaque(255, 255, 255);
    pub const RED: Argb = Argb::opaque(255, 0, 0);
    pub const BLUE: Argb = Argb::opaque(0, 0, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { a: 255, r, g, b }
    }

    /// Keeps the rgb channels and replaces alpha with `round(fraction * 255)`
    pub fn with_alpha(self, fraction: f32) -> Self {
        let alpha = (fraction.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a: alpha, ..self }
    }

    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub normal: Argb,
    pub normal_stroke: Argb,
    pub background: Argb,
    pub background_stroke: Argb,
    pub pressed: Argb,
    pub text: Argb,
    pub simulated: Argb,
    pub light: Argb,
    pub light_stroke: Argb,
    pub stroke_width_dp: f32,
}

/// Palette shared by both touch surfaces
pub fn game_pad_theme() -> Theme {
    let background = Argb::BLACK;
    let on_surface = Argb::WHITE;
    let primary = Argb::RED;
    let secondary = Argb::BLUE;

    Theme {
        normal: background.with_alpha(ALPHA_FILL_STRONG),
        normal_stroke: on_surface.with_alpha(ALPHA_STROKE_STRONG),
        background: background.with_alpha(ALPHA_FILL_LIGHT),
        background_stroke: on_surface.with_alpha(ALPHA_STROKE_LIGHT),
        pressed: primary.with_alpha(ALPHA_FILL_PRESSED),
        text: on_surface.with_alpha(ALPHA_STROKE_TEXT),
        simulated: secondary.with_alpha(ALPHA_FILL_SIMULATED),
        light: background.with_alpha(ALPHA_FILL_STRONG),
        light_stroke: on_surface.with_alpha(ALPHA_STROKE_LIGHT),
        stroke_width_dp: STROKE_WIDTH_DP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_is_deterministic() {
        assert_eq!(game_pad_theme(), game_pad_theme());
    }

    #[test]
    fn alpha_is_rounded_fraction() {
        let theme = game_pad_theme();
        assert_eq!(theme.normal.a, 51);
        assert_eq!(theme.simulated.a, 102);
        assert_eq!(theme.pressed.a, 153);
        // 0.45 * 255 = 114.75
        assert_eq!(theme.normal_stroke.a, 115);
        // 0.72 * 255 = 183.6
        assert_eq!(theme.text.a, 184);
        // 0.135 * 255 = 34.425
        assert_eq!(theme.background_stroke.a, 34);
    }

    #[test]
    fn rgb_channels_are_untouched() {
        let theme = game_pad_theme();
        assert_eq!((theme.pressed.r, theme.pressed.g, theme.pressed.b), (255, 0, 0));
        assert_eq!((theme.simulated.r, theme.simulated.g, theme.simulated.b), (0, 0, 255));
        assert_eq!(theme.text.to_u32() & 0x00FF_FFFF, 0x00FF_FFFF);
    }
}
