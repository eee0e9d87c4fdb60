//! Shared code tables for controller functions, key actions and motion axes
//!
//! The numeric values follow the platform key-code numbering that the emulation
//! core understands, so a [`LogicalCode`] can be handed to the core without a
//! second lookup table.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Controller function identifier shared by layouts, normalizer and dispatcher
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(i32)]
pub enum LogicalCode {
    DPadUp = 19,
    DPadDown = 20,
    DPadLeft = 21,
    DPadRight = 22,
    ButtonA = 96,
    ButtonB = 97,
    ButtonX = 99,
    ButtonY = 100,
    ButtonL1 = 102,
    ButtonR1 = 103,
    ButtonL2 = 104,
    ButtonR2 = 105,
    ThumbL = 106,
    ThumbR = 107,
    Start = 108,
    Select = 109,
    Mode = 110,
    /// Switches the core into fast-forward
    FastForward = 272,
    /// Switches the core into slow motion
    SlowMotion = 273,
}

impl LogicalCode {
    /// Codes that change the dispatcher's playback mode instead of only
    /// reaching the core as a key
    pub fn is_speed_control(self) -> bool {
        matches!(self, LogicalCode::FastForward | LogicalCode::SlowMotion)
    }

    /// Looks up a raw platform key code, `None` for codes outside the table
    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::try_from(raw).ok()
    }

    pub fn raw(self) -> i32 {
        self.into()
    }
}

impl fmt::Display for LogicalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.raw())
    }
}

/// Press/release action, numbered like the platform's key actions
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(i32)]
pub enum KeyAction {
    Down = 0,
    Up = 1,
}

impl KeyAction {
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            KeyAction::Down
        } else {
            KeyAction::Up
        }
    }

    pub fn is_pressed(self) -> bool {
        self == KeyAction::Down
    }
}

/// Axis group a directional vector belongs to
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(u8)]
pub enum MotionSource {
    Dpad = 0,
    AnalogLeft = 1,
    AnalogRight = 2,
}

/// Physical motion axes read from a platform motion sample
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(u8)]
pub enum AxisId {
    X = 0,
    Y = 1,
    Z = 11,
    Rz = 14,
    HatX = 15,
    HatY = 16,
}
