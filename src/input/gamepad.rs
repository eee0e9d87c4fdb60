//! Physical gamepad adapter built on gilrs
//!
//! Polls gilrs on a blocking task and pushes key actions and motion samples into
//! [`PhysicalInput`](crate::input::physical::PhysicalInput). Buttons are
//! translated to their platform key codes, sticks to platform axes with the Y
//! axes flipped to the platform's down-positive convention.

use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::input::codes::{AxisId, KeyAction, LogicalCode};
use crate::input::events::MotionSample;
use crate::input::physical::PhysicalInputSender;

#[derive(Debug, thiserror::Error)]
pub enum GamepadError {
    #[error("Failed to initialize gilrs: {0}")]
    InitializationError(String),
}

pub struct GamepadCollector {
    gilrs: Gilrs,
    active_gamepad: Option<GamepadId>,
    sender: PhysicalInputSender,
    sample: MotionSample,
}

impl GamepadCollector {
    pub fn create(sender: PhysicalInputSender) -> Result<Self, GamepadError> {
        info!("Initializing gilrs controller interface");
        let gilrs = Gilrs::new().map_err(|e| {
            error!("Failed to initialize gilrs: {}", e);
            GamepadError::InitializationError(e.to_string())
        })?;

        let active_gamepad = gilrs.gamepads().next().map(|(id, gamepad)| {
            info!("Selected gamepad: {} ({})", gamepad.name(), id);
            id
        });
        if active_gamepad.is_none() {
            warn!("No gamepad connected, waiting for the first one");
        }

        Ok(Self {
            gilrs,
            active_gamepad,
            sender,
            sample: MotionSample::new(),
        })
    }

    /// Handles at most one pending gilrs event, returns whether one was found
    pub fn collect_next_event(&mut self) -> bool {
        let Some(Event { id, event, .. }) = self.gilrs.next_event() else {
            return false;
        };

        match self.active_gamepad {
            Some(active) if active != id => {
                debug!("Skipping event from non-active gamepad: {:?}", id);
                return true;
            }
            None => {
                info!("Adopting gamepad {:?} as active", id);
                self.active_gamepad = Some(id);
            }
            _ => {}
        }

        match event {
            EventType::ButtonPressed(button, _) => self.push_button(button, KeyAction::Down),
            EventType::ButtonReleased(button, _) => self.push_button(button, KeyAction::Up),
            EventType::AxisChanged(axis, value, _) => {
                if let Some((axis_id, value)) = map_axis(axis, value) {
                    self.sample.set_axis(axis_id, value);
                    self.sender.motion(self.sample.clone());
                } else {
                    debug!("Ignoring unsupported axis: {:?}", axis);
                }
            }
            EventType::Disconnected => {
                warn!("Gamepad {:?} disconnected", id);
                self.active_gamepad = None;
                self.sample = MotionSample::new();
            }
            other => debug!("Unhandled gilrs event: {:?}", other),
        }
        true
    }

    fn push_button(&self, button: Button, action: KeyAction) {
        match map_button(button) {
            Some(code) => {
                debug!("Gamepad button {:?} -> {} {:?}", button, code, action);
                self.sender.key(action, code.raw());
            }
            None => debug!("Ignoring unmapped button: {:?}", button),
        }
    }

    pub fn run_until_cancelled(&mut self, token: &CancellationToken) {
        info!("Starting gamepad collection loop");
        while !token.is_cancelled() {
            if !self.collect_next_event() {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
        info!("Gamepad collection loop stopped");
    }

    /// Runs the collector on a blocking task; gilrs is created on that thread
    pub fn spawn(sender: PhysicalInputSender, token: CancellationToken) -> JoinHandle<()> {
        tokio::task::spawn_blocking(move || match GamepadCollector::create(sender) {
            Ok(mut collector) => collector.run_until_cancelled(&token),
            Err(e) => error!("Gamepad collector not started: {}", e),
        })
    }
}

fn map_button(button: Button) -> Option<LogicalCode> {
    match button {
        Button::South => Some(LogicalCode::ButtonB),
        Button::East => Some(LogicalCode::ButtonA),
        Button::West => Some(LogicalCode::ButtonY),
        Button::North => Some(LogicalCode::ButtonX),
        Button::LeftTrigger => Some(LogicalCode::ButtonL1),
        Button::RightTrigger => Some(LogicalCode::ButtonR1),
        Button::LeftTrigger2 => Some(LogicalCode::ButtonL2),
        Button::RightTrigger2 => Some(LogicalCode::ButtonR2),
        Button::LeftThumb => Some(LogicalCode::ThumbL),
        Button::RightThumb => Some(LogicalCode::ThumbR),
        Button::Start => Some(LogicalCode::Start),
        Button::Select => Some(LogicalCode::Select),
        Button::Mode => Some(LogicalCode::Mode),
        Button::DPadUp => Some(LogicalCode::DPadUp),
        Button::DPadDown => Some(LogicalCode::DPadDown),
        Button::DPadLeft => Some(LogicalCode::DPadLeft),
        Button::DPadRight => Some(LogicalCode::DPadRight),
        _ => None,
    }
}

// gilrs reports Y up-positive
fn map_axis(axis: Axis, value: f32) -> Option<(AxisId, f32)> {
    match axis {
        Axis::LeftStickX => Some((AxisId::X, value)),
        Axis::LeftStickY => Some((AxisId::Y, -value)),
        Axis::RightStickX => Some((AxisId::Z, value)),
        Axis::RightStickY => Some((AxisId::Rz, -value)),
        Axis::DPadX => Some((AxisId::HatX, value)),
        Axis::DPadY => Some((AxisId::HatY, -value)),
        _ => None,
    }
}
