use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::dispatch::emulator::{CoreError, EmulationCore};
use crate::input::codes::{KeyAction, LogicalCode};
use crate::input::events::SemanticInputEvent;

/// Playback-rate modifiers currently applied to the core
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchMode {
    pub frame_rate_multiplier: u32,
    pub slow_factor: f32,
}

impl DispatchMode {
    pub const NEUTRAL: DispatchMode = DispatchMode {
        frame_rate_multiplier: 1,
        slow_factor: 1.0,
    };
}

impl Default for DispatchMode {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherSettings {
    /// Frame-rate multiplier while fast-forward is engaged
    pub fast_forward_multiplier: u32,
    /// Speed factor while slow motion is engaged
    pub slow_motion_factor: f32,
    /// Whether releasing an ordinary button also cancels a speed mode
    pub reset_on_release: bool,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            fast_forward_multiplier: 5,
            slow_motion_factor: 0.8,
            reset_on_release: true,
        }
    }
}

/// Forwards normalized events to the emulation core
///
/// Owns the [`DispatchMode`]. Fast-forward and slow motion are modes, not
/// one-shot events: pressing either switches the mode, releasing it keeps the
/// mode, and any other button activity returns to neutral.
pub struct CoreInputDispatcher {
    core: Arc<dyn EmulationCore>,
    settings: DispatcherSettings,
    mode: DispatchMode,
    forwarded: u64,
}

impl CoreInputDispatcher {
    pub fn new(core: Arc<dyn EmulationCore>, settings: Option<DispatcherSettings>) -> Self {
        let settings = settings.unwrap_or_default();
        info!("Creating core input dispatcher with settings: {:?}", settings);

        let mode = DispatchMode::NEUTRAL;
        core.set_frame_speed(mode.frame_rate_multiplier);
        core.set_slow_speed(mode.slow_factor);

        Self {
            core,
            settings,
            mode,
            forwarded: 0,
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    /// Number of events handed to the core so far
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    fn next_mode(&self, code: LogicalCode, pressed: bool) -> DispatchMode {
        match (code, pressed) {
            (LogicalCode::FastForward, true) => DispatchMode {
                frame_rate_multiplier: self.settings.fast_forward_multiplier,
                slow_factor: 1.0,
            },
            (LogicalCode::SlowMotion, true) => DispatchMode {
                frame_rate_multiplier: 1,
                slow_factor: self.settings.slow_motion_factor,
            },
            (LogicalCode::FastForward | LogicalCode::SlowMotion, false) => self.mode,
            (_, false) if !self.settings.reset_on_release => self.mode,
            _ => DispatchMode::NEUTRAL,
        }
    }

    fn apply_mode(&mut self, next: DispatchMode) {
        if next == self.mode {
            return;
        }
        info!("Dispatch mode {:?} -> {:?}", self.mode, next);
        if next.frame_rate_multiplier != self.mode.frame_rate_multiplier {
            self.core.set_frame_speed(next.frame_rate_multiplier);
        }
        if next.slow_factor != self.mode.slow_factor {
            self.core.set_slow_speed(next.slow_factor);
        }
        self.mode = next;
    }

    /// Updates the mode, then performs exactly one forwarding call
    ///
    /// A core error is returned as-is and never retried: a stale press or
    /// release delivered late would corrupt the emulated controller state.
    pub fn dispatch(&mut self, event: &SemanticInputEvent) -> Result<(), CoreError> {
        let result = match *event {
            SemanticInputEvent::ButtonTransition { code, pressed } => {
                let next = self.next_mode(code, pressed);
                self.apply_mode(next);
                let action = KeyAction::from_pressed(pressed);
                debug!("Forwarding key {} {:?}", code, action);
                self.core.send_key_event(action, code)
            }
            SemanticInputEvent::DirectionalVector { source, x, y, port } => {
                debug!(
                    "Forwarding motion {:?} ({:.3}, {:.3}) on port {}",
                    source, x, y, port
                );
                self.core.send_motion_event(source, x, y, port)
            }
        };

        match result {
            Ok(()) => {
                self.forwarded += 1;
                Ok(())
            }
            Err(e) => {
                error!("Core rejected {:?}: {}", event, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::emulator::FeedbackStream;
    use crate::input::codes::MotionSource;
    use futures::stream::{self, StreamExt};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Key(KeyAction, LogicalCode),
        Motion(MotionSource, f32, f32, u32),
        FrameSpeed(u32),
        SlowSpeed(f32),
    }

    #[derive(Default)]
    struct RecordingCore {
        calls: Mutex<Vec<Call>>,
        reject_keys: bool,
    }

    impl RecordingCore {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl EmulationCore for RecordingCore {
        fn send_key_event(&self, action: KeyAction, code: LogicalCode) -> Result<(), CoreError> {
            if self.reject_keys {
                return Err(CoreError::SessionClosed("core stopped".to_string()));
            }
            self.calls.lock().unwrap().push(Call::Key(action, code));
            Ok(())
        }

        fn send_motion_event(
            &self,
            source: MotionSource,
            x: f32,
            y: f32,
            port: u32,
        ) -> Result<(), CoreError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Motion(source, x, y, port));
            Ok(())
        }

        fn set_frame_speed(&self, multiplier: u32) {
            self.calls.lock().unwrap().push(Call::FrameSpeed(multiplier));
        }

        fn set_slow_speed(&self, factor: f32) {
            self.calls.lock().unwrap().push(Call::SlowSpeed(factor));
        }

        fn produce_feedback(&self) -> FeedbackStream {
            stream::empty().boxed()
        }
    }

    fn dispatcher() -> (Arc<RecordingCore>, CoreInputDispatcher) {
        let core = Arc::new(RecordingCore::default());
        let dispatcher = CoreInputDispatcher::new(core.clone(), None);
        (core, dispatcher)
    }

    fn key_calls(core: &RecordingCore) -> Vec<Call> {
        core.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Key(..)))
            .collect()
    }

    #[test]
    fn fast_forward_press_sets_multiplier_and_forwards_once() {
        let (core, mut dispatcher) = dispatcher();
        dispatcher
            .dispatch(&SemanticInputEvent::press(LogicalCode::FastForward))
            .unwrap();

        assert_eq!(dispatcher.mode().frame_rate_multiplier, 5);
        assert_eq!(
            key_calls(&core),
            vec![Call::Key(KeyAction::Down, LogicalCode::FastForward)]
        );
        assert!(core.calls().contains(&Call::FrameSpeed(5)));
    }

    #[test]
    fn any_other_button_cancels_fast_forward() {
        let (_, mut dispatcher) = dispatcher();
        dispatcher
            .dispatch(&SemanticInputEvent::press(LogicalCode::FastForward))
            .unwrap();
        dispatcher
            .dispatch(&SemanticInputEvent::release(LogicalCode::ButtonA))
            .unwrap();
        assert_eq!(dispatcher.mode(), DispatchMode::NEUTRAL);
    }

    #[test]
    fn releasing_fast_forward_keeps_the_mode() {
        let (_, mut dispatcher) = dispatcher();
        dispatcher
            .dispatch(&SemanticInputEvent::press(LogicalCode::FastForward))
            .unwrap();
        dispatcher
            .dispatch(&SemanticInputEvent::release(LogicalCode::FastForward))
            .unwrap();
        assert_eq!(dispatcher.mode().frame_rate_multiplier, 5);
    }

    #[test]
    fn slow_motion_then_other_release_returns_to_neutral() {
        let (core, mut dispatcher) = dispatcher();
        dispatcher
            .dispatch(&SemanticInputEvent::press(LogicalCode::SlowMotion))
            .unwrap();
        assert_eq!(
            dispatcher.mode(),
            DispatchMode {
                frame_rate_multiplier: 1,
                slow_factor: 0.8
            }
        );

        dispatcher
            .dispatch(&SemanticInputEvent::release(LogicalCode::Start))
            .unwrap();
        assert_eq!(dispatcher.mode(), DispatchMode::NEUTRAL);
        assert_eq!(
            core.calls(),
            vec![
                Call::FrameSpeed(1),
                Call::SlowSpeed(1.0),
                Call::SlowSpeed(0.8),
                Call::Key(KeyAction::Down, LogicalCode::SlowMotion),
                Call::SlowSpeed(1.0),
                Call::Key(KeyAction::Up, LogicalCode::Start),
            ]
        );
    }

    #[test]
    fn release_can_be_excluded_from_reset() {
        let core = Arc::new(RecordingCore::default());
        let mut dispatcher = CoreInputDispatcher::new(
            core,
            Some(DispatcherSettings {
                reset_on_release: false,
                ..Default::default()
            }),
        );
        dispatcher
            .dispatch(&SemanticInputEvent::press(LogicalCode::FastForward))
            .unwrap();
        dispatcher
            .dispatch(&SemanticInputEvent::release(LogicalCode::ButtonB))
            .unwrap();
        assert_eq!(dispatcher.mode().frame_rate_multiplier, 5);

        dispatcher
            .dispatch(&SemanticInputEvent::press(LogicalCode::ButtonB))
            .unwrap();
        assert_eq!(dispatcher.mode(), DispatchMode::NEUTRAL);
    }

    #[test]
    fn vectors_pass_through_without_mode_change() {
        let (core, mut dispatcher) = dispatcher();
        dispatcher
            .dispatch(&SemanticInputEvent::press(LogicalCode::FastForward))
            .unwrap();
        dispatcher
            .dispatch(&SemanticInputEvent::DirectionalVector {
                source: MotionSource::AnalogLeft,
                x: 0.5,
                y: -0.5,
                port: 0,
            })
            .unwrap();

        assert_eq!(dispatcher.mode().frame_rate_multiplier, 5);
        assert_eq!(
            core.calls().last(),
            Some(&Call::Motion(MotionSource::AnalogLeft, 0.5, -0.5, 0))
        );
        assert_eq!(dispatcher.forwarded(), 2);
    }

    #[test]
    fn core_errors_propagate() {
        let core = Arc::new(RecordingCore {
            reject_keys: true,
            ..Default::default()
        });
        let mut dispatcher = CoreInputDispatcher::new(core, None);
        let result = dispatcher.dispatch(&SemanticInputEvent::press(LogicalCode::Start));
        assert!(matches!(result, Err(CoreError::SessionClosed(_))));
        assert_eq!(dispatcher.forwarded(), 0);
    }
}
