use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::input::codes::{AxisId, KeyAction, LogicalCode, MotionSource};

/// Raw event as emitted by a touch surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawSurfaceEvent {
    Button {
        code: LogicalCode,
        action: KeyAction,
    },
    Direction {
        source: MotionSource,
        x: f32,
        y: f32,
    },
}

/// Raw physical input with the time it was pushed by the adapter
#[derive(Debug, Clone)]
pub enum RawPhysicalEvent {
    Key {
        action: KeyAction,
        raw_code: i32,
        timestamp: DateTime<Local>,
    },
    Motion {
        sample: MotionSample,
        timestamp: DateTime<Local>,
    },
}

impl RawPhysicalEvent {
    pub fn timestamp(&self) -> DateTime<Local> {
        match self {
            RawPhysicalEvent::Key { timestamp, .. } => *timestamp,
            RawPhysicalEvent::Motion { timestamp, .. } => *timestamp,
        }
    }
}

/// One platform motion event: the current value of every axis the device reports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionSample {
    axes: HashMap<AxisId, f32>,
}

impl MotionSample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_axis(mut self, axis: AxisId, value: f32) -> Self {
        self.axes.insert(axis, value);
        self
    }

    pub fn set_axis(&mut self, axis: AxisId, value: f32) {
        self.axes.insert(axis, value);
    }

    /// Axes the device did not report read as 0.0
    pub fn axis_value(&self, axis: AxisId) -> f32 {
        self.axes.get(&axis).copied().unwrap_or(0.0)
    }
}

/// Source-independent input occurrence handed to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SemanticInputEvent {
    ButtonTransition {
        code: LogicalCode,
        pressed: bool,
    },
    DirectionalVector {
        source: MotionSource,
        x: f32,
        y: f32,
        port: u32,
    },
}

impl SemanticInputEvent {
    pub fn press(code: LogicalCode) -> Self {
        SemanticInputEvent::ButtonTransition {
            code,
            pressed: true,
        }
    }

    pub fn release(code: LogicalCode) -> Self {
        SemanticInputEvent::ButtonTransition {
            code,
            pressed: false,
        }
    }
}

/// Haptic feedback requested by the emulation core
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub port: u32,
    pub strength_weak: f32,
    pub strength_strong: f32,
}
