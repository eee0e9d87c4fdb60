use chrono::Local;
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::input::codes::KeyAction;
use crate::input::events::{MotionSample, RawPhysicalEvent};

pub type PhysicalEventStream = BoxStream<'static, RawPhysicalEvent>;

/// Push-based producer for keys and motion samples from physical devices
pub struct PhysicalInput {
    sender: broadcast::Sender<RawPhysicalEvent>,
}

impl PhysicalInput {
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        debug!("Created physical input channel with buffer capacity {}", buffer);
        Self { sender }
    }

    /// Handle for the platform adapter
    pub fn sender(&self) -> PhysicalInputSender {
        PhysicalInputSender {
            sender: self.sender.clone(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Only events pushed after this call are seen by the new stream
    pub fn produce_events(&self) -> PhysicalEventStream {
        debug!("New subscription on physical input");
        BroadcastStream::new(self.sender.subscribe())
            .filter_map(|item| async move {
                match item {
                    Ok(event) => Some(event),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!("Physical input subscriber lagged, skipped {} events", skipped);
                        None
                    }
                }
            })
            .boxed()
    }
}

#[derive(Clone)]
pub struct PhysicalInputSender {
    sender: broadcast::Sender<RawPhysicalEvent>,
}

impl PhysicalInputSender {
    pub fn key(&self, action: KeyAction, raw_code: i32) {
        self.push(RawPhysicalEvent::Key {
            action,
            raw_code,
            timestamp: Local::now(),
        });
    }

    pub fn motion(&self, sample: MotionSample) {
        self.push(RawPhysicalEvent::Motion {
            sample,
            timestamp: Local::now(),
        });
    }

    fn push(&self, event: RawPhysicalEvent) {
        if self.sender.send(event).is_err() {
            debug!("Physical input has no subscriber, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::codes::AxisId;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn pushed_events_arrive_in_order() {
        let input = PhysicalInput::new(8);
        let sender = input.sender();
        let mut events = input.produce_events();

        sender.key(KeyAction::Down, 96);
        sender.motion(MotionSample::new().with_axis(AxisId::X, 0.3));

        let first = timeout(Duration::from_millis(200), events.next())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            first,
            RawPhysicalEvent::Key {
                action: KeyAction::Down,
                raw_code: 96,
                ..
            }
        ));
        let second = timeout(Duration::from_millis(200), events.next())
            .await
            .unwrap()
            .unwrap();
        match second {
            RawPhysicalEvent::Motion { sample, .. } => {
                assert_eq!(sample.axis_value(AxisId::X), 0.3)
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn push_without_subscriber_is_silent() {
        let input = PhysicalInput::new(8);
        input.sender().key(KeyAction::Up, 108);
        assert_eq!(input.subscriber_count(), 0);
    }
}
