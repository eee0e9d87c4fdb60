use tracing::info;

use crate::input::events::FeedbackEvent;

/// Consumer of haptic feedback coming back from the core
pub trait FeedbackHandler: Send {
    fn handle(&mut self, event: FeedbackEvent);
}

/// Default consumer: log and forget
#[derive(Debug, Default)]
pub struct LoggingFeedback {
    received: u64,
}

impl LoggingFeedback {
    pub fn received(&self) -> u64 {
        self.received
    }
}

impl FeedbackHandler for LoggingFeedback {
    fn handle(&mut self, event: FeedbackEvent) {
        self.received += 1;
        info!(
            "Received rumble event on port {}: weak {:.2}, strong {:.2}",
            event.port, event.strength_weak, event.strength_strong
        );
    }
}
