//! Click position recording
//!
//! While a session is active every mouse button press is appended to an
//! in-memory log. The log is cleared when a new session starts and is never
//! written anywhere.

use parking_lot::Mutex;
use rdev::Button;
use std::sync::Arc;
use tracing::{debug, info};

use crate::input_listener::{InputHub, MouseEvent, SubscriptionId};
use crate::settings::ClickType;

/// One recorded press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedClick {
    pub x: i32,
    pub y: i32,
    pub kind: ClickType,
}

impl RecordedClick {
    /// Left presses record as single clicks, every other button as double
    pub fn from_event(event: &MouseEvent) -> Self {
        let kind = if event.button == Button::Left {
            ClickType::Single
        } else {
            ClickType::Double
        };
        Self {
            x: event.x,
            y: event.y,
            kind,
        }
    }
}

#[derive(Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<RecordedClick>>>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Clear the log and subscribe to mouse presses; false if already recording
    pub fn start_recording(&self, hub: &InputHub) -> bool {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            return false;
        }

        self.log.lock().clear();
        let log = self.log.clone();
        let id = hub.subscribe_mouse(Arc::new(move |event: MouseEvent| {
            if !event.pressed {
                return;
            }
            let click = RecordedClick::from_event(&event);
            debug!("Recorded {} click at ({}, {})", click.kind, click.x, click.y);
            log.lock().push(click);
        }));
        *subscription = Some(id);

        info!("Started recording clicks");
        true
    }

    /// Unsubscribe; a second call is a no-op and returns false
    pub fn stop_recording(&self, hub: &InputHub) -> bool {
        let Some(id) = self.subscription.lock().take() else {
            return false;
        };
        hub.unsubscribe_mouse(id);

        let log = self.log.lock();
        info!(
            "Stopped recording clicks, {} recorded: {:?}",
            log.len(),
            *log
        );
        true
    }

    /// Snapshot of the log in arrival order
    pub fn recorded(&self) -> Vec<RecordedClick> {
        self.log.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdev::EventType;

    fn click_at(hub: &InputHub, x: f64, y: f64, button: Button) {
        hub.dispatch(&EventType::MouseMove { x, y });
        hub.dispatch(&EventType::ButtonPress(button));
        hub.dispatch(&EventType::ButtonRelease(button));
    }

    #[test]
    fn test_records_presses_in_order() {
        let hub = InputHub::new();
        let recorder = Recorder::new();

        click_at(&hub, 1.0, 1.0, Button::Left);
        assert!(recorder.start_recording(&hub));
        assert!(recorder.is_recording());
        click_at(&hub, 10.0, 20.0, Button::Left);
        click_at(&hub, 30.0, 40.0, Button::Right);
        click_at(&hub, 50.0, 60.0, Button::Middle);
        assert!(recorder.stop_recording(&hub));
        click_at(&hub, 70.0, 80.0, Button::Left);

        assert_eq!(
            recorder.recorded(),
            vec![
                RecordedClick { x: 10, y: 20, kind: ClickType::Single },
                RecordedClick { x: 30, y: 40, kind: ClickType::Double },
                RecordedClick { x: 50, y: 60, kind: ClickType::Double },
            ]
        );
    }

    #[test]
    fn test_stop_twice_is_noop() {
        let hub = InputHub::new();
        let recorder = Recorder::new();

        assert!(!recorder.stop_recording(&hub));
        recorder.start_recording(&hub);
        assert!(recorder.stop_recording(&hub));
        assert!(!recorder.stop_recording(&hub));
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_new_session_clears_log() {
        let hub = InputHub::new();
        let recorder = Recorder::new();

        recorder.start_recording(&hub);
        click_at(&hub, 5.0, 5.0, Button::Left);
        recorder.stop_recording(&hub);
        assert_eq!(recorder.recorded().len(), 1);

        recorder.start_recording(&hub);
        assert!(recorder.recorded().is_empty());
        click_at(&hub, 6.0, 6.0, Button::Left);
        recorder.stop_recording(&hub);
        assert_eq!(
            recorder.recorded(),
            vec![RecordedClick { x: 6, y: 6, kind: ClickType::Single }]
        );
    }

    #[test]
    fn test_start_while_recording_keeps_log() {
        let hub = InputHub::new();
        let recorder = Recorder::new();

        recorder.start_recording(&hub);
        click_at(&hub, 5.0, 5.0, Button::Left);
        assert!(!recorder.start_recording(&hub));
        click_at(&hub, 7.0, 7.0, Button::Left);
        recorder.stop_recording(&hub);

        // A single subscription, so each press appears once
        assert_eq!(recorder.recorded().len(), 2);
    }
}
