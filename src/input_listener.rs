//! Global input listening using rdev
//!
//! One background thread runs `rdev::listen` for the lifetime of the process
//! and hands every event to an `InputHub`. The hub turns raw events into
//! hotkey callbacks and mouse subscriptions, so registering a hotkey or
//! starting a recording never has to touch the listener thread itself.

use parking_lot::Mutex;
use rdev::{listen, Button, Event, EventType, Key};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info};

use crate::AutoclickError;

/// Called when a registered hotkey is pressed
pub type HotkeyCallback = Arc<dyn Fn() + Send + Sync>;

/// Called for every mouse button press and release
pub type MouseCallback = Arc<dyn Fn(MouseEvent) + Send + Sync>;

/// One-shot consumer of the next key press
pub type KeyCapture = Box<dyn FnOnce(&InputHub, Key) + Send>;

/// Handle returned by `subscribe_mouse`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Mouse button event with the pointer position at the time of the event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub x: i32,
    pub y: i32,
    pub button: Button,
    pub pressed: bool,
}

/// Routes global input events to hotkeys, mouse subscribers and key capture
#[derive(Default)]
pub struct InputHub {
    hotkeys: Mutex<Vec<(Key, HotkeyCallback)>>,
    mouse: Mutex<Vec<(SubscriptionId, MouseCallback)>>,
    capture: Mutex<Option<KeyCapture>>,
    held: Mutex<Vec<Key>>,
    pointer: Mutex<(f64, f64)>,
    next_id: AtomicU64,
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `callback` whenever `key` is pressed, regardless of focus
    pub fn register_hotkey(&self, key: Key, callback: HotkeyCallback) {
        debug!("Registering hotkey {:?}", key);
        self.hotkeys.lock().push((key, callback));
    }

    /// Remove every callback bound to `key`; returns whether any existed
    pub fn unregister_hotkey(&self, key: Key) -> bool {
        debug!("Unregistering hotkey {:?}", key);
        let mut hotkeys = self.hotkeys.lock();
        let before = hotkeys.len();
        hotkeys.retain(|(k, _)| *k != key);
        hotkeys.len() != before
    }

    pub fn is_registered(&self, key: Key) -> bool {
        self.hotkeys.lock().iter().any(|(k, _)| *k == key)
    }

    pub fn subscribe_mouse(&self, callback: MouseCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.mouse.lock().push((id, callback));
        id
    }

    /// Stop delivery to `id`; returns whether it was subscribed
    pub fn unsubscribe_mouse(&self, id: SubscriptionId) -> bool {
        let mut mouse = self.mouse.lock();
        let before = mouse.len();
        mouse.retain(|(sub, _)| *sub != id);
        mouse.len() != before
    }

    /// Hand the next key press to `capture` instead of the hotkeys
    pub fn capture_next_key(&self, capture: KeyCapture) {
        *self.capture.lock() = Some(capture);
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.lock().is_some()
    }

    /// Process one raw event
    ///
    /// Callbacks run on the calling thread with no hub lock held, so they may
    /// register, unregister or subscribe freely.
    pub fn dispatch(&self, event: &EventType) {
        match event {
            EventType::KeyPress(key) => self.key_pressed(*key),
            EventType::KeyRelease(key) => self.held.lock().retain(|k| k != key),
            EventType::MouseMove { x, y } => *self.pointer.lock() = (*x, *y),
            EventType::ButtonPress(button) => self.mouse_button(*button, true),
            EventType::ButtonRelease(button) => self.mouse_button(*button, false),
            EventType::Wheel { .. } => {}
        }
    }

    fn key_pressed(&self, key: Key) {
        {
            // Auto-repeat delivers presses without releases
            let mut held = self.held.lock();
            if held.contains(&key) {
                return;
            }
            held.push(key);
        }

        let capture = self.capture.lock().take();
        if let Some(capture) = capture {
            debug!("Captured key {:?}", key);
            capture(self, key);
            return;
        }

        let callbacks: Vec<HotkeyCallback> = self
            .hotkeys
            .lock()
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in callbacks {
            debug!("Hotkey {:?} pressed", key);
            callback();
        }
    }

    fn mouse_button(&self, button: Button, pressed: bool) {
        let (x, y) = *self.pointer.lock();
        let event = MouseEvent {
            x: x.round() as i32,
            y: y.round() as i32,
            button,
            pressed,
        };

        let callbacks: Vec<MouseCallback> =
            self.mouse.lock().iter().map(|(_, cb)| cb.clone()).collect();
        for callback in callbacks {
            callback(event);
        }
    }
}

/// Input listener that feeds global events into an `InputHub`
pub struct InputListener {
    hub: Arc<InputHub>,
}

impl InputListener {
    pub fn new(hub: Arc<InputHub>) -> Self {
        Self { hub }
    }

    /// Start listening for input events in a background thread
    ///
    /// `rdev::listen` never returns while it works, so the thread lives until
    /// the process exits. The handle only completes if listening failed.
    pub fn start(self) -> thread::JoinHandle<Result<(), AutoclickError>> {
        thread::spawn(move || {
            info!("Input listener started");

            let hub = self.hub;
            let callback = move |event: Event| hub.dispatch(&event.event_type);

            listen(callback).map_err(|e| {
                error!("Error in input listener: {:?}", e);
                AutoclickError::Listener(format!("{:?}", e))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, HotkeyCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let cb_count = count.clone();
        let cb: HotkeyCallback = Arc::new(move || {
            cb_count.fetch_add(1, Ordering::SeqCst);
        });
        (count, cb)
    }

    fn tap(hub: &InputHub, key: Key) {
        hub.dispatch(&EventType::KeyPress(key));
        hub.dispatch(&EventType::KeyRelease(key));
    }

    #[test]
    fn test_hotkey_fires_only_for_its_key() {
        let hub = InputHub::new();
        let (count, cb) = counter();
        hub.register_hotkey(Key::F8, cb);

        tap(&hub, Key::F8);
        tap(&hub, Key::F9);
        tap(&hub, Key::F8);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_auto_repeat_fires_once() {
        let hub = InputHub::new();
        let (count, cb) = counter();
        hub.register_hotkey(Key::F8, cb);

        for _ in 0..5 {
            hub.dispatch(&EventType::KeyPress(Key::F8));
        }
        hub.dispatch(&EventType::KeyRelease(Key::F8));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister_hotkey() {
        let hub = InputHub::new();
        let (count, cb) = counter();
        hub.register_hotkey(Key::F8, cb);
        assert!(hub.is_registered(Key::F8));
        assert!(hub.unregister_hotkey(Key::F8));
        assert!(!hub.unregister_hotkey(Key::F8));

        tap(&hub, Key::F8);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_capture_consumes_next_key() {
        let hub = InputHub::new();
        let (count, cb) = counter();
        hub.register_hotkey(Key::F8, cb);

        let captured = Arc::new(Mutex::new(None));
        let sink = captured.clone();
        hub.capture_next_key(Box::new(move |_, key| *sink.lock() = Some(key)));
        assert!(hub.is_capturing());

        tap(&hub, Key::F8);
        assert_eq!(*captured.lock(), Some(Key::F8));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!hub.is_capturing());

        tap(&hub, Key::F8);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mouse_events_carry_last_position() {
        let hub = InputHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = hub.subscribe_mouse(Arc::new(move |e| sink.lock().push(e)));

        hub.dispatch(&EventType::MouseMove { x: 10.4, y: 20.6 });
        hub.dispatch(&EventType::ButtonPress(Button::Left));
        hub.dispatch(&EventType::ButtonRelease(Button::Left));
        hub.dispatch(&EventType::Wheel {
            delta_x: 0,
            delta_y: 1,
        });

        assert!(hub.unsubscribe_mouse(id));
        assert!(!hub.unsubscribe_mouse(id));
        hub.dispatch(&EventType::ButtonPress(Button::Right));

        let seen = seen.lock();
        assert_eq!(
            *seen,
            vec![
                MouseEvent {
                    x: 10,
                    y: 21,
                    button: Button::Left,
                    pressed: true
                },
                MouseEvent {
                    x: 10,
                    y: 21,
                    button: Button::Left,
                    pressed: false
                },
            ]
        );
    }

    #[test]
    fn test_callback_may_reenter_hub() {
        let hub = Arc::new(InputHub::new());
        let (count, cb) = counter();
        let inner = hub.clone();
        hub.register_hotkey(
            Key::F8,
            Arc::new(move || {
                inner.unregister_hotkey(Key::F8);
                inner.register_hotkey(Key::F9, cb.clone());
            }),
        );

        tap(&hub, Key::F8);
        tap(&hub, Key::F9);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
