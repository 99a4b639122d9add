//! Toggle hotkey naming and rebinding

use parking_lot::Mutex;
use rdev::Key;
use std::sync::Arc;
use tracing::info;

use crate::input_listener::{HotkeyCallback, InputHub};
use crate::AutoclickError;

/// Display names for the keys that can be typed on the command line
const KEY_NAMES: &[(&str, Key)] = &[
    ("F1", Key::F1),
    ("F2", Key::F2),
    ("F3", Key::F3),
    ("F4", Key::F4),
    ("F5", Key::F5),
    ("F6", Key::F6),
    ("F7", Key::F7),
    ("F8", Key::F8),
    ("F9", Key::F9),
    ("F10", Key::F10),
    ("F11", Key::F11),
    ("F12", Key::F12),
    ("Escape", Key::Escape),
    ("Space", Key::Space),
    ("Tab", Key::Tab),
    ("Return", Key::Return),
    ("Backspace", Key::Backspace),
    ("Insert", Key::Insert),
    ("Delete", Key::Delete),
    ("Home", Key::Home),
    ("End", Key::End),
    ("PageUp", Key::PageUp),
    ("PageDown", Key::PageDown),
    ("Up", Key::UpArrow),
    ("Down", Key::DownArrow),
    ("Left", Key::LeftArrow),
    ("Right", Key::RightArrow),
    ("PrintScreen", Key::PrintScreen),
    ("ScrollLock", Key::ScrollLock),
    ("Pause", Key::Pause),
    ("CapsLock", Key::CapsLock),
    ("NumLock", Key::NumLock),
    ("ShiftLeft", Key::ShiftLeft),
    ("ShiftRight", Key::ShiftRight),
    ("ControlLeft", Key::ControlLeft),
    ("ControlRight", Key::ControlRight),
    ("Alt", Key::Alt),
    ("AltGr", Key::AltGr),
    ("MetaLeft", Key::MetaLeft),
    ("MetaRight", Key::MetaRight),
    ("A", Key::KeyA),
    ("B", Key::KeyB),
    ("C", Key::KeyC),
    ("D", Key::KeyD),
    ("E", Key::KeyE),
    ("F", Key::KeyF),
    ("G", Key::KeyG),
    ("H", Key::KeyH),
    ("I", Key::KeyI),
    ("J", Key::KeyJ),
    ("K", Key::KeyK),
    ("L", Key::KeyL),
    ("M", Key::KeyM),
    ("N", Key::KeyN),
    ("O", Key::KeyO),
    ("P", Key::KeyP),
    ("Q", Key::KeyQ),
    ("R", Key::KeyR),
    ("S", Key::KeyS),
    ("T", Key::KeyT),
    ("U", Key::KeyU),
    ("V", Key::KeyV),
    ("W", Key::KeyW),
    ("X", Key::KeyX),
    ("Y", Key::KeyY),
    ("Z", Key::KeyZ),
    ("0", Key::Num0),
    ("1", Key::Num1),
    ("2", Key::Num2),
    ("3", Key::Num3),
    ("4", Key::Num4),
    ("5", Key::Num5),
    ("6", Key::Num6),
    ("7", Key::Num7),
    ("8", Key::Num8),
    ("9", Key::Num9),
];

/// Parse a key name such as "F8", "space" or "q" (case-insensitive)
pub fn parse_key(name: &str) -> Result<Key, AutoclickError> {
    let name = name.trim();
    KEY_NAMES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, key)| *key)
        .ok_or_else(|| AutoclickError::UnknownKey(name.to_string()))
}

/// Display name of a key; keys outside the table use their debug form
pub fn key_name(key: Key) -> String {
    KEY_NAMES
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(n, _)| n.to_string())
        .unwrap_or_else(|| format!("{:?}", key))
}

/// Text of the hotkey label
pub fn hotkey_label(key: Key) -> String {
    format!("Hotkey: {}", key_name(key))
}

/// The currently bound toggle hotkey
///
/// Any key is accepted, including one that is already bound elsewhere.
pub struct HotkeyBinding {
    key: Mutex<Key>,
    on_press: HotkeyCallback,
}

impl HotkeyBinding {
    /// Create the binding and register `key` with the hub
    pub fn register(hub: &InputHub, key: Key, on_press: HotkeyCallback) -> Arc<Self> {
        hub.register_hotkey(key, on_press.clone());
        info!("{}", hotkey_label(key));
        Arc::new(Self {
            key: Mutex::new(key),
            on_press,
        })
    }

    pub fn key(&self) -> Key {
        *self.key.lock()
    }

    pub fn label(&self) -> String {
        hotkey_label(self.key())
    }

    /// Replace the hotkey: the old key is unregistered before the new one is
    /// registered. Returns the new label.
    pub fn rebind(&self, hub: &InputHub, new_key: Key) -> String {
        let mut key = self.key.lock();
        hub.unregister_hotkey(*key);
        hub.register_hotkey(new_key, self.on_press.clone());
        *key = new_key;

        let label = hotkey_label(new_key);
        info!("Hotkey changed, {}", label);
        label
    }

    /// Make the next key press on the global listener the new hotkey
    pub fn begin_capture(self: &Arc<Self>, hub: &InputHub) {
        info!("Press a key to use as the new hotkey...");
        let binding = Arc::clone(self);
        hub.capture_next_key(Box::new(move |hub, key| {
            binding.rebind(hub, key);
        }));
    }
}
