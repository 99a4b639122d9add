//! Autoclicker - interval mouse clicking with a global toggle hotkey
//!
//! This library provides components for:
//! - Rate configuration (minutes/seconds/milliseconds text fields)
//! - The background click loop and its toggle controller
//! - Global input listening (hotkey dispatch, mouse subscriptions)
//! - Input simulation (synthetic clicks, pointer query/warp)
//! - Click position recording

pub mod app;
pub mod click_loop;
pub mod config;
pub mod console;
pub mod hotkey;
pub mod input_listener;
pub mod input_simulator;
pub mod rate;
pub mod recorder;
pub mod settings;
pub mod toggle;

pub use app::{App, Reply};
pub use config::Config;
pub use console::Command;
pub use hotkey::{hotkey_label, key_name, parse_key, HotkeyBinding};
pub use input_listener::{InputHub, InputListener, MouseEvent};
pub use input_simulator::{MouseBackend, XTestMouse};
pub use rate::{interval_ms, RateConfig, DEFAULT_INTERVAL_MS};
pub use recorder::{RecordedClick, Recorder};
pub use settings::{ClickSettings, ClickType};
pub use toggle::{ToggleController, ToggleState};

use thiserror::Error;

/// Main error type for the autoclicker
#[derive(Error, Debug)]
pub enum AutoclickError {
    #[error("Invalid click rate: {0}")]
    InvalidRate(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("X11 display error: {0}")]
    Display(String),

    #[error("Input listener error: {0}")]
    Listener(String),

    #[error("Channel error: {0}")]
    Channel(String),
}
