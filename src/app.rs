//! Application state behind the console
//!
//! Owns the toggle controller, the input hub with the toggle hotkey, and the
//! recorder, and executes console commands against them.

use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::console::{Command, HELP};
use crate::hotkey::HotkeyBinding;
use crate::input_listener::InputHub;
use crate::input_simulator::MouseBackend;
use crate::recorder::Recorder;
use crate::toggle::{ToggleController, ToggleState};
use crate::AutoclickError;

/// Result of executing one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

pub struct App<M: MouseBackend + 'static> {
    controller: Arc<ToggleController<M>>,
    hub: Arc<InputHub>,
    hotkey: Arc<HotkeyBinding>,
    recorder: Recorder,
}

impl<M: MouseBackend + 'static> App<M> {
    /// Build the app and register the toggle hotkey with a fresh hub
    pub fn new(mouse: M, config: &Config) -> Result<Self, AutoclickError> {
        Self::with_hub(mouse, config, Arc::new(InputHub::new()))
    }

    pub fn with_hub(
        mouse: M,
        config: &Config,
        hub: Arc<InputHub>,
    ) -> Result<Self, AutoclickError> {
        let key = config.hotkey_key()?;
        let controller = Arc::new(ToggleController::new(
            mouse,
            Arc::new(config.click_settings()),
        ));

        let weak = Arc::downgrade(&controller);
        let hotkey = HotkeyBinding::register(
            &hub,
            key,
            Arc::new(move || {
                if let Some(controller) = weak.upgrade() {
                    let state = controller.toggle();
                    info!("Hotkey toggled autoclicker: {}", state);
                }
            }),
        );

        Ok(Self {
            controller,
            hub,
            hotkey,
            recorder: Recorder::new(),
        })
    }

    pub fn hub(&self) -> &Arc<InputHub> {
        &self.hub
    }

    pub fn controller(&self) -> &Arc<ToggleController<M>> {
        &self.controller
    }

    pub fn hotkey(&self) -> &Arc<HotkeyBinding> {
        &self.hotkey
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn execute(&self, command: Command) -> Result<Reply, AutoclickError> {
        let settings = self.controller.settings();

        let text = match command {
            Command::Start => {
                if self.controller.start() {
                    "Autoclicker started".to_string()
                } else {
                    "Autoclicker is already running".to_string()
                }
            }
            Command::Stop => {
                if self.controller.stop() {
                    format!(
                        "Autoclicker stopped after {} clicks",
                        self.controller.last_run_clicks()
                    )
                } else {
                    "Autoclicker is not running".to_string()
                }
            }
            Command::Toggle => format!("Autoclicker {}", self.controller.toggle()),
            Command::Rate {
                minutes,
                seconds,
                milliseconds,
            } => {
                settings.set_rate_fields(minutes, seconds, milliseconds);
                format!(
                    "Click rate fields set, next interval {}ms",
                    settings.snapshot().interval_ms
                )
            }
            Command::Apply => format!("Click rate applied: {}ms", settings.apply_rate()?),
            Command::CaptureHotkey => {
                self.hotkey.begin_capture(&self.hub);
                "Press a key to use as the new hotkey".to_string()
            }
            Command::SetHotkey(key) => self.hotkey.rebind(&self.hub, key),
            Command::Freeze(freeze) => {
                settings.set_freeze_pointer(freeze);
                format!("Freeze pointer: {}", if freeze { "on" } else { "off" })
            }
            Command::SetClickType(kind) => {
                settings.set_click_type(kind);
                format!("Click type: {}", kind)
            }
            Command::RecordStart => {
                if self.recorder.start_recording(&self.hub) {
                    "Recording clicks".to_string()
                } else {
                    "Already recording".to_string()
                }
            }
            Command::RecordStop => {
                if self.recorder.stop_recording(&self.hub) {
                    format!("Recorded {} clicks", self.recorder.recorded().len())
                } else {
                    "Not recording".to_string()
                }
            }
            Command::Recorded => self.recorded_text(),
            Command::Status => self.status(),
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    fn recorded_text(&self) -> String {
        let clicks = self.recorder.recorded();
        if clicks.is_empty() {
            return "No clicks recorded".to_string();
        }
        let mut text = String::new();
        for (i, click) in clicks.iter().enumerate() {
            let _ = writeln!(
                text,
                "{:>3}: {} click at ({}, {})",
                i + 1,
                click.kind,
                click.x,
                click.y
            );
        }
        text.trim_end().to_string()
    }

    /// Current state, with Start/Stop availability mirroring the toggle state
    pub fn status(&self) -> String {
        let settings = self.controller.settings();
        let rate = settings.rate();
        let (minutes, seconds, milliseconds) = rate.fields();
        let state = self.controller.state();
        let (start, stop) = match state {
            ToggleState::Idle => ("enabled", "disabled"),
            ToggleState::Running => ("disabled", "enabled"),
        };
        let applied = rate
            .applied_ms()
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "not applied".to_string());

        let mut text = String::new();
        let _ = writeln!(text, "State: {} (Start {}, Stop {})", state, start, stop);
        let _ = writeln!(
            text,
            "Click Rate (min, sec, ms): {} {} {} (applied: {})",
            minutes, seconds, milliseconds, applied
        );
        let _ = writeln!(text, "Click type: {}", settings.click_type());
        let _ = writeln!(
            text,
            "Freeze pointer: {}",
            if settings.freeze_pointer() { "on" } else { "off" }
        );
        let _ = writeln!(text, "{}", self.hotkey.label());
        let _ = write!(
            text,
            "Recording: {} ({} clicks recorded)",
            if self.recorder.is_recording() { "on" } else { "off" },
            self.recorder.recorded().len()
        );
        text
    }

    /// Stop clicking and recording
    pub fn shutdown(&self) {
        self.controller.stop();
        self.recorder.stop_recording(&self.hub);
    }
}
