//! Settings shared between the console, the input listener and the click loop

use parking_lot::Mutex;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::rate::RateConfig;
use crate::AutoclickError;

/// Which click action the loop performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickType {
    #[default]
    Single,
    Double,
}

impl ClickType {
    fn as_u8(self) -> u8 {
        match self {
            ClickType::Single => 0,
            ClickType::Double => 1,
        }
    }

    fn from_u8(value: u8) -> Self {
        if value == 1 {
            ClickType::Double
        } else {
            ClickType::Single
        }
    }
}

impl fmt::Display for ClickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClickType::Single => f.write_str("single"),
            ClickType::Double => f.write_str("double"),
        }
    }
}

impl FromStr for ClickType {
    type Err = AutoclickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(ClickType::Single),
            "double" => Ok(ClickType::Double),
            other => Err(AutoclickError::UnknownCommand(format!(
                "click type must be 'single' or 'double', got {:?}",
                other
            ))),
        }
    }
}

/// Consistent view of the settings taken once per loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub interval_ms: u64,
    pub click_type: ClickType,
    pub freeze_pointer: bool,
}

/// Live-editable click settings
///
/// Writers may run on any thread. The click loop reads a `Snapshot` at the top
/// of every iteration, so a change is picked up by the next click at the latest.
#[derive(Debug)]
pub struct ClickSettings {
    rate: Mutex<RateConfig>,
    click_type: AtomicU8,
    freeze_pointer: AtomicBool,
}

impl ClickSettings {
    pub fn new(rate: RateConfig, click_type: ClickType, freeze_pointer: bool) -> Self {
        Self {
            rate: Mutex::new(rate),
            click_type: AtomicU8::new(click_type.as_u8()),
            freeze_pointer: AtomicBool::new(freeze_pointer),
        }
    }

    pub fn set_rate_fields(
        &self,
        minutes: impl Into<String>,
        seconds: impl Into<String>,
        milliseconds: impl Into<String>,
    ) {
        self.rate.lock().set_fields(minutes, seconds, milliseconds);
    }

    /// Explicit apply of the rate fields (the "OK" button)
    pub fn apply_rate(&self) -> Result<u64, AutoclickError> {
        self.rate.lock().apply()
    }

    pub fn rate(&self) -> RateConfig {
        self.rate.lock().clone()
    }

    pub fn click_type(&self) -> ClickType {
        ClickType::from_u8(self.click_type.load(Ordering::SeqCst))
    }

    pub fn set_click_type(&self, click_type: ClickType) {
        self.click_type.store(click_type.as_u8(), Ordering::SeqCst);
    }

    pub fn freeze_pointer(&self) -> bool {
        self.freeze_pointer.load(Ordering::SeqCst)
    }

    pub fn set_freeze_pointer(&self, freeze: bool) {
        self.freeze_pointer.store(freeze, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            interval_ms: self.rate.lock().live_interval_ms(),
            click_type: self.click_type(),
            freeze_pointer: self.freeze_pointer(),
        }
    }
}

impl Default for ClickSettings {
    fn default() -> Self {
        Self::new(RateConfig::default(), ClickType::Single, true)
    }
}
