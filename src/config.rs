//! Configuration management for the autoclicker

use rdev::Key;

use crate::hotkey::parse_key;
use crate::rate::RateConfig;
use crate::settings::{ClickSettings, ClickType};
use crate::AutoclickError;

/// Startup configuration
///
/// Rate fields are kept as raw text, exactly as they would be typed into the
/// rate entry fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub minutes: String,
    pub seconds: String,
    pub milliseconds: String,

    /// Click action performed by the loop
    pub click_type: ClickType,

    /// Put the pointer back before every click
    pub freeze_pointer: bool,

    /// Name of the toggle hotkey, see `hotkey::parse_key`
    pub hotkey: String,

    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minutes: String::from("0"),
            seconds: String::from("1"),
            milliseconds: String::from("500"),
            click_type: ClickType::Single,
            freeze_pointer: true,
            hotkey: String::from("F8"),
            verbose: false,
        }
    }
}

impl Config {
    /// Set the raw rate fields
    pub fn with_rate(
        mut self,
        minutes: impl Into<String>,
        seconds: impl Into<String>,
        milliseconds: impl Into<String>,
    ) -> Self {
        self.minutes = minutes.into();
        self.seconds = seconds.into();
        self.milliseconds = milliseconds.into();
        self
    }

    pub fn with_click_type(mut self, click_type: ClickType) -> Self {
        self.click_type = click_type;
        self
    }

    pub fn with_freeze_pointer(mut self, freeze: bool) -> Self {
        self.freeze_pointer = freeze;
        self
    }

    pub fn with_hotkey(mut self, hotkey: impl Into<String>) -> Self {
        self.hotkey = hotkey.into();
        self
    }

    /// Enable verbose logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn hotkey_key(&self) -> Result<Key, AutoclickError> {
        parse_key(&self.hotkey)
    }

    /// Live settings seeded from this configuration
    pub fn click_settings(&self) -> ClickSettings {
        let rate = RateConfig::new(
            self.minutes.clone(),
            self.seconds.clone(),
            self.milliseconds.clone(),
        );
        ClickSettings::new(rate, self.click_type, self.freeze_pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_rate("1", "2", "3")
            .with_click_type(ClickType::Double)
            .with_freeze_pointer(false)
            .with_hotkey("F9")
            .with_verbose(true);

        assert_eq!(config.hotkey_key().unwrap(), Key::F9);
        assert!(config.verbose);

        let settings = config.click_settings();
        let snap = settings.snapshot();
        assert_eq!(snap.interval_ms, 62_003);
        assert_eq!(snap.click_type, ClickType::Double);
        assert!(!snap.freeze_pointer);
    }

    #[test]
    fn test_bad_hotkey() {
        let config = Config::default().with_hotkey("NotAKey");
        assert!(matches!(
            config.hotkey_key(),
            Err(AutoclickError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_malformed_rate_is_accepted_as_text() {
        let config = Config::default().with_rate("x", "1", "0");
        assert_eq!(config.minutes, "x");
        assert_eq!(
            config.click_settings().snapshot().interval_ms,
            crate::DEFAULT_INTERVAL_MS
        );
    }
}
