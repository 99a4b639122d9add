//! Click rate configuration
//!
//! The rate is entered as three raw text fields. `apply()` validates them and
//! caches the total; the click loop ignores the cache and re-derives the
//! interval from the raw fields on every iteration.

use tracing::{debug, warn};

use crate::AutoclickError;

/// Interval used by the click loop when the fields do not parse
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Total interval in milliseconds, `None` on overflow
pub fn interval_ms(minutes: u64, seconds: u64, milliseconds: u64) -> Option<u64> {
    minutes
        .checked_mul(60_000)?
        .checked_add(seconds.checked_mul(1_000)?)?
        .checked_add(milliseconds)
}

fn parse_field(name: &str, raw: &str) -> Result<u64, AutoclickError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| AutoclickError::InvalidRate(format!("{} = {:?}: {}", name, raw, e)))
}

/// Raw rate fields plus the last successfully applied interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateConfig {
    minutes: String,
    seconds: String,
    milliseconds: String,
    applied_ms: Option<u64>,
}

impl RateConfig {
    pub fn new(
        minutes: impl Into<String>,
        seconds: impl Into<String>,
        milliseconds: impl Into<String>,
    ) -> Self {
        Self {
            minutes: minutes.into(),
            seconds: seconds.into(),
            milliseconds: milliseconds.into(),
            applied_ms: None,
        }
    }

    /// Replace the raw fields; the applied interval is left alone
    pub fn set_fields(
        &mut self,
        minutes: impl Into<String>,
        seconds: impl Into<String>,
        milliseconds: impl Into<String>,
    ) {
        self.minutes = minutes.into();
        self.seconds = seconds.into();
        self.milliseconds = milliseconds.into();
    }

    pub fn fields(&self) -> (&str, &str, &str) {
        (&self.minutes, &self.seconds, &self.milliseconds)
    }

    /// Interval from the last successful `apply()`
    pub fn applied_ms(&self) -> Option<u64> {
        self.applied_ms
    }

    fn parse_fields(&self) -> Result<u64, AutoclickError> {
        let minutes = parse_field("minutes", &self.minutes)?;
        let seconds = parse_field("seconds", &self.seconds)?;
        let milliseconds = parse_field("milliseconds", &self.milliseconds)?;

        interval_ms(minutes, seconds, milliseconds).ok_or_else(|| {
            AutoclickError::InvalidRate(format!(
                "{}m {}s {}ms overflows",
                minutes, seconds, milliseconds
            ))
        })
    }

    /// Validate the fields and cache the interval
    ///
    /// On failure the previously applied interval stays in place.
    pub fn apply(&mut self) -> Result<u64, AutoclickError> {
        match self.parse_fields() {
            Ok(total) => {
                debug!("Applied click rate: {}ms", total);
                self.applied_ms = Some(total);
                Ok(total)
            }
            Err(e) => {
                warn!("Invalid input for click rate: {}", e);
                Err(e)
            }
        }
    }

    /// Interval derived from the current fields, falling back to
    /// `DEFAULT_INTERVAL_MS` without reporting anything
    pub fn live_interval_ms(&self) -> u64 {
        self.parse_fields().unwrap_or(DEFAULT_INTERVAL_MS)
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        Self::new("0", "1", "500")
    }
}
