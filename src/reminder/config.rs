use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_HOUR: u32 = 7;
const DEFAULT_MINUTE: u32 = 0;
const DEFAULT_GRACE_SECS: u64 = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value:?}")]
  Invalid { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
  pub hour: u32,
  pub minute: u32,
  /// Wait after a delivery before re-arming, so the platform can clear the fired trigger
  pub reschedule_grace: Duration,
  /// Sandboxed preview host that cannot register background triggers
  pub preview_host: bool,
}

impl Default for ReminderConfig {
  fn default() -> Self {
    Self {
      hour: DEFAULT_HOUR,
      minute: DEFAULT_MINUTE,
      reschedule_grace: Duration::from_secs(DEFAULT_GRACE_SECS),
      preview_host: false,
    }
  }
}

impl ReminderConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let hour = parse_var("REMINDER_HOUR", DEFAULT_HOUR)?;
    let minute = parse_var("REMINDER_MINUTE", DEFAULT_MINUTE)?;
    let grace_secs = parse_var("REMINDER_GRACE_SECS", DEFAULT_GRACE_SECS)?;

    if hour > 23 {
      return Err(invalid("REMINDER_HOUR", hour));
    }
    if minute > 59 {
      return Err(invalid("REMINDER_MINUTE", minute));
    }
    // A zero grace lets the re-arm race the platform clearing the fired trigger
    if grace_secs == 0 {
      return Err(invalid("REMINDER_GRACE_SECS", grace_secs));
    }

    let preview_host = match env::var("APP_PREVIEW_HOST") {
      Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
      Err(_) => false,
    };

    Ok(Self {
      hour,
      minute,
      reschedule_grace: Duration::from_secs(grace_secs),
      preview_host,
    })
  }

  pub fn reminder_time(&self) -> NaiveTime {
    NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
  }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
  match env::var(key) {
    Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| ConfigError::Invalid {
      key: key.to_string(),
      value: raw,
    }),
    _ => Ok(default),
  }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
  ConfigError::Invalid {
    key: key.to_string(),
    value: value.to_string(),
  }
}
