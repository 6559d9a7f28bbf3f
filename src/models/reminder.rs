use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Reminder Copy
/// ---------------------------------------------------------------------------

pub const REMINDER_TITLE: &str = "Good morning! 🌞";
pub const REMINDER_BODY: &str = "Time for your daily check-in. How are you feeling today?";

/// Stable prefix used to recognise the daily reminder among delivered notifications
pub const REMINDER_TITLE_PREFIX: &str = "Good morning!";

pub const CHANNEL_ID: &str = "daily-reminder";
pub const CHANNEL_NAME: &str = "Daily Reminder";

/// ---------------------------------------------------------------------------
/// Trigger Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
  /// Platform re-arms a calendar trigger every day on its own
  NativeDaily,
  /// Fires once after a delay; the app re-arms it after delivery
  OneShot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
  Calendar { hour: u32, minute: u32, repeats: bool },
  Interval { seconds: u64, repeats: bool },
}

impl Trigger {
  pub fn recurrence(&self) -> Recurrence {
    match self {
      Trigger::Calendar { repeats: true, .. } => Recurrence::NativeDaily,
      _ => Recurrence::OneShot,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
  Default,
  High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
  pub title: String,
  pub body: String,
  pub sound: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub priority: Option<Priority>,
}

impl NotificationContent {
  pub fn daily_reminder() -> Self {
    Self {
      title: REMINDER_TITLE.to_string(),
      body: REMINDER_BODY.to_string(),
      sound: true,
      priority: Some(Priority::High),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Channel & Presentation
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
  Low,
  Default,
  High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
  pub id: String,
  pub name: String,
  pub importance: Importance,
  pub vibration_pattern: Vec<u64>,
  pub light_color: String,
}

impl ChannelSpec {
  pub fn daily_reminder() -> Self {
    Self {
      id: CHANNEL_ID.to_string(),
      name: CHANNEL_NAME.to_string(),
      importance: Importance::High,
      vibration_pattern: vec![0, 250, 250, 250],
      light_color: "#3b82f6".to_string(),
    }
  }
}

/// How a notification shows while the app is in the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationOptions {
  pub show_alert: bool,
  pub play_sound: bool,
  pub set_badge: bool,
  pub show_banner: bool,
  pub show_list: bool,
}

impl Default for PresentationOptions {
  fn default() -> Self {
    Self {
      show_alert: true,
      play_sound: true,
      set_badge: false,
      show_banner: true,
      show_list: true,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Platform Surface
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
  Granted,
  Denied,
  Undetermined,
}

impl PermissionStatus {
  pub fn is_granted(&self) -> bool {
    matches!(self, PermissionStatus::Granted)
  }
}

/// What the host notification system can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCapabilities {
  pub calendar_triggers: bool,
  pub requires_channel: bool,
}

/// A local notification fired by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEvent {
  pub trigger_id: String,
  pub title: String,
  pub body: String,
  pub delivered_at: DateTime<Local>,
}

impl DeliveryEvent {
  pub fn is_daily_reminder(&self) -> bool {
    self.title.starts_with(REMINDER_TITLE_PREFIX)
  }
}
