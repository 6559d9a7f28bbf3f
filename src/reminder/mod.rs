//! Daily Check-In Reminder
//!
//! Keeps at most one pending reminder trigger, aimed at the next configured
//! wall-clock time (07:00 by default).
//!
//! Platforms with calendar triggers get a single repeating trigger and the OS
//! re-arms it forever. Elsewhere only one-shot delay triggers exist, so the
//! scheduler listens for deliveries and arms the next one-shot after each
//! reminder fires:
//!
//! ```text
//! Unscheduled -> Scheduling -> Armed(native_daily)
//!                          \-> Armed(one_shot) --delivery--> Scheduling
//! ```
//!
//! Reminders are best-effort. Every failure is logged and reported as a
//! skipped outcome, never returned as an error.

pub mod clock;
pub mod config;

pub use clock::{next_fire_at, seconds_until, Clock, SystemClock};
pub use config::{ConfigError, ReminderConfig};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::models::{ChannelSpec, DeliveryEvent, NotificationContent, Recurrence, Trigger};
use crate::notifications::{NotificationCapability, NotificationService};

/// ---------------------------------------------------------------------------
/// Errors & Outcomes
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ReminderError {
  #[error("Notification capability unavailable: {0}")]
  CapabilityUnavailable(String),

  #[error("Notification permission denied")]
  PermissionDenied,

  #[error("Host cannot register background triggers")]
  UnsupportedHost,

  #[error("Scheduling failed: {0}")]
  SchedulingFailure(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
  UnsupportedHost,
  PermissionDenied,
  CapabilityUnavailable,
  SchedulingFailed,
}

impl From<&ReminderError> for SkipReason {
  fn from(e: &ReminderError) -> Self {
    match e {
      ReminderError::CapabilityUnavailable(_) => SkipReason::CapabilityUnavailable,
      ReminderError::PermissionDenied => SkipReason::PermissionDenied,
      ReminderError::UnsupportedHost => SkipReason::UnsupportedHost,
      ReminderError::SchedulingFailure(_) => SkipReason::SchedulingFailed,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmedReminder {
  pub trigger_id: String,
  pub recurrence: Recurrence,
  pub fire_at: DateTime<Local>,
  pub trigger: Trigger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduleOutcome {
  Armed(ArmedReminder),
  Skipped { reason: SkipReason },
}

impl ScheduleOutcome {
  pub fn armed(&self) -> Option<&ArmedReminder> {
    match self {
      ScheduleOutcome::Armed(armed) => Some(armed),
      ScheduleOutcome::Skipped { .. } => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "recurrence", rename_all = "snake_case")]
pub enum ReminderState {
  Unscheduled,
  Scheduling,
  Armed(Recurrence),
}

/// ---------------------------------------------------------------------------
/// Delivery Subscription
/// ---------------------------------------------------------------------------

/// Listener task for delivery events. Dropping it unsubscribes.
pub struct DeliverySubscription {
  task: JoinHandle<()>,
}

impl DeliverySubscription {
  pub fn is_active(&self) -> bool {
    !self.task.is_finished()
  }
}

impl Drop for DeliverySubscription {
  fn drop(&mut self) {
    self.task.abort();
  }
}

/// Held by the UI context that owns the reminder. Dropping it tears down the
/// delivery subscription so remounts never stack handlers.
pub struct ReminderSession {
  scheduler: Arc<ReminderScheduler>,
}

impl ReminderSession {
  pub fn scheduler(&self) -> &Arc<ReminderScheduler> {
    &self.scheduler
  }

  pub async fn ensure_scheduled(&self) -> ScheduleOutcome {
    self.scheduler.ensure_scheduled().await
  }
}

impl Drop for ReminderSession {
  fn drop(&mut self) {
    self.scheduler.teardown();
  }
}

/// ---------------------------------------------------------------------------
/// Scheduler
/// ---------------------------------------------------------------------------

pub struct ReminderScheduler {
  notifications: Arc<NotificationService>,
  config: ReminderConfig,
  clock: Arc<dyn Clock>,
  state: Mutex<ReminderState>,
  /// Serializes cancel-then-schedule so overlapping calls cannot interleave
  in_flight: tokio::sync::Mutex<()>,
  subscription: Mutex<Option<DeliverySubscription>>,
}

impl ReminderScheduler {
  pub fn new(notifications: Arc<NotificationService>, config: ReminderConfig) -> Self {
    Self::with_clock(notifications, config, Arc::new(SystemClock))
  }

  pub fn with_clock(
    notifications: Arc<NotificationService>,
    config: ReminderConfig,
    clock: Arc<dyn Clock>,
  ) -> Self {
    Self {
      notifications,
      config,
      clock,
      state: Mutex::new(ReminderState::Unscheduled),
      in_flight: tokio::sync::Mutex::new(()),
      subscription: Mutex::new(None),
    }
  }

  pub fn mount(self: &Arc<Self>) -> ReminderSession {
    ReminderSession {
      scheduler: Arc::clone(self),
    }
  }

  pub fn state(&self) -> ReminderState {
    *lock(&self.state)
  }

  pub fn is_subscribed(&self) -> bool {
    lock(&self.subscription)
      .as_ref()
      .is_some_and(DeliverySubscription::is_active)
  }

  /// Release the delivery subscription, if any. A pending one-shot stays with
  /// the platform and still fires once; it is re-armed on the next app start.
  pub fn teardown(&self) {
    if lock(&self.subscription).take().is_some() {
      tracing::debug!("Delivery subscription released");
    }
  }

  /// Idempotent entry point, called on every app start.
  pub async fn ensure_scheduled(self: &Arc<Self>) -> ScheduleOutcome {
    let _guard = self.in_flight.lock().await;
    let previous = self.state();
    self.set_state(ReminderState::Scheduling);

    let mut cleared = false;
    match self.arm(&mut cleared).await {
      Ok(armed) => {
        self.set_state(ReminderState::Armed(armed.recurrence));
        tracing::info!(
          fire_at = %armed.fire_at,
          recurrence = ?armed.recurrence,
          "Daily reminder armed"
        );
        ScheduleOutcome::Armed(armed)
      }
      Err(e) => {
        // Failing before cancel-all leaves the earlier trigger in place
        let state = match previous {
          ReminderState::Armed(recurrence) if !cleared => ReminderState::Armed(recurrence),
          _ => ReminderState::Unscheduled,
        };
        self.set_state(state);
        match e {
          ReminderError::UnsupportedHost | ReminderError::PermissionDenied => {
            tracing::info!(reason = %e, "Daily reminder not scheduled")
          }
          _ => tracing::warn!(error = %e, "Error scheduling daily reminder"),
        }
        ScheduleOutcome::Skipped {
          reason: SkipReason::from(&e),
        }
      }
    }
  }

  /// Re-arm after the daily reminder fires on platforms without calendar
  /// triggers. Returns `None` when the event needs no action.
  pub async fn on_delivery_event(self: &Arc<Self>, event: &DeliveryEvent) -> Option<ScheduleOutcome> {
    if !event.is_daily_reminder() {
      tracing::debug!(title = %event.title, "Ignoring unrelated delivery");
      return None;
    }

    let capability = self.notifications.get().await.ok()?;
    if capability.capabilities().calendar_triggers {
      tracing::debug!("Platform re-arms the daily reminder itself");
      return None;
    }

    self.set_state(ReminderState::Scheduling);
    tokio::time::sleep(self.config.reschedule_grace).await;
    Some(self.ensure_scheduled().await)
  }

  async fn arm(self: &Arc<Self>, cleared: &mut bool) -> Result<ArmedReminder, ReminderError> {
    if self.config.preview_host {
      return Err(ReminderError::UnsupportedHost);
    }

    let capability = self.notifications.get().await?;
    let platform = capability.capabilities();

    let mut permission = capability.permission_status().await?;
    if !permission.is_granted() {
      permission = capability.request_permission().await?;
    }
    if !permission.is_granted() {
      return Err(ReminderError::PermissionDenied);
    }

    if platform.requires_channel {
      capability.create_channel(&ChannelSpec::daily_reminder()).await?;
    }

    capability.cancel_all_pending().await?;
    *cleared = true;

    let now = self.clock.now();
    let fire_at = next_fire_at(&now, self.config.reminder_time());
    let trigger = if platform.calendar_triggers {
      Trigger::Calendar {
        hour: self.config.hour,
        minute: self.config.minute,
        repeats: true,
      }
    } else {
      Trigger::Interval {
        seconds: seconds_until(&now, &fire_at),
        repeats: false,
      }
    };

    let trigger_id = capability
      .schedule(NotificationContent::daily_reminder(), trigger.clone())
      .await?;

    let recurrence = trigger.recurrence();
    if recurrence == Recurrence::OneShot {
      self.ensure_subscribed(capability.as_ref());
    }

    Ok(ArmedReminder {
      trigger_id,
      recurrence,
      fire_at,
      trigger,
    })
  }

  fn ensure_subscribed(self: &Arc<Self>, capability: &dyn NotificationCapability) {
    let mut slot = lock(&self.subscription);
    if slot.as_ref().is_some_and(DeliverySubscription::is_active) {
      return;
    }

    let receiver = capability.subscribe();
    let task = tokio::spawn(listen_for_deliveries(Arc::downgrade(self), receiver));
    *slot = Some(DeliverySubscription { task });
    tracing::debug!("Subscribed to delivery events");
  }

  fn set_state(&self, state: ReminderState) {
    *lock(&self.state) = state;
  }
}

async fn listen_for_deliveries(
  scheduler: Weak<ReminderScheduler>,
  mut receiver: broadcast::Receiver<DeliveryEvent>,
) {
  loop {
    match receiver.recv().await {
      Ok(event) => {
        let Some(scheduler) = scheduler.upgrade() else {
          break;
        };
        scheduler.on_delivery_event(&event).await;
      }
      Err(RecvError::Lagged(skipped)) => {
        tracing::warn!(skipped, "Delivery listener lagged");
      }
      Err(RecvError::Closed) => break,
    }
  }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
