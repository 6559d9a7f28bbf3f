//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - A settable clock
//! - A recording fake of the platform notification system

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::broadcast;

use crate::models::{
  ChannelSpec, DeliveryEvent, NotificationContent, PermissionStatus, PlatformCapabilities,
  PresentationOptions, Trigger,
};
use crate::notifications::NotificationCapability;
use crate::reminder::{Clock, ReminderError};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Local wall-clock time on the given day
pub fn local_time(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
  Local
    .with_ymd_and_hms(year, month, day, hour, minute, 0)
    .earliest()
    .expect("valid local time")
}

pub struct FixedClock {
  now: Mutex<DateTime<Local>>,
}

impl FixedClock {
  pub fn new(now: DateTime<Local>) -> Self {
    Self { now: Mutex::new(now) }
  }

  pub fn set(&self, now: DateTime<Local>) {
    *self.now.lock().unwrap() = now;
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Local> {
    *self.now.lock().unwrap()
  }
}

/// ---------------------------------------------------------------------------
/// Fake Notification Platform
/// ---------------------------------------------------------------------------

/// Records every call and keeps pending triggers in a list.
/// `deliver` simulates the OS firing a trigger.
pub struct FakeNotifier {
  caps: PlatformCapabilities,
  permission: Mutex<PermissionStatus>,
  permission_response: Mutex<PermissionStatus>,
  permission_requests: AtomicUsize,
  channels: Mutex<Vec<ChannelSpec>>,
  pending: Mutex<Vec<(String, Trigger, NotificationContent)>>,
  presentation: Mutex<Option<PresentationOptions>>,
  cancel_calls: AtomicUsize,
  fail_schedule: AtomicBool,
  next_id: AtomicUsize,
  events: broadcast::Sender<DeliveryEvent>,
}

impl FakeNotifier {
  pub fn new(caps: PlatformCapabilities) -> Self {
    let (events, _) = broadcast::channel(16);
    Self {
      caps,
      permission: Mutex::new(PermissionStatus::Undetermined),
      permission_response: Mutex::new(PermissionStatus::Granted),
      permission_requests: AtomicUsize::new(0),
      channels: Mutex::new(Vec::new()),
      pending: Mutex::new(Vec::new()),
      presentation: Mutex::new(None),
      cancel_calls: AtomicUsize::new(0),
      fail_schedule: AtomicBool::new(false),
      next_id: AtomicUsize::new(1),
      events,
    }
  }

  /// What the user answers when prompted
  pub fn with_permission(mut self, response: PermissionStatus) -> Self {
    *self.permission_response.get_mut().unwrap() = response;
    self
  }

  /// User turns notifications off in system settings
  pub fn revoke_permission(&self) {
    *self.permission.lock().unwrap() = PermissionStatus::Denied;
    *self.permission_response.lock().unwrap() = PermissionStatus::Denied;
  }

  pub fn fail_schedule(&self, fail: bool) {
    self.fail_schedule.store(fail, Ordering::SeqCst);
  }

  pub fn pending(&self) -> Vec<(String, Trigger)> {
    self
      .pending
      .lock()
      .unwrap()
      .iter()
      .map(|(id, trigger, _)| (id.clone(), trigger.clone()))
      .collect()
  }

  pub fn channels(&self) -> Vec<ChannelSpec> {
    self.channels.lock().unwrap().clone()
  }

  pub fn presentation(&self) -> Option<PresentationOptions> {
    *self.presentation.lock().unwrap()
  }

  pub fn cancel_calls(&self) -> usize {
    self.cancel_calls.load(Ordering::SeqCst)
  }

  pub fn permission_requests(&self) -> usize {
    self.permission_requests.load(Ordering::SeqCst)
  }

  pub fn subscriber_count(&self) -> usize {
    self.events.receiver_count()
  }

  /// Fire a pending trigger. One-shots are consumed, repeating calendar triggers stay.
  pub fn deliver(&self, trigger_id: &str) {
    let content = {
      let mut pending = self.pending.lock().unwrap();
      let Some(idx) = pending.iter().position(|(id, _, _)| id == trigger_id) else {
        panic!("no pending trigger {}", trigger_id);
      };
      if pending[idx].1.recurrence() == crate::models::Recurrence::OneShot {
        pending.remove(idx).2
      } else {
        pending[idx].2.clone()
      }
    };

    let _ = self.events.send(DeliveryEvent {
      trigger_id: trigger_id.to_string(),
      title: content.title,
      body: content.body,
      delivered_at: Local::now(),
    });
  }
}

#[async_trait]
impl NotificationCapability for FakeNotifier {
  fn capabilities(&self) -> PlatformCapabilities {
    self.caps
  }

  async fn configure_presentation(&self, options: PresentationOptions) -> Result<(), ReminderError> {
    *self.presentation.lock().unwrap() = Some(options);
    Ok(())
  }

  async fn permission_status(&self) -> Result<PermissionStatus, ReminderError> {
    Ok(*self.permission.lock().unwrap())
  }

  async fn request_permission(&self) -> Result<PermissionStatus, ReminderError> {
    self.permission_requests.fetch_add(1, Ordering::SeqCst);
    let mut permission = self.permission.lock().unwrap();
    *permission = *self.permission_response.lock().unwrap();
    Ok(*permission)
  }

  async fn create_channel(&self, spec: &ChannelSpec) -> Result<(), ReminderError> {
    let mut channels = self.channels.lock().unwrap();
    match channels.iter_mut().find(|c| c.id == spec.id) {
      Some(existing) => *existing = spec.clone(),
      None => channels.push(spec.clone()),
    }
    Ok(())
  }

  async fn cancel_all_pending(&self) -> Result<(), ReminderError> {
    self.cancel_calls.fetch_add(1, Ordering::SeqCst);
    self.pending.lock().unwrap().clear();
    Ok(())
  }

  async fn schedule(&self, content: NotificationContent, trigger: Trigger) -> Result<String, ReminderError> {
    if self.fail_schedule.load(Ordering::SeqCst) {
      return Err(ReminderError::SchedulingFailure("quota exceeded".into()));
    }
    let id = format!("fake-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
    self.pending.lock().unwrap().push((id.clone(), trigger, content));
    Ok(id)
  }

  fn subscribe(&self) -> broadcast::Receiver<DeliveryEvent> {
    self.events.subscribe()
  }
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Timelike;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> =
      sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = 'kv_store'")
        .fetch_all(&pool)
        .await
        .expect("Failed to query tables");

    assert_eq!(tables.len(), 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_fixed_clock_can_be_moved() {
    let clock = FixedClock::new(local_time(2025, 6, 1, 6, 0));
    assert_eq!(clock.now().hour(), 6);
    clock.set(local_time(2025, 6, 1, 9, 30));
    assert_eq!((clock.now().hour(), clock.now().minute()), (9, 30));
  }
}
