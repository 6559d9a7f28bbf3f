//! In-process notification backend driven by tokio timers.
//!
//! Only one-shot delay triggers are supported, which is what the desktop shell
//! has available. Deliveries only happen while the process is alive.

use async_trait::async_trait;
use chrono::Local;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::NotificationCapability;
use crate::models::{
  ChannelSpec, DeliveryEvent, NotificationContent, PermissionStatus, PlatformCapabilities, Trigger,
};
use crate::reminder::ReminderError;

const EVENT_BUFFER: usize = 16;

type PendingMap = Arc<Mutex<HashMap<String, JoinHandle<()>>>>;

pub struct TimerNotifier {
  pending: PendingMap,
  next_id: AtomicU64,
  events: broadcast::Sender<DeliveryEvent>,
}

impl Default for TimerNotifier {
  fn default() -> Self {
    Self::new()
  }
}

impl TimerNotifier {
  pub fn new() -> Self {
    let (events, _) = broadcast::channel(EVENT_BUFFER);
    Self {
      pending: Arc::new(Mutex::new(HashMap::new())),
      next_id: AtomicU64::new(1),
      events,
    }
  }

  pub fn pending_count(&self) -> usize {
    lock(&self.pending).len()
  }
}

#[async_trait]
impl NotificationCapability for TimerNotifier {
  fn capabilities(&self) -> PlatformCapabilities {
    PlatformCapabilities {
      calendar_triggers: false,
      requires_channel: false,
    }
  }

  async fn permission_status(&self) -> Result<PermissionStatus, ReminderError> {
    Ok(PermissionStatus::Granted)
  }

  async fn request_permission(&self) -> Result<PermissionStatus, ReminderError> {
    Ok(PermissionStatus::Granted)
  }

  async fn create_channel(&self, _spec: &ChannelSpec) -> Result<(), ReminderError> {
    Ok(())
  }

  async fn cancel_all_pending(&self) -> Result<(), ReminderError> {
    for (_, task) in lock(&self.pending).drain() {
      task.abort();
    }
    Ok(())
  }

  async fn schedule(&self, content: NotificationContent, trigger: Trigger) -> Result<String, ReminderError> {
    let seconds = match trigger {
      Trigger::Interval { seconds, repeats: false } => seconds,
      other => {
        return Err(ReminderError::SchedulingFailure(format!(
          "unsupported trigger: {:?}",
          other
        )))
      }
    };

    let id = format!("timer-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
    let pending = self.pending.clone();
    let events = self.events.clone();
    let trigger_id = id.clone();

    // Insert under the lock so a zero-delay timer cannot remove itself first
    {
      let mut guard = lock(&self.pending);
      let task = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        lock(&pending).remove(&trigger_id);
        let event = DeliveryEvent {
          trigger_id,
          title: content.title,
          body: content.body,
          delivered_at: Local::now(),
        };
        // No subscribers is fine
        let _ = events.send(event);
      });
      guard.insert(id.clone(), task);
    }

    Ok(id)
  }

  fn subscribe(&self) -> broadcast::Receiver<DeliveryEvent> {
    self.events.subscribe()
  }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
