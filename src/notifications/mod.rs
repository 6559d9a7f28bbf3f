//! Local notification capability
//!
//! The platform notification system is consumed through
//! [`NotificationCapability`]. [`NotificationService`] loads it lazily, once,
//! and remembers whether loading succeeded so a broken backend is only probed
//! a single time per process.

pub mod timer;

pub use timer::TimerNotifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, OnceCell};

use crate::models::{
  ChannelSpec, DeliveryEvent, NotificationContent, PermissionStatus, PlatformCapabilities,
  PresentationOptions, Trigger,
};
use crate::reminder::ReminderError;

#[async_trait]
pub trait NotificationCapability: Send + Sync {
  fn capabilities(&self) -> PlatformCapabilities;

  async fn configure_presentation(&self, _options: PresentationOptions) -> Result<(), ReminderError> {
    Ok(())
  }

  async fn permission_status(&self) -> Result<PermissionStatus, ReminderError>;

  /// Prompt the user. Returns the resulting status.
  async fn request_permission(&self) -> Result<PermissionStatus, ReminderError>;

  /// Create or update a delivery channel. Creating an existing channel is a no-op.
  async fn create_channel(&self, spec: &ChannelSpec) -> Result<(), ReminderError>;

  async fn cancel_all_pending(&self) -> Result<(), ReminderError>;

  /// Returns the platform identifier of the scheduled trigger
  async fn schedule(&self, content: NotificationContent, trigger: Trigger) -> Result<String, ReminderError>;

  fn subscribe(&self) -> broadcast::Receiver<DeliveryEvent>;
}

type Loader = Box<dyn Fn() -> Result<Arc<dyn NotificationCapability>, ReminderError> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ServiceState {
  Uninitialized,
  Ready,
  Failed(String),
}

/// Process-wide handle to the notification backend, shared by `Arc`
pub struct NotificationService {
  loader: Loader,
  capability: OnceCell<Result<Arc<dyn NotificationCapability>, ReminderError>>,
}

impl NotificationService {
  pub fn new<F>(loader: F) -> Self
  where
    F: Fn() -> Result<Arc<dyn NotificationCapability>, ReminderError> + Send + Sync + 'static,
  {
    Self {
      loader: Box::new(loader),
      capability: OnceCell::new(),
    }
  }

  pub fn with_capability(capability: Arc<dyn NotificationCapability>) -> Self {
    Self::new(move || Ok(capability.clone()))
  }

  pub fn state(&self) -> ServiceState {
    match self.capability.get() {
      None => ServiceState::Uninitialized,
      Some(Ok(_)) => ServiceState::Ready,
      Some(Err(e)) => ServiceState::Failed(e.to_string()),
    }
  }

  /// Load on first use; later calls return the cached outcome
  pub async fn get(&self) -> Result<Arc<dyn NotificationCapability>, ReminderError> {
    self
      .capability
      .get_or_init(|| async {
        let capability = (self.loader)().map_err(|e| match e {
          ReminderError::CapabilityUnavailable(_) => e,
          other => ReminderError::CapabilityUnavailable(other.to_string()),
        });

        match capability {
          Ok(capability) => {
            if let Err(e) = capability
              .configure_presentation(PresentationOptions::default())
              .await
            {
              tracing::warn!(error = %e, "Failed to configure foreground presentation");
            }
            tracing::debug!("Notification capability ready");
            Ok(capability)
          }
          Err(e) => {
            tracing::warn!(error = %e, "Notification capability failed to load");
            Err(e)
          }
        }
      })
      .await
      .clone()
  }
}
