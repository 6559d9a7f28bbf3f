pub mod checkin;
pub mod reminder;

pub use checkin::{CheckinEntry, CheckinRecord, Mood};
pub use reminder::{
  ChannelSpec, DeliveryEvent, NotificationContent, PermissionStatus, PlatformCapabilities,
  PresentationOptions, Recurrence, Trigger,
};
