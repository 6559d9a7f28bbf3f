//! Daily check-in persistence
//!
//! One record per local calendar day, stored under `checkin-<YYYY-MM-DD>`.
//! Saving the same day twice overwrites; there is no delete or range listing.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{CheckinEntry, CheckinRecord, Mood};
use crate::storage::{KeyValueStore, StoreError};

const KEY_PREFIX: &str = "checkin-";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CheckinError {
  #[error("Storage error: {0}")]
  Storage(String),

  #[error("Stored check-in is unreadable: {0}")]
  Corrupt(String),

  #[error("Invalid date: {0}")]
  InvalidDate(String),

  #[error("Invalid mood: {0}")]
  InvalidMood(String),
}

impl From<StoreError> for CheckinError {
  fn from(e: StoreError) -> Self {
    CheckinError::Storage(e.to_string())
  }
}

pub fn checkin_key(date: NaiveDate) -> String {
  format!("{}{}", KEY_PREFIX, date.format(DATE_FORMAT))
}

/// Parse a `YYYY-MM-DD` date as sent by the check-in screen
pub fn parse_date(s: &str) -> Result<NaiveDate, CheckinError> {
  NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
    .map_err(|_| CheckinError::InvalidDate(s.to_string()))
}

/// Today's date on the device clock
pub fn today() -> NaiveDate {
  Local::now().date_naive()
}

#[derive(Clone)]
pub struct CheckinStore {
  store: Arc<dyn KeyValueStore>,
}

impl CheckinStore {
  pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
    Self { store }
  }

  pub async fn load(&self, date: NaiveDate) -> Result<Option<CheckinRecord>, CheckinError> {
    let Some(raw) = self.store.get(&checkin_key(date)).await? else {
      return Ok(None);
    };

    let entry: CheckinEntry =
      serde_json::from_str(&raw).map_err(|e| CheckinError::Corrupt(e.to_string()))?;
    Ok(Some(CheckinRecord::from_entry(date, entry)))
  }

  pub async fn load_today(&self) -> Result<Option<CheckinRecord>, CheckinError> {
    self.load(today()).await
  }

  pub async fn has_checked_in(&self, date: NaiveDate) -> Result<bool, CheckinError> {
    Ok(self.store.get(&checkin_key(date)).await?.is_some())
  }

  /// Upsert the record for `date`. Last write wins.
  pub async fn save(
    &self,
    date: NaiveDate,
    mood: Mood,
    notes: &str,
  ) -> Result<CheckinRecord, CheckinError> {
    let entry = CheckinEntry {
      mood,
      notes: notes.to_string(),
    };
    let payload = serde_json::to_string(&entry).map_err(|e| CheckinError::Corrupt(e.to_string()))?;

    self.store.set(&checkin_key(date), &payload).await?;

    tracing::debug!(%date, %mood, "Check-in saved");
    Ok(CheckinRecord::from_entry(date, entry))
  }
}
