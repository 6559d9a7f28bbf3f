//! Tauri commands for the daily check-in screen

use std::sync::Arc;
use tauri::State;

use crate::checkin::{parse_date, today, CheckinError};
use crate::db::AppState;
use crate::models::{CheckinRecord, Mood};

/// Today's check-in, if any. Load failures degrade to "not checked in".
#[tauri::command]
pub async fn get_today_checkin(
  state: State<'_, Arc<AppState>>,
) -> Result<Option<CheckinRecord>, CheckinError> {
  match state.checkins.load_today().await {
    Ok(record) => Ok(record),
    Err(e) => {
      tracing::warn!(error = %e, "Failed to load today's check-in");
      Ok(None)
    }
  }
}

#[tauri::command]
pub async fn get_checkin(
  state: State<'_, Arc<AppState>>,
  date: String,
) -> Result<Option<CheckinRecord>, CheckinError> {
  let date = parse_date(&date)?;
  state.checkins.load(date).await
}

/// Save (or overwrite) a check-in. `date` defaults to today on the device clock.
#[tauri::command]
pub async fn save_checkin(
  state: State<'_, Arc<AppState>>,
  date: Option<String>,
  mood: String,
  notes: Option<String>,
) -> Result<CheckinRecord, CheckinError> {
  let date = match date {
    Some(d) => parse_date(&d)?,
    None => today(),
  };
  let mood: Mood = mood.parse().map_err(CheckinError::InvalidMood)?;

  state
    .checkins
    .save(date, mood, notes.as_deref().unwrap_or_default())
    .await
    .inspect_err(|e| tracing::error!(error = %e, "Failed to save check-in"))
}
