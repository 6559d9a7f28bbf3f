//! Tauri commands for the daily reminder

use std::sync::Arc;
use tauri::State;

use crate::db::AppState;
use crate::reminder::{ReminderState, ScheduleOutcome};

/// Called by the shell on every app start. Never fails.
#[tauri::command]
pub async fn ensure_daily_reminder(
  state: State<'_, Arc<AppState>>,
) -> Result<ScheduleOutcome, String> {
  Ok(state.reminders.ensure_scheduled().await)
}

#[tauri::command]
pub async fn get_reminder_state(
  state: State<'_, Arc<AppState>>,
) -> Result<ReminderState, String> {
  Ok(state.reminders.state())
}
