use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::checkin::CheckinStore;
use crate::notifications::NotificationService;
use crate::reminder::{ReminderConfig, ReminderScheduler, ReminderSession};
use crate::storage::SqliteStore;

pub type DbPool = SqlitePool;

const DB_FILE_NAME: &str = "mood-log.db";

/// Application state shared with every command
pub struct AppState {
  pub db: DbPool,
  pub checkins: CheckinStore,
  pub reminders: Arc<ReminderScheduler>,
  /// Lives as long as the main window; ending it drops the delivery listener
  reminder_session: Mutex<Option<ReminderSession>>,
}

impl AppState {
  pub fn new(db: DbPool, config: ReminderConfig, notifications: Arc<NotificationService>) -> Self {
    let checkins = CheckinStore::new(Arc::new(SqliteStore::new(db.clone())));
    let reminders = Arc::new(ReminderScheduler::new(notifications, config));
    let reminder_session = Mutex::new(Some(reminders.mount()));
    Self {
      db,
      checkins,
      reminders,
      reminder_session,
    }
  }

  pub fn end_reminder_session(&self) {
    let session = self
      .reminder_session
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .take();
    if session.is_some() {
      tracing::debug!("Reminder session ended");
    }
  }
}

/// Database file location: `MOOD_LOG_DB_PATH` if set, else `<data_dir>/mood-log.db`
pub fn resolve_db_path(data_dir: &Path) -> PathBuf {
  match std::env::var("MOOD_LOG_DB_PATH") {
    Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
    _ => data_dir.join(DB_FILE_NAME),
  }
}

/// Open (creating if needed) the database file and run migrations
pub async fn initialize_db_at(db_path: &Path) -> Result<DbPool, Box<dyn std::error::Error>> {
  if let Some(parent) = db_path.parent() {
    fs::create_dir_all(parent)?;
  }
  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  tracing::info!(path = %db_path.display(), "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("Database initialized successfully");

  Ok(pool)
}

/// Stored in the platform app data dir, e.g.
/// ~/Library/Application Support/com.samleuthold.mood-log/mood-log.db
#[cfg(feature = "desktop")]
pub async fn initialize_db<R: tauri::Runtime>(app: &tauri::AppHandle<R>) -> Result<DbPool, Box<dyn std::error::Error>> {
  use tauri::Manager;

  let data_dir = app
    .path()
    .app_data_dir()
    .map_err(|e| format!("Failed to get app data dir: {}", e))?;

  initialize_db_at(&resolve_db_path(&data_dir)).await
}
