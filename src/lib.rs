pub mod checkin;
pub mod db;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod reminder;
pub mod storage;

#[cfg(feature = "desktop")]
mod commands;

#[cfg(test)]
mod test_utils;

#[cfg(feature = "desktop")]
use std::sync::Arc;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  use db::AppState;
  use notifications::{NotificationCapability, NotificationService, TimerNotifier};
  use reminder::ReminderConfig;
  use tauri::{Emitter, Manager};

  // Load environment variables from .env file
  dotenvy::dotenv().ok();
  logging::init_tracing();

  let config = ReminderConfig::from_env().unwrap_or_else(|e| {
    tracing::warn!(error = %e, "Invalid reminder configuration, using defaults");
    ReminderConfig::default()
  });

  let notifications = Arc::new(NotificationService::new(|| {
    Ok(Arc::new(TimerNotifier::new()) as Arc<dyn NotificationCapability>)
  }));

  tauri::Builder::default()
    .plugin(tauri_plugin_opener::init())
    .setup(move |app| {
      let app_handle = app.handle().clone();
      let service = notifications.clone();
      tauri::async_runtime::block_on(async move {
        match db::initialize_db(&app_handle).await {
          Ok(pool) => {
            let state = Arc::new(AppState::new(pool, config, service));
            app_handle.manage(state);
            tracing::info!("Database ready");
          }
          Err(e) => {
            tracing::error!(error = %e, "Failed to initialize database");
          }
        }
      });

      // Forward reminder deliveries to the webview
      let app_handle = app.handle().clone();
      tauri::async_runtime::spawn(async move {
        let Ok(capability) = notifications.get().await else {
          return;
        };
        let mut deliveries = capability.subscribe();
        loop {
          match deliveries.recv().await {
            Ok(event) => {
              if let Err(e) = app_handle.emit("reminder-delivered", &event) {
                tracing::warn!(error = %e, "Failed to forward delivery event");
              }
            }
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
          }
        }
      });
      Ok(())
    })
    .on_window_event(|window, event| {
      if let tauri::WindowEvent::Destroyed = event {
        if let Some(state) = window.try_state::<Arc<AppState>>() {
          state.end_reminder_session();
        }
      }
    })
    .invoke_handler(tauri::generate_handler![
      // Check-ins
      commands::checkin::get_today_checkin,
      commands::checkin::get_checkin,
      commands::checkin::save_checkin,
      // Reminder
      commands::reminder::ensure_daily_reminder,
      commands::reminder::get_reminder_state,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
