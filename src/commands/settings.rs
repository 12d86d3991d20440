use tauri::{AppHandle, Runtime};

use crate::models::settings::AppSettings;
use crate::storage::settings;

#[tauri::command]
pub fn get_settings<R: Runtime>(app: AppHandle<R>) -> Result<AppSettings, String> {
    settings::get_settings(&app).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn save_settings<R: Runtime>(settings_data: AppSettings, app: AppHandle<R>) -> Result<(), String> {
    settings::save_settings(&app, settings_data).map_err(|e| e.to_string())
}
