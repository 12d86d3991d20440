use std::path::PathBuf;

use tauri::{AppHandle, Manager, Runtime};
use tauri_plugin_store::StoreExt;

use crate::error::AppError;
use crate::models::settings::AppSettings;

const STORE_FILE: &str = "settings.json";
const SETTINGS_KEY: &str = "settings";
const DEFAULT_MAP_DIR: &str = "maps";

/// Read application settings. Returns defaults if no settings saved.
pub fn get_settings<R: Runtime>(app: &AppHandle<R>) -> crate::error::Result<AppSettings> {
    let store = app
        .store(STORE_FILE)
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(parse_settings(store.get(SETTINGS_KEY)))
}

/// Save application settings. Persists to disk immediately.
pub fn save_settings<R: Runtime>(
    app: &AppHandle<R>,
    settings: AppSettings,
) -> crate::error::Result<()> {
    let store = app
        .store(STORE_FILE)
        .map_err(|e| AppError::Storage(e.to_string()))?;
    store.set(SETTINGS_KEY, serde_json::to_value(&settings)?);
    store
        .save()
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(())
}

/// Configured map directory, or the default one below the app data directory.
pub fn map_directory<R: Runtime>(
    app: &AppHandle<R>,
    settings: &AppSettings,
) -> crate::error::Result<PathBuf> {
    match &settings.map_directory {
        Some(dir) => Ok(dir.clone()),
        None => app
            .path()
            .app_data_dir()
            .map(|dir| dir.join(DEFAULT_MAP_DIR))
            .map_err(|e| AppError::Internal(format!("App data directory unavailable: {}", e))),
    }
}

/// Resolve the map directory, creating it if needed, and check it is writable.
///
/// When no directory is configured the default one is created and stored in
/// the settings.
pub fn ensure_map_directory<R: Runtime>(app: &AppHandle<R>) -> crate::error::Result<PathBuf> {
    let mut settings = get_settings(app)?;
    let dir = map_directory(app, &settings)?;
    std::fs::create_dir_all(&dir)?;
    if std::fs::metadata(&dir)?.permissions().readonly() {
        return Err(AppError::Io(format!(
            "Map directory is not writable: {}",
            dir.to_string_lossy()
        )));
    }
    if settings.map_directory.is_none() {
        settings.map_directory = Some(dir.clone());
        save_settings(app, settings)?;
    }
    Ok(dir)
}

/// Stored settings, falling back to defaults when missing or unreadable.
fn parse_settings(value: Option<serde_json::Value>) -> AppSettings {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}
