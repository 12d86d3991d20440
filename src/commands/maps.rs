//! Tauri IPC command handlers for installed and remote offline maps.

use tauri::{AppHandle, Runtime};

use crate::api::map_source::MapDownloader;
use crate::api::mapsforge::{MapsforgeDownloader, MAPSFORGE_BASE};
use crate::models::map_source::InstalledMap;
use crate::models::offline_map::OfflineMap;
use crate::services::map_library;

#[tauri::command]
pub fn list_offline_maps<R: Runtime>(app: AppHandle<R>) -> Result<Vec<InstalledMap>, String> {
    map_library::list_installed(&app).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn delete_offline_map<R: Runtime>(file_name: String, app: AppHandle<R>) -> Result<(), String> {
    map_library::delete_installed(&app, &file_name).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn set_current_map<R: Runtime>(file_name: String, app: AppHandle<R>) -> Result<(), String> {
    map_library::set_current_map(&app, &file_name).map_err(|e| e.to_string())
}

/// Browse the mapsforge download listing, starting at its root when no
/// directory is given.
#[tauri::command]
pub async fn list_remote_maps(uri: Option<String>) -> Result<Vec<OfflineMap>, String> {
    let downloader = MapsforgeDownloader::new().map_err(|e| e.to_string())?;
    let uri = uri.unwrap_or_else(|| MAPSFORGE_BASE.to_string());
    downloader.list(&uri).await.map_err(|e| e.to_string())
}
