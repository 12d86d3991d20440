//! Offline map import and trackable connectors for a geocaching client.

pub mod api;
pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use error::{AppError, Result};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_store::Builder::new().build())
        .manage(commands::receive::ReceiveState::default())
        .invoke_handler(tauri::generate_handler![
            commands::receive::receive_map_file,
            commands::receive::cancel_receive,
            commands::maps::list_offline_maps,
            commands::maps::delete_offline_map,
            commands::maps::set_current_map,
            commands::maps::list_remote_maps,
            commands::settings::get_settings,
            commands::settings::save_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
