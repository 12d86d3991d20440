//! Tauri IPC command handlers for the map file receive lifecycle.
//!
//! A started task reports through `receive:progress` and ends with one
//! `receive:finished` event.

use std::sync::atomic::Ordering;

use tauri::{AppHandle, Runtime, State};

use crate::models::receive::ReceiveRequest;
use crate::services::receive_engine::{self, CancelFlags};

/// Tauri managed state for receive tasks.
#[derive(Default)]
pub struct ReceiveState {
    pub cancel_flags: CancelFlags,
}

/// Start receiving a map file and return the task id.
#[tauri::command]
pub async fn receive_map_file<R: Runtime>(
    request: ReceiveRequest,
    app: AppHandle<R>,
    state: State<'_, ReceiveState>,
) -> Result<String, String> {
    let task = receive_engine::start(request, app, state.cancel_flags.clone())
        .await
        .map_err(|e| e.to_string())?;
    Ok(task.task_id)
}

#[tauri::command]
pub async fn cancel_receive(
    task_id: String,
    state: State<'_, ReceiveState>,
) -> Result<(), String> {
    let flags = state.cancel_flags.lock().await;
    match flags.get(&task_id) {
        Some(flag) => {
            flag.store(true, Ordering::Relaxed);
            Ok(())
        }
        None => Err(format!("No active receive task with id: {}", task_id)),
    }
}
