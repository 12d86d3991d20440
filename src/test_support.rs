//! Mock Tauri app for tests that touch stores, managed state or events.

use std::path::{Path, PathBuf};

use tauri::test::{mock_builder, mock_context, noop_assets, MockRuntime};
use tauri::{App, AppHandle, Context, Manager};

use crate::commands::receive::ReceiveState;

/// App with the store plugin and receive state, backed by its own data
/// directory which is removed on drop.
pub(crate) struct TestApp {
    app: App<MockRuntime>,
    data_dir: PathBuf,
}

impl TestApp {
    pub(crate) fn new() -> Self {
        let mut context: Context<MockRuntime> = mock_context(noop_assets());
        context.config_mut().identifier = format!(
            "org.cgeo.offline.test{}",
            uuid::Uuid::new_v4().simple()
        );
        let app = mock_builder()
            .plugin(tauri_plugin_store::Builder::new().build())
            .manage(ReceiveState::default())
            .build(context)
            .unwrap();
        let data_dir = app.path().app_data_dir().unwrap();
        Self { app, data_dir }
    }

    pub(crate) fn handle(&self) -> &AppHandle<MockRuntime> {
        self.app.handle()
    }

    pub(crate) fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}
