use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What to do when a received map's file name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictPolicy {
    Overwrite,
    /// Save under a free `<stem> (n).map` name.
    #[default]
    Rename,
}

/// Application-level settings persisted to settings.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Directory offline maps are stored in. `None` uses `<data dir>/maps`.
    pub map_directory: Option<PathBuf>,
    pub conflict_policy: ConflictPolicy,
    /// File name of the map currently used for rendering.
    pub current_map_file: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            map_directory: None,
            conflict_policy: ConflictPolicy::Rename,
            current_map_file: None,
        }
    }
}
