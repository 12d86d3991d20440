//! Map file reception models: the inbound request, progress events and the
//! terminal outcome reported back to the UI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::offline_map::OfflineMapType;

/// An inbound map file handed over by another app or by a map download.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveRequest {
    /// Plain `.map` file or a zip archive containing one.
    pub source: PathBuf,
    /// Preferred destination name supplied by the sender.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Download page the map came from. Provenance is only recorded when set.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Remote file date as unix milliseconds.
    #[serde(default)]
    pub source_date: i64,
    #[serde(default)]
    pub map_type: OfflineMapType,
}

impl ReceiveRequest {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            file_name: None,
            source_url: None,
            source_date: 0,
            map_type: OfflineMapType::default(),
        }
    }
}

/// Terminal state of a receive operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CopyOutcome {
    Success,
    Cancelled,
    IoError,
    SourceNotFound,
    Unknown,
}

impl CopyOutcome {
    /// One-line message shown to the user once the operation has finished.
    pub fn message(self, label: &str, map_dir: &Path) -> String {
        match self {
            CopyOutcome::Success => {
                format!("Map file {} has been copied to the map directory.", label)
            }
            CopyOutcome::Cancelled => "Copying the map file was cancelled.".to_string(),
            CopyOutcome::IoError => format!(
                "Could not copy the map file to {}.",
                map_dir.to_string_lossy()
            ),
            CopyOutcome::SourceNotFound => "Could not find the map file to copy.".to_string(),
            CopyOutcome::Unknown => "Error while receiving the map file.".to_string(),
        }
    }
}

/// Progress event published while a map file is copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveProgress {
    pub task_id: String,
    /// File name of the inbound source.
    pub file_name: String,
    pub bytes_copied: u64,
    pub text: String,
}

/// Final report of a receive task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveReport {
    pub task_id: String,
    pub outcome: CopyOutcome,
    pub file_name: String,
    pub label: String,
    pub bytes_copied: u64,
    pub message: String,
}
