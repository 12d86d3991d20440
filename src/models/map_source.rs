use serde::{Deserialize, Serialize};

/// Provenance of an installed offline map, persisted to local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSourceRecord {
    /// File name inside the map directory (e.g. "germany.map").
    pub file_name: String,
    /// Human readable name derived from the file name.
    pub display_name: String,
    /// Page the map was downloaded from.
    pub remote_page: String,
    /// Remote file date as unix milliseconds, 0 when unknown.
    pub remote_date: i64,
    /// `OfflineMapType` id of the download source.
    pub type_id: u32,
    /// Timestamp of the import in ISO 8601 format.
    pub recorded_at: String,
}

/// An installed map file, joined with its provenance when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledMap {
    pub file_name: String,
    pub display_name: String,
    pub file_size: u64,
    pub source: Option<MapSourceRecord>,
}
