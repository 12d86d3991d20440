//! Offline map listings as presented by a map download source.

use serde::{Deserialize, Serialize};

/// Source family of an offline map. Persisted by numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OfflineMapType {
    #[default]
    Mapsforge,
    OpenAndroMaps,
    Freizeitkarte,
}

impl OfflineMapType {
    pub const DEFAULT_ID: u32 = 0;

    pub fn id(self) -> u32 {
        match self {
            OfflineMapType::Mapsforge => 0,
            OfflineMapType::OpenAndroMaps => 1,
            OfflineMapType::Freizeitkarte => 2,
        }
    }

    /// Unknown ids resolve to the default type.
    pub fn from_id(id: u32) -> Self {
        match id {
            1 => OfflineMapType::OpenAndroMaps,
            2 => OfflineMapType::Freizeitkarte,
            _ => OfflineMapType::Mapsforge,
        }
    }
}

/// A map file or directory entry found on a download page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineMap {
    pub name: String,
    pub uri: String,
    pub is_dir: bool,
    pub date_info: String,
    pub size_info: String,
    pub map_type: OfflineMapType,
}

impl OfflineMap {
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        is_dir: bool,
        date_info: impl Into<String>,
        size_info: impl Into<String>,
        map_type: OfflineMapType,
    ) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            is_dir,
            date_info: date_info.into(),
            size_info: size_info.into(),
            map_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_id_roundtrip() {
        for t in [
            OfflineMapType::Mapsforge,
            OfflineMapType::OpenAndroMaps,
            OfflineMapType::Freizeitkarte,
        ] {
            assert_eq!(OfflineMapType::from_id(t.id()), t);
        }
    }

    #[test]
    fn unknown_type_id_is_default() {
        assert_eq!(OfflineMapType::from_id(42), OfflineMapType::default());
        assert_eq!(OfflineMapType::default().id(), OfflineMapType::DEFAULT_ID);
    }

    #[test]
    fn serde_camel_case_keys() {
        let map = OfflineMap::new(
            "germany.map",
            "https://example.com/germany.map",
            false,
            "2026-01-01",
            "1.2G",
            OfflineMapType::Mapsforge,
        );
        let json = serde_json::to_value(&map).unwrap();
        assert!(json.get("isDir").is_some());
        assert!(json.get("dateInfo").is_some());
        assert!(json.get("mapType").is_some());
        assert!(json.get("is_dir").is_none());
    }
}
