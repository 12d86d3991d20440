use tauri::{AppHandle, Runtime};
use tauri_plugin_store::StoreExt;

use crate::error::AppError;
use crate::models::map_source::MapSourceRecord;

const STORE_FILE: &str = "offline_maps.json";
const RECORDS_KEY: &str = "records";

/// Human readable map name: underscores become spaces, first letter upper-cased.
pub fn display_name(label: &str) -> String {
    let spaced = label.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Record where an installed map came from.
///
/// `label` is the file name without its `.map` extension.
pub fn write_info<R: Runtime>(
    app: &AppHandle<R>,
    source_url: &str,
    file_name: &str,
    label: &str,
    remote_date: i64,
    type_id: u32,
) -> crate::error::Result<()> {
    add_record(
        app,
        MapSourceRecord {
            file_name: file_name.to_string(),
            display_name: display_name(label),
            remote_page: source_url.to_string(),
            remote_date,
            type_id,
            recorded_at: chrono::Utc::now().to_rfc3339(),
        },
    )
}

/// Add a record (newest first), replacing any older record for the same file.
pub fn add_record<R: Runtime>(
    app: &AppHandle<R>,
    record: MapSourceRecord,
) -> crate::error::Result<()> {
    let store = app
        .store(STORE_FILE)
        .map_err(|e| AppError::Storage(e.to_string()))?;
    let mut records = load_records(store.get(RECORDS_KEY));
    upsert(&mut records, record);
    store.set(RECORDS_KEY, serde_json::to_value(&records)?);
    store
        .save()
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(())
}

/// Get all records, newest first.
pub fn get_all<R: Runtime>(app: &AppHandle<R>) -> crate::error::Result<Vec<MapSourceRecord>> {
    let store = app
        .store(STORE_FILE)
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(load_records(store.get(RECORDS_KEY)))
}

pub fn find<R: Runtime>(
    app: &AppHandle<R>,
    file_name: &str,
) -> crate::error::Result<Option<MapSourceRecord>> {
    Ok(get_all(app)?.into_iter().find(|r| r.file_name == file_name))
}

/// Delete the record for a file name. Silently ignores unknown names.
pub fn delete_record<R: Runtime>(app: &AppHandle<R>, file_name: &str) -> crate::error::Result<()> {
    let store = app
        .store(STORE_FILE)
        .map_err(|e| AppError::Storage(e.to_string()))?;
    let mut records = load_records(store.get(RECORDS_KEY));
    records.retain(|r| r.file_name != file_name);
    store.set(RECORDS_KEY, serde_json::to_value(&records)?);
    store
        .save()
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(())
}

fn upsert(records: &mut Vec<MapSourceRecord>, record: MapSourceRecord) {
    records.retain(|r| r.file_name != record.file_name);
    records.insert(0, record);
}

/// Parse stored records, returning an empty vec if the key is missing or invalid.
fn load_records(value: Option<serde_json::Value>) -> Vec<MapSourceRecord> {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestApp;

    fn record(file_name: &str, page: &str) -> MapSourceRecord {
        MapSourceRecord {
            file_name: file_name.to_string(),
            display_name: display_name(file_name.trim_end_matches(".map")),
            remote_page: page.to_string(),
            remote_date: 0,
            type_id: 0,
            recorded_at: "2026-10-19T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn display_name_replaces_underscores_and_capitalizes() {
        assert_eq!(display_name("north_rhine_westphalia"), "North rhine westphalia");
        assert_eq!(display_name("germany"), "Germany");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn load_records_missing_value_is_empty() {
        assert!(load_records(None).is_empty());
        assert!(load_records(Some(serde_json::json!("garbage"))).is_empty());
    }

    #[test]
    fn upsert_replaces_same_file_and_puts_newest_first() {
        let mut records = vec![record("a.map", "old"), record("b.map", "b")];
        upsert(&mut records, record("a.map", "new"));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file_name, "a.map");
        assert_eq!(records[0].remote_page, "new");
        assert_eq!(records[1].file_name, "b.map");
    }

    #[test]
    fn write_find_delete_roundtrip() {
        let test_app = TestApp::new();
        let app = test_app.handle();

        write_info(
            app,
            "https://download.mapsforge.org/maps/v5/europe/",
            "germany.map",
            "germany",
            1234,
            0,
        )
        .unwrap();

        let found = find(app, "germany.map").unwrap().unwrap();
        assert_eq!(found.display_name, "Germany");
        assert_eq!(found.remote_date, 1234);
        assert!(test_app.data_dir().join(STORE_FILE).exists());

        delete_record(app, "germany.map").unwrap();
        assert!(find(app, "germany.map").unwrap().is_none());
        // unknown names are ignored
        delete_record(app, "missing.map").unwrap();
    }
}
