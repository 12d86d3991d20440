//! Installed offline maps: listing, deletion and current-map selection.

use tauri::{AppHandle, Runtime};

use crate::error::AppError;
use crate::models::map_source::InstalledMap;
use crate::services::map_receiver::MAP_EXTENSION;
use crate::storage::{map_sources, settings};

/// Reject names that would escape the map directory.
fn validate_file_name(file_name: &str) -> crate::error::Result<()> {
    if file_name.is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name == "."
        || file_name == ".."
    {
        return Err(AppError::Unsupported(format!(
            "Invalid map file name: {}",
            file_name
        )));
    }
    Ok(())
}

/// List `.map` files in the map directory, sorted by name and joined with
/// their provenance records. A missing map directory yields an empty list.
pub fn list_installed<R: Runtime>(app: &AppHandle<R>) -> crate::error::Result<Vec<InstalledMap>> {
    let current = settings::get_settings(app)?;
    let dir = settings::map_directory(app, &current)?;
    let read_dir = match std::fs::read_dir(&dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let records = map_sources::get_all(app)?;

    let mut maps = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        let name = match entry.file_name().to_str() {
            Some(n) => n.to_string(),
            None => continue,
        };
        let metadata = entry.metadata()?;
        if !metadata.is_file() || !name.ends_with(MAP_EXTENSION) {
            continue;
        }
        let source = records.iter().find(|r| r.file_name == name).cloned();
        let display_name = match &source {
            Some(record) => record.display_name.clone(),
            None => map_sources::display_name(name.trim_end_matches(MAP_EXTENSION)),
        };
        maps.push(InstalledMap {
            file_name: name,
            display_name,
            file_size: metadata.len(),
            source,
        });
    }
    maps.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(maps)
}

/// Make `file_name` the map used for rendering.
pub fn set_current_map<R: Runtime>(app: &AppHandle<R>, file_name: &str) -> crate::error::Result<()> {
    validate_file_name(file_name)?;
    let mut current = settings::get_settings(app)?;
    current.current_map_file = Some(file_name.to_string());
    settings::save_settings(app, current)
}

/// Delete an installed map and its provenance record.
pub fn delete_installed<R: Runtime>(
    app: &AppHandle<R>,
    file_name: &str,
) -> crate::error::Result<()> {
    validate_file_name(file_name)?;
    let mut current = settings::get_settings(app)?;
    let path = settings::map_directory(app, &current)?.join(file_name);
    std::fs::remove_file(&path)?;
    map_sources::delete_record(app, file_name)?;
    if current.current_map_file.as_deref() == Some(file_name) {
        current.current_map_file = None;
        settings::save_settings(app, current)?;
    }
    log::debug!("Deleted offline map '{}'", file_name);
    Ok(())
}
