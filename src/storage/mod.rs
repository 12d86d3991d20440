//! Local persistence layer using tauri-plugin-store.
//!
//! Map provenance records and user settings are kept in JSON key-value stores
//! below the app data directory. Every change is saved to disk immediately.

pub mod map_sources;
pub mod settings;
