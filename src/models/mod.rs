//! Data models shared across the crate: trackables, offline maps, map
//! provenance records, settings and map file reception types.

pub mod map_source;
pub mod offline_map;
pub mod receive;
pub mod settings;
pub mod trackable;
pub mod user_action;
