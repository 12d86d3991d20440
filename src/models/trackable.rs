use serde::{Deserialize, Serialize};

/// Tracking service a trackable belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackableBrand {
    Travelbug,
    GeoKrety,
    Unknown,
}

impl TrackableBrand {
    /// Stable numeric id used when the brand is persisted alongside a trackable.
    pub fn id(self) -> u32 {
        match self {
            TrackableBrand::Travelbug => 1,
            TrackableBrand::GeoKrety => 2,
            TrackableBrand::Unknown => 0,
        }
    }

    pub fn from_id(id: u32) -> Self {
        match id {
            1 => TrackableBrand::Travelbug,
            2 => TrackableBrand::GeoKrety,
            _ => TrackableBrand::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackableBrand::Travelbug => "Travel Bug",
            TrackableBrand::GeoKrety => "GeoKrety",
            TrackableBrand::Unknown => "Unknown",
        }
    }
}

/// A physical item tracked across caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trackable {
    /// Public reference code (e.g. `GK0A1B`, `TB12345`).
    pub geocode: String,
    /// Secret code printed on the item. Only known to its holder.
    pub tracking_code: Option<String>,
    pub name: String,
    pub brand: TrackableBrand,
    pub owner: Option<String>,
    /// Cache or user currently holding the trackable.
    pub spotted_name: Option<String>,
    pub url: Option<String>,
    pub goal: Option<String>,
}

impl Trackable {
    pub fn new(geocode: impl Into<String>, name: impl Into<String>, brand: TrackableBrand) -> Self {
        Self {
            geocode: geocode.into(),
            tracking_code: None,
            name: name.into(),
            brand,
            owner: None,
            spotted_name: None,
            url: None,
            goal: None,
        }
    }
}

/// Action a user can log for a trackable in their inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogTypeTrackable {
    #[default]
    DoNothing,
    Visited,
    DroppedOff,
    RetrievedIt,
    GrabbedIt,
    DiscoveredIt,
    Note,
}

/// Pending log entry for a trackable, produced when logging a cache visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackableLog {
    pub geocode: String,
    pub tracking_code: String,
    pub name: String,
    pub id: u64,
    pub brand: TrackableBrand,
    pub action: LogTypeTrackable,
}
