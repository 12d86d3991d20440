//! GeoKrety connector: geokrety.org trackables.
//!
//! Reads the public XML export (`export2.php`), which lists one `<geokret>`
//! element per trackable with its name as element text.

use std::time::Duration;

use regex::Regex;

use super::{build_client, get_text, TrackableConnector, TrackableLoggingManager};
use crate::error::AppError;
use crate::models::trackable::{LogTypeTrackable, Trackable, TrackableBrand, TrackableLog};
use crate::services::retry::{with_retry, RetryPolicy};

const HOST: &str = "geokrety.org";
const EXPORT_URL: &str = "https://geokrety.org/export2.php";
const LOGGING_MANAGER_LOADER_ID: u32 = 4;

const URL_ID_PATTERN: &str = r"(?i)^https?://(?:www\.)?geokrety\.org/konkret\.php\?id=(\d+)";
const URL_TRACKING_CODE_PATTERN: &str =
    r"(?i)^https?://(?:www\.)?geokrety\.org/m/qr\.php\?nr=([A-Z0-9]{6})";
const GEOKRET_PATTERN: &str =
    r"(?s)<geokret\s([^>]*)>(?:<!\[CDATA\[)?(.*?)(?:\]\]>)?</geokret>";
const ATTRIBUTE_PATTERN: &str = r#"(\w+)="([^"]*)""#;

fn compile(pattern: &str) -> crate::error::Result<Regex> {
    Regex::new(pattern).map_err(|e| AppError::Internal(format!("Regex compile error: {}", e)))
}

/// `GK` followed by at least four hex digits.
pub fn is_geokrety_code(code: &str) -> bool {
    code.len() >= 6
        && code.is_char_boundary(2)
        && code[..2].eq_ignore_ascii_case("GK")
        && code[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// `GK00B4` for numeric id 180.
pub fn geocode_from_id(id: u64) -> String {
    format!("GK{:04X}", id)
}

/// Numeric id encoded in a `GK` code.
pub fn id_from_geocode(geocode: &str) -> Option<u64> {
    if !is_geokrety_code(geocode) {
        return None;
    }
    u64::from_str_radix(&geocode[2..], 16).ok()
}

/// Parse the trackables of an `export2.php` response.
pub fn parse_export(xml: &str) -> crate::error::Result<Vec<Trackable>> {
    let geokret = compile(GEOKRET_PATTERN)?;
    let attribute = compile(ATTRIBUTE_PATTERN)?;
    let trackables = geokret
        .captures_iter(xml)
        .filter_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            let name = caps.get(2)?.as_str().trim();
            let mut id = None;
            let mut waypoint = None;
            let mut tracking_code = None;
            let mut owner = None;
            for attr in attribute.captures_iter(attrs) {
                let value = attr[2].to_string();
                match &attr[1] {
                    "id" => id = value.parse::<u64>().ok(),
                    "waypoint" if !value.is_empty() => waypoint = Some(value),
                    "nr" if !value.is_empty() => tracking_code = Some(value),
                    "owner_name" if !value.is_empty() => owner = Some(value),
                    _ => {}
                }
            }
            let id = id?;
            let mut trackable = Trackable::new(geocode_from_id(id), name, TrackableBrand::GeoKrety);
            trackable.tracking_code = tracking_code;
            trackable.spotted_name = waypoint;
            trackable.owner = owner;
            trackable.url = Some(format!("https://{}/konkret.php?id={}", HOST, id));
            Some(trackable)
        })
        .collect();
    Ok(trackables)
}

pub struct GeokretyLoggingManager;

impl TrackableLoggingManager for GeokretyLoggingManager {
    fn possible_log_types(&self) -> Vec<LogTypeTrackable> {
        vec![
            LogTypeTrackable::DoNothing,
            LogTypeTrackable::DroppedOff,
            LogTypeTrackable::GrabbedIt,
            LogTypeTrackable::DiscoveredIt,
            LogTypeTrackable::Visited,
            LogTypeTrackable::Note,
        ]
    }

    fn can_log_coordinates(&self) -> bool {
        true
    }
}

pub struct GeokretyConnector {
    client: reqwest::Client,
    active: bool,
    /// Secret id of the user's account, needed for inventory access.
    secid: Option<String>,
    retry: RetryPolicy,
}

impl GeokretyConnector {
    pub fn new(active: bool, secid: Option<String>) -> crate::error::Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(30))?,
            active,
            secid: secid.filter(|s| !s.trim().is_empty()),
            retry: RetryPolicy::default(),
        })
    }

    async fn export(&self, query: &str) -> crate::error::Result<Vec<Trackable>> {
        let url = format!("{}?{}", EXPORT_URL, query);
        let xml = with_retry(&self.retry, None, "GeoKrety export", || {
            get_text(&self.client, &url)
        })
        .await?;
        parse_export(&xml)
    }
}

impl TrackableConnector for GeokretyConnector {
    fn brand(&self) -> TrackableBrand {
        TrackableBrand::GeoKrety
    }

    fn host(&self) -> &str {
        HOST
    }

    fn can_handle_code(&self, geocode: Option<&str>) -> bool {
        geocode.is_some_and(is_geokrety_code)
    }

    async fn search_trackable(&self, geocode: &str) -> crate::error::Result<Option<Trackable>> {
        let id = id_from_geocode(geocode)
            .ok_or_else(|| AppError::Unsupported(format!("Not a GeoKrety code: {}", geocode)))?;
        Ok(self
            .export(&format!("gkid={}", id))
            .await?
            .into_iter()
            .next())
    }

    fn is_loggable(&self) -> bool {
        true
    }

    fn trackable_code_from_url(&self, url: &str) -> Option<String> {
        let caps = compile(URL_ID_PATTERN).ok()?.captures(url)?;
        caps[1].parse::<u64>().ok().map(geocode_from_id)
    }

    fn trackable_tracking_code_from_url(&self, url: &str) -> Option<String> {
        compile(URL_TRACKING_CODE_PATTERN)
            .ok()?
            .captures(url)
            .map(|caps| caps[1].to_uppercase())
    }

    fn url(&self, trackable: &Trackable) -> crate::error::Result<String> {
        let id = id_from_geocode(&trackable.geocode).ok_or_else(|| {
            AppError::Unsupported(format!("Not a GeoKrety code: {}", trackable.geocode))
        })?;
        Ok(format!("{}/konkret.php?id={}", self.host_url(), id))
    }

    async fn search_trackables(&self, geocode: &str) -> crate::error::Result<Vec<Trackable>> {
        self.export(&format!("wpt={}", geocode)).await
    }

    async fn load_inventory(&self) -> crate::error::Result<Vec<Trackable>> {
        match &self.secid {
            Some(secid) => self.export(&format!("secid={}&inventory=1", secid)).await,
            None => Ok(Vec::new()),
        }
    }

    fn is_generic_loggable(&self) -> bool {
        true
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_registered(&self) -> bool {
        self.secid.is_some()
    }

    fn recommend_log_with_geocode(&self) -> bool {
        true
    }

    async fn trackable_log_inventory(&self) -> crate::error::Result<Vec<TrackableLog>> {
        let inventory = self.load_inventory().await?;
        Ok(inventory
            .into_iter()
            .filter_map(|t| {
                Some(TrackableLog {
                    id: id_from_geocode(&t.geocode)?,
                    tracking_code: t.tracking_code?,
                    geocode: t.geocode,
                    name: t.name,
                    brand: TrackableBrand::GeoKrety,
                    action: LogTypeTrackable::DoNothing,
                })
            })
            .collect())
    }

    fn logging_manager_loader_id(&self) -> u32 {
        LOGGING_MANAGER_LOADER_ID
    }

    fn logging_manager(&self) -> Option<Box<dyn TrackableLoggingManager>> {
        Some(Box::new(GeokretyLoggingManager))
    }
}
