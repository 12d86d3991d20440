//! Remote service abstraction layer.
//!
//! `TrackableConnector` is the capability interface every trackable-tracking
//! service (GeoKrety, travel bugs, ...) is accessed through. Each capability
//! has a safe default (empty list, `false`, `None`, zero) so a concrete
//! connector overrides only what its service supports. Map download sources
//! live in [`map_source`].
//!
//! All HTTP traffic of the crate is implemented inside this directory.

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;
use crate::models::trackable::{LogTypeTrackable, Trackable, TrackableBrand, TrackableLog};
use crate::models::user_action::{default_user_actions, UserAction, UserActionContext};

pub mod geokrety;
pub mod map_source;
pub mod mapsforge;

const USER_AGENT: &str = concat!("cgeo-offline/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client setup for all remote services.
pub(crate) fn build_client(timeout: Duration) -> crate::error::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// GET `url` and return the body of a successful response.
pub(crate) async fn get_text(client: &reqwest::Client, url: &str) -> crate::error::Result<String> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

/// Posts trackable logs for one tracking service.
pub trait TrackableLoggingManager: Send + Sync {
    /// Log types the service accepts, in display order.
    fn possible_log_types(&self) -> Vec<LogTypeTrackable>;

    fn can_log_coordinates(&self) -> bool {
        false
    }
}

/// Capability interface of a trackable-tracking web service.
///
/// Only `brand`, `host`, `can_handle_code` and `search_trackable` are
/// required.
pub trait TrackableConnector: Send + Sync {
    fn brand(&self) -> TrackableBrand;

    /// Host name of the service, without scheme.
    fn host(&self) -> &str;

    /// Whether `geocode` is a reference code of this service.
    fn can_handle_code(&self, geocode: Option<&str>) -> bool;

    /// Load a single trackable by its reference code.
    fn search_trackable(
        &self,
        geocode: &str,
    ) -> impl Future<Output = crate::error::Result<Option<Trackable>>> + Send;

    /// Id of the settings screen for this connector, 0 if it has none.
    fn preference_screen_id(&self) -> u32 {
        0
    }

    fn is_loggable(&self) -> bool {
        false
    }

    /// Match on the code alone when the brand is unknown, else require both.
    fn can_handle_trackable(&self, geocode: Option<&str>, brand: Option<TrackableBrand>) -> bool {
        match brand {
            None | Some(TrackableBrand::Unknown) => self.can_handle_code(geocode),
            Some(brand) => brand == self.brand() && self.can_handle_code(geocode),
        }
    }

    fn has_trackable_urls(&self) -> bool {
        true
    }

    fn trackable_code_from_url(&self, _url: &str) -> Option<String> {
        None
    }

    fn trackable_tracking_code_from_url(&self, _url: &str) -> Option<String> {
        None
    }

    fn user_actions(&self, ctx: &UserActionContext) -> Vec<UserAction> {
        default_user_actions(ctx)
    }

    fn url(&self, trackable: &Trackable) -> crate::error::Result<String> {
        Err(AppError::Unsupported(format!(
            "Trackable {} does not have a corresponding URL",
            trackable.geocode
        )))
    }

    fn host_url(&self) -> String {
        format!("https://{}", self.host())
    }

    /// URL requested to check whether the service is reachable.
    fn test_url(&self) -> String {
        self.host_url()
    }

    fn proxy_url(&self) -> Option<String> {
        None
    }

    /// Trackables currently in the cache with the given geocode.
    fn search_trackables(
        &self,
        _geocode: &str,
    ) -> impl Future<Output = crate::error::Result<Vec<Trackable>>> + Send {
        async { Ok(Vec::new()) }
    }

    /// Trackables held by the logged-in user.
    fn load_inventory(&self) -> impl Future<Output = crate::error::Result<Vec<Trackable>>> + Send {
        async { Ok(Vec::new()) }
    }

    /// Whether inventory trackables can be logged together with a cache log.
    fn is_generic_loggable(&self) -> bool {
        false
    }

    fn is_active(&self) -> bool {
        false
    }

    /// Whether the user has credentials for the service.
    fn is_registered(&self) -> bool {
        false
    }

    fn recommend_log_with_geocode(&self) -> bool {
        false
    }

    /// Inventory as pending log entries, for logging alongside a cache visit.
    fn trackable_log_inventory(
        &self,
    ) -> impl Future<Output = crate::error::Result<Vec<TrackableLog>>> + Send {
        async { Ok(Vec::new()) }
    }

    fn logging_manager_loader_id(&self) -> u32 {
        0
    }

    fn logging_manager(&self) -> Option<Box<dyn TrackableLoggingManager>> {
        None
    }
}
