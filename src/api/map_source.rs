//! Map download sources: remote directory listings offering offline map files.

use std::future::Future;
use std::time::Duration;

use regex::Regex;

use super::{build_client, get_text};
use crate::models::offline_map::{OfflineMap, OfflineMapType};
use crate::services::retry::{with_retry, RetryPolicy};

/// Name of the synthetic entry leading to the parent directory.
pub const ONE_DIR_UP: &str = "..";

const PAGE_TIMEOUT_SECS: u64 = 30;

/// Static description of a download source.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDownloaderInfo {
    pub map_type: OfflineMapType,
    /// Root listing, always with a trailing slash.
    pub map_base: String,
    pub source_name: String,
    /// Free text about the source, followed by `(project_url)` if one is set.
    pub source_info: String,
    pub project_url: String,
    pub like_it_url: String,
}

impl MapDownloaderInfo {
    pub fn new(
        map_type: OfflineMapType,
        map_base: &str,
        source_name: &str,
        source_info: &str,
        project_url: &str,
        like_it_url: &str,
    ) -> Self {
        let mut info = source_info.to_string();
        if !project_url.is_empty() {
            if !info.is_empty() {
                info.push('\n');
            }
            info.push_str(&format!("({})", project_url));
        }
        Self {
            map_type,
            map_base: map_base.to_string(),
            source_name: source_name.to_string(),
            source_info: info,
            project_url: project_url.to_string(),
            like_it_url: like_it_url.to_string(),
        }
    }
}

/// A site listing downloadable offline maps.
pub trait MapDownloader: Send + Sync {
    fn info(&self) -> &MapDownloaderInfo;

    /// Maps, subdirectories and the parent entry found on the listing at `uri`.
    fn analyze_page(&self, uri: &str, page: &str) -> Vec<OfflineMap>;

    /// Locate a single map on a listing, used to check for updates of an
    /// installed map.
    fn find_map(&self, page: &str, remote_url: &str, remote_filename: &str) -> Option<OfflineMap>;

    /// Download and analyze the listing at `uri`.
    fn list(&self, uri: &str) -> impl Future<Output = crate::error::Result<Vec<OfflineMap>>> + Send {
        async move {
            let page = fetch_page(uri).await?;
            Ok(self.analyze_page(uri, &page))
        }
    }
}

/// Append a `..` entry when `uri` is below the source's base and the page
/// shows a parent link.
pub fn basic_up_matcher(
    info: &MapDownloaderInfo,
    uri: &str,
    page: &str,
    pattern_up: &Regex,
    list: &mut Vec<OfflineMap>,
) {
    if info.map_base == uri || !pattern_up.is_match(page) {
        return;
    }
    let trimmed = uri.strip_suffix('/').unwrap_or(uri);
    if let Some(end) = trimmed.rfind('/') {
        list.push(OfflineMap::new(
            ONE_DIR_UP,
            &uri[..=end],
            true,
            "",
            "",
            info.map_type,
        ));
    }
}

/// GET a listing page, retrying transient failures.
pub async fn fetch_page(url: &str) -> crate::error::Result<String> {
    let client = build_client(Duration::from_secs(PAGE_TIMEOUT_SECS))?;
    with_retry(&RetryPolicy::default(), None, "Listing download", || {
        get_text(&client, url)
    })
    .await
}
