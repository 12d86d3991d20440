//! download.mapsforge.org: Apache style directory listings of `.map` files.

use regex::Regex;

use super::map_source::{basic_up_matcher, MapDownloader, MapDownloaderInfo};
use crate::error::AppError;
use crate::models::offline_map::{OfflineMap, OfflineMapType};

pub const MAPSFORGE_BASE: &str = "https://download.mapsforge.org/maps/v5/";
const PROJECT_URL: &str = "https://mapsforge.org";

const MAP_PATTERN: &str = r#"<a href="([-a-z0-9_]+)\.map">[-a-z0-9_]+\.map</a></td><td align="right">([-0-9]+)[ 0-9:]*</td><td align="right">\s*([0-9.]+[KMG]?)\s*</td>"#;
const DIR_PATTERN: &str = r#"<a href="([-a-z0-9_]+/)">[-a-z0-9_]+/</a></td><td align="right">([-0-9]+)[ 0-9:]*</td><td align="right">\s*-\s*</td>"#;
const UP_PATTERN: &str = r#"<a href="/maps/[-a-z0-9_/]*">Parent Directory</a>"#;

struct Patterns {
    map: Regex,
    dir: Regex,
    up: Regex,
}

pub struct MapsforgeDownloader {
    info: MapDownloaderInfo,
    patterns: Patterns,
}

impl MapsforgeDownloader {
    pub fn new() -> crate::error::Result<Self> {
        let compile = |p: &str| {
            Regex::new(p).map_err(|e| AppError::Internal(format!("Regex compile error: {}", e)))
        };
        Ok(Self {
            info: MapDownloaderInfo::new(
                OfflineMapType::Mapsforge,
                MAPSFORGE_BASE,
                "mapsforge.org",
                "Vector maps rendered from OpenStreetMap data",
                PROJECT_URL,
                "",
            ),
            patterns: Patterns {
                map: compile(MAP_PATTERN)?,
                dir: compile(DIR_PATTERN)?,
                up: compile(UP_PATTERN)?,
            },
        })
    }

    fn with_slash(uri: &str) -> String {
        if uri.ends_with('/') {
            uri.to_string()
        } else {
            format!("{}/", uri)
        }
    }
}

impl MapDownloader for MapsforgeDownloader {
    fn info(&self) -> &MapDownloaderInfo {
        &self.info
    }

    fn analyze_page(&self, uri: &str, page: &str) -> Vec<OfflineMap> {
        let base = Self::with_slash(uri);
        let mut list = Vec::new();
        basic_up_matcher(&self.info, &base, page, &self.patterns.up, &mut list);

        for caps in self.patterns.dir.captures_iter(page) {
            let dir = &caps[1];
            list.push(OfflineMap::new(
                dir.trim_end_matches('/'),
                format!("{}{}", base, dir),
                true,
                &caps[2],
                "",
                self.info.map_type,
            ));
        }
        for caps in self.patterns.map.captures_iter(page) {
            let name = &caps[1];
            list.push(OfflineMap::new(
                name,
                format!("{}{}.map", base, name),
                false,
                &caps[2],
                &caps[3],
                self.info.map_type,
            ));
        }
        list
    }

    fn find_map(&self, page: &str, remote_url: &str, remote_filename: &str) -> Option<OfflineMap> {
        let wanted = remote_filename
            .strip_suffix(".map")
            .unwrap_or(remote_filename);
        let base = Self::with_slash(remote_url);
        self.patterns
            .map
            .captures_iter(page)
            .find(|caps| &caps[1] == wanted)
            .map(|caps| {
                OfflineMap::new(
                    wanted,
                    format!("{}{}.map", base, wanted),
                    false,
                    &caps[2],
                    &caps[3],
                    self.info.map_type,
                )
            })
    }
}
