// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! IP定位 (ipinfo.io)

use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use super::Locator;

pub const LOCATION_UNAVAILABLE: &str = "Location not available";

const IPINFO_URL: &str = "https://ipinfo.io/json";

#[derive(Debug, Deserialize)]
struct IpInfo {
    loc: Option<String>,
}

pub struct IpLocator {
    agent: ureq::Agent,
    url: String,
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_url(IPINFO_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(5))
                .build(),
            url: url.into(),
        }
    }

    fn lookup(&self) -> Result<Option<String>, String> {
        let info: IpInfo = self
            .agent
            .get(&self.url)
            .call()
            .map_err(|e| e.to_string())?
            .into_json()
            .map_err(|e| e.to_string())?;
        Ok(info.loc)
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Locator for IpLocator {
    fn locate(&self) -> String {
        match self.lookup() {
            Ok(loc) => {
                let location = format_location(loc.as_deref());
                info!("📍 当前位置: {}", location);
                location
            }
            Err(e) => {
                warn!("⚠️ 定位失败: {}", e);
                LOCATION_UNAVAILABLE.to_string()
            }
        }
    }
}

/// 解析 `"lat,lng"`
pub fn parse_latlng(loc: &str) -> Option<(f64, f64)> {
    let (lat, lng) = loc.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}

pub fn format_location(loc: Option<&str>) -> String {
    match loc.and_then(parse_latlng) {
        Some((lat, lng)) => format!("Latitude: {}, Longitude: {}", lat, lng),
        None => LOCATION_UNAVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_ipinfo_loc() {
        assert_eq!(
            format_location(Some("12.9719,77.5937")),
            "Latitude: 12.9719, Longitude: 77.5937"
        );
    }

    #[test]
    fn missing_or_malformed_loc_is_placeholder() {
        assert_eq!(format_location(None), LOCATION_UNAVAILABLE);
        assert_eq!(format_location(Some("")), LOCATION_UNAVAILABLE);
        assert_eq!(format_location(Some("north,east")), LOCATION_UNAVAILABLE);
    }

    #[test]
    fn unreachable_service_yields_placeholder() {
        // 本地回环的丢弃端口, 连接立即失败
        let locator = IpLocator::with_url("http://127.0.0.1:9/json");
        assert_eq!(locator.locate(), LOCATION_UNAVAILABLE);
    }
}
