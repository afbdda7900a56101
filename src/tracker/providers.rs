//! Location providers and helpers to query their availability.

use super::platform::LocationService;
use super::types::PlatformError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named source of location fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Satellite positioning
    Gps,
    /// Cell towers and Wi-Fi
    Network,
    /// Fixes requested by other applications
    Passive,
}

impl Provider {
    /// Lookup and registration order. The first entry wins ties.
    pub const PRIORITY: [Provider; 3] = [Provider::Gps, Provider::Network, Provider::Passive];

    /// Platform name of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gps => "gps",
            Self::Network => "network",
            Self::Passive => "passive",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gps" => Ok(Self::Gps),
            "network" => Ok(Self::Network),
            "passive" => Ok(Self::Passive),
            _ => Err(PlatformError::UnknownProvider(s.to_string())),
        }
    }
}

/// Check whether `provider` is currently enabled on the device.
pub fn is_provider_enabled(service: &dyn LocationService, provider: Provider) -> bool {
    service
        .enabled_providers()
        .iter()
        .any(|name| name == provider.as_str())
}

pub fn is_gps_provider_enabled(service: &dyn LocationService) -> bool {
    is_provider_enabled(service, Provider::Gps)
}

pub fn is_network_provider_enabled(service: &dyn LocationService) -> bool {
    is_provider_enabled(service, Provider::Network)
}

pub fn is_passive_provider_enabled(service: &dyn LocationService) -> bool {
    is_provider_enabled(service, Provider::Passive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::simulated::SimulatedLocationService;

    #[test]
    fn test_priority_order() {
        assert_eq!(Provider::PRIORITY, [Provider::Gps, Provider::Network, Provider::Passive]);
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!("GPS".parse::<Provider>().unwrap(), Provider::Gps);
        assert_eq!(" network ".parse::<Provider>().unwrap(), Provider::Network);
        assert_eq!(
            "fused".parse::<Provider>(),
            Err(PlatformError::UnknownProvider("fused".into()))
        );
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Provider::Passive).unwrap(), "\"passive\"");
        let p: Provider = serde_json::from_str("\"gps\"").unwrap();
        assert_eq!(p, Provider::Gps);
    }

    #[test]
    fn test_enabled_helpers() {
        let service = SimulatedLocationService::new();
        service.set_provider_enabled(Provider::Network, true);

        assert!(!is_gps_provider_enabled(&service));
        assert!(is_network_provider_enabled(&service));
        assert!(!is_passive_provider_enabled(&service));

        service.set_provider_enabled(Provider::Network, false);
        assert!(!is_provider_enabled(&service, Provider::Network));
    }
}
