//! Tracker configuration.
//!
//! Settings are immutable once built. Overrides that are zero, negative or not
//! finite are ignored and the default is kept. A JSON file at
//! ~/.slt/settings.json can provide the same fields; every key is optional.

use super::providers::Provider;
use super::types::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default minimum time between two updates: 5 minutes.
pub const DEFAULT_MIN_TIME_BETWEEN_UPDATES: Duration = Duration::from_secs(5 * 60);

/// Default minimum distance between two updates, in meters.
pub const DEFAULT_MIN_DISTANCE_BETWEEN_UPDATES: f32 = 100.0;

/// Which providers to use and how often they may report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSettings", into = "RawSettings")]
pub struct TrackerSettings {
    min_time_between_updates: Duration,
    min_distance_between_updates: f32,
    use_gps: bool,
    use_network: bool,
    use_passive: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            min_time_between_updates: DEFAULT_MIN_TIME_BETWEEN_UPDATES,
            min_distance_between_updates: DEFAULT_MIN_DISTANCE_BETWEEN_UPDATES,
            use_gps: true,
            use_network: true,
            use_passive: true,
        }
    }
}

impl TrackerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum delay between updates. A zero duration is ignored.
    pub fn with_min_time_between_updates(mut self, min_time: Duration) -> Self {
        if !min_time.is_zero() {
            self.min_time_between_updates = min_time;
        }
        self
    }

    /// Set the minimum distance between updates in meters. Values that are not
    /// strictly positive and finite are ignored.
    pub fn with_min_distance_between_updates(mut self, meters: f32) -> Self {
        if meters.is_finite() && meters > 0.0 {
            self.min_distance_between_updates = meters;
        }
        self
    }

    pub fn with_gps(mut self, use_gps: bool) -> Self {
        self.use_gps = use_gps;
        self
    }

    pub fn with_network(mut self, use_network: bool) -> Self {
        self.use_network = use_network;
        self
    }

    pub fn with_passive(mut self, use_passive: bool) -> Self {
        self.use_passive = use_passive;
        self
    }

    pub fn min_time_between_updates(&self) -> Duration {
        self.min_time_between_updates
    }

    pub fn min_distance_between_updates(&self) -> f32 {
        self.min_distance_between_updates
    }

    pub fn should_use_gps(&self) -> bool {
        self.use_gps
    }

    pub fn should_use_network(&self) -> bool {
        self.use_network
    }

    pub fn should_use_passive(&self) -> bool {
        self.use_passive
    }

    pub fn uses(&self, provider: Provider) -> bool {
        match provider {
            Provider::Gps => self.use_gps,
            Provider::Network => self.use_network,
            Provider::Passive => self.use_passive,
        }
    }

    /// Configured providers, in priority order.
    pub fn providers(&self) -> impl Iterator<Item = Provider> + '_ {
        Provider::PRIORITY.into_iter().filter(move |p| self.uses(*p))
    }

    /// Load settings from the default location (~/.slt/settings.json).
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        match Self::load_from(&path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load settings from a specific JSON file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".slt")
            .join("settings.json")
    }
}

/// On-disk shape. Signed so that negative overrides parse and are then ignored.
#[derive(Serialize, Deserialize, Default)]
struct RawSettings {
    #[serde(default)]
    min_time_ms: Option<i64>,
    #[serde(default)]
    min_distance_m: Option<f32>,
    #[serde(default)]
    use_gps: Option<bool>,
    #[serde(default)]
    use_network: Option<bool>,
    #[serde(default)]
    use_passive: Option<bool>,
}

impl From<RawSettings> for TrackerSettings {
    fn from(raw: RawSettings) -> Self {
        let mut settings = TrackerSettings::default();
        if let Some(ms) = raw.min_time_ms.filter(|ms| *ms > 0) {
            settings = settings.with_min_time_between_updates(Duration::from_millis(ms as u64));
        }
        if let Some(m) = raw.min_distance_m {
            settings = settings.with_min_distance_between_updates(m);
        }
        settings
            .with_gps(raw.use_gps.unwrap_or(true))
            .with_network(raw.use_network.unwrap_or(true))
            .with_passive(raw.use_passive.unwrap_or(true))
    }
}

impl From<TrackerSettings> for RawSettings {
    fn from(s: TrackerSettings) -> Self {
        Self {
            // Round up so a sub-millisecond interval does not reload as the default.
            min_time_ms: Some(
                s.min_time_between_updates
                    .as_nanos()
                    .div_ceil(1_000_000)
                    .min(i64::MAX as u128) as i64,
            ),
            min_distance_m: Some(s.min_distance_between_updates),
            use_gps: Some(s.use_gps),
            use_network: Some(s.use_network),
            use_passive: Some(s.use_passive),
        }
    }
}
