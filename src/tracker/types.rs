//! Core types for the tracker subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Opaque key/value bundle attached to a provider status change.
pub type Extras = serde_json::Map<String, serde_json::Value>;

/// A single fix as reported by the platform.
///
/// The tracker stores and forwards these verbatim; it never checks that the
/// coordinates make geodesic sense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    /// Horizontal accuracy radius in meters
    #[serde(default)]
    pub accuracy: Option<f32>,
    /// Altitude above the WGS84 ellipsoid in meters
    #[serde(default)]
    pub altitude: Option<f64>,
    /// Ground speed in meters per second
    #[serde(default)]
    pub speed: Option<f32>,
    /// Bearing in degrees, 0.0 to 360.0
    #[serde(default)]
    pub bearing: Option<f32>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Name of the provider that produced the fix (e.g. "gps")
    #[serde(default)]
    pub provider: Option<String>,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            accuracy: None,
            altitude: None,
            speed: None,
            bearing: None,
            timestamp: None,
            provider: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_accuracy(mut self, meters: f32) -> Self {
        self.accuracy = Some(meters);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location[{} {:.6},{:.6}", self.provider.as_deref().unwrap_or("?"), self.lat, self.lon)?;
        if let Some(acc) = self.accuracy {
            write!(f, " acc={:.1}", acc)?;
        }
        write!(f, "]")
    }
}

/// Notification payload sent to location listeners when a requested provider
/// is not enabled on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderError {
    pub provider: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// The error reported for a provider that is switched off.
    pub fn disabled(provider: &str) -> Self {
        Self::new(provider, format!("Provider `{}` is not enabled", provider))
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | ProviderError {{ provider='{}' }}", self.message, self.provider)
    }
}

impl std::error::Error for ProviderError {}

/// Observable state of a tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackerState {
    pub is_listening: bool,
    pub last_known_location: Option<Location>,
    /// Set once the first live update arrives; quick fixes do not count.
    pub has_location_found: bool,
}

/// Failures raised by the platform location service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The host has not granted location permission.
    #[error("Location permission denied: {0}")]
    PermissionDenied(String),

    #[error("Location service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Unknown location provider: '{0}'")]
    UnknownProvider(String),
}

/// Errors returned by tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Errors raised while loading tracker settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read settings at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
