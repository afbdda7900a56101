//! Location tracking subsystem.
//!
//! A [`LocationTracker`] turns a start/stop contract into provider
//! subscriptions on a platform [`LocationService`], and turns the platform's
//! callbacks into notifications for registered listeners.

pub mod facade;
pub mod listeners;
pub mod platform;
pub mod providers;
pub mod settings;
pub mod simulated;
pub mod types;

pub use facade::LocationTracker;
pub use listeners::{BehaviorListener, ListenerSet, LocationListener};
pub use platform::{LocationService, PlatformEvent, SinkId, UpdateSink};
pub use providers::{
    is_gps_provider_enabled, is_network_provider_enabled, is_passive_provider_enabled, is_provider_enabled, Provider,
};
pub use settings::{TrackerSettings, DEFAULT_MIN_DISTANCE_BETWEEN_UPDATES, DEFAULT_MIN_TIME_BETWEEN_UPDATES};
pub use simulated::{Registration, SimulatedLocationService};
pub use types::{ConfigError, Extras, Location, PlatformError, ProviderError, TrackerError, TrackerState};
