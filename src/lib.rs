//! Simple Location Tracker
//!
//! Subscribe to location updates from a platform location service without
//! managing provider lifecycles by hand.

pub mod scenario;
pub mod tracker;

pub use tracker::{
    BehaviorListener, LocationListener, LocationService, LocationTracker, Provider, ProviderError, TrackerSettings,
};
