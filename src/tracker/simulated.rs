//! In-memory [`LocationService`] for tests and the scenario runner.
//!
//! Records every registration and lets the caller play the platform's part:
//! toggle providers, seed cached fixes and push callbacks to subscribed sinks.

use super::platform::{LocationService, PlatformEvent, SinkId, UpdateSink};
use super::providers::Provider;
use super::types::{Extras, Location, PlatformError};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// A recorded `request_location_updates` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub provider: Provider,
    pub min_time: Duration,
    pub min_distance: f32,
    pub sink: SinkId,
}

#[derive(Default)]
struct Inner {
    enabled: HashSet<Provider>,
    last_known: HashMap<Provider, Location>,
    permission_denied: bool,
    registrations: Vec<(Registration, UpdateSink)>,
    last_known_queries: Vec<Provider>,
    removals: usize,
}

/// Simulated platform location service. All providers start disabled.
#[derive(Default)]
pub struct SimulatedLocationService {
    inner: Mutex<Inner>,
}

impl SimulatedLocationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_provider_enabled(&self, provider: Provider, enabled: bool) {
        let mut inner = self.inner.lock();
        if enabled {
            inner.enabled.insert(provider);
        } else {
            inner.enabled.remove(&provider);
        }
    }

    pub fn set_last_known_location(&self, provider: Provider, location: Option<Location>) {
        let mut inner = self.inner.lock();
        match location {
            Some(loc) => inner.last_known.insert(provider, loc),
            None => inner.last_known.remove(&provider),
        };
    }

    /// When set, every permission-guarded call fails with `PermissionDenied`.
    pub fn deny_permission(&self, denied: bool) {
        self.inner.lock().permission_denied = denied;
    }

    /// Active subscriptions, in registration order.
    pub fn registrations(&self) -> Vec<Registration> {
        self.inner.lock().registrations.iter().map(|(r, _)| r.clone()).collect()
    }

    /// Providers asked for a cached fix, in query order.
    pub fn last_known_queries(&self) -> Vec<Provider> {
        self.inner.lock().last_known_queries.clone()
    }

    /// Number of `remove_updates` calls received.
    pub fn removal_count(&self) -> usize {
        self.inner.lock().removals
    }

    pub fn emit_location(&self, location: Location) {
        self.emit(PlatformEvent::LocationChanged(location));
    }

    /// Push the provider's cached fix as a live update, if it has one.
    pub fn emit_cached_location(&self, provider: Provider) {
        let cached = self.inner.lock().last_known.get(&provider).cloned();
        if let Some(location) = cached {
            self.emit_location(location);
        }
    }

    pub fn emit_provider_enabled(&self, provider: &str) {
        self.emit(PlatformEvent::ProviderEnabled(provider.to_string()));
    }

    pub fn emit_provider_disabled(&self, provider: &str) {
        self.emit(PlatformEvent::ProviderDisabled(provider.to_string()));
    }

    pub fn emit_status_changed(&self, provider: &str, status: i32, extras: Extras) {
        self.emit(PlatformEvent::StatusChanged {
            provider: provider.to_string(),
            status,
            extras,
        });
    }

    /// Deliver once to each subscribed sink, however many providers it holds.
    fn emit(&self, event: PlatformEvent) {
        let sinks: Vec<UpdateSink> = {
            let inner = self.inner.lock();
            let mut seen = HashSet::new();
            inner
                .registrations
                .iter()
                .filter(|(r, _)| seen.insert(r.sink))
                .map(|(_, s)| s.clone())
                .collect()
        };
        for sink in sinks {
            sink.send(event.clone());
        }
    }

    fn check_permission(inner: &Inner) -> Result<(), PlatformError> {
        if inner.permission_denied {
            return Err(PlatformError::PermissionDenied(
                "ACCESS_FINE_LOCATION or ACCESS_COARSE_LOCATION required".into(),
            ));
        }
        Ok(())
    }
}

impl LocationService for SimulatedLocationService {
    fn enabled_providers(&self) -> Vec<String> {
        let inner = self.inner.lock();
        Provider::PRIORITY
            .iter()
            .filter(|p| inner.enabled.contains(*p))
            .map(|p| p.as_str().to_string())
            .collect()
    }

    fn last_known_location(&self, provider: Provider) -> Result<Option<Location>, PlatformError> {
        let mut inner = self.inner.lock();
        Self::check_permission(&inner)?;
        inner.last_known_queries.push(provider);
        Ok(inner.last_known.get(&provider).cloned())
    }

    fn request_location_updates(
        &self,
        provider: Provider,
        min_time: Duration,
        min_distance: f32,
        sink: UpdateSink,
    ) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock();
        Self::check_permission(&inner)?;
        let registration = Registration {
            provider,
            min_time,
            min_distance,
            sink: sink.id(),
        };
        inner.registrations.push((registration, sink));
        Ok(())
    }

    fn remove_updates(&self, sink: SinkId) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock();
        inner.removals += 1;
        inner.registrations.retain(|(r, _)| r.sink != sink);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::platform;

    #[test]
    fn test_enabled_providers_in_priority_order() {
        let service = SimulatedLocationService::new();
        service.set_provider_enabled(Provider::Passive, true);
        service.set_provider_enabled(Provider::Gps, true);
        assert_eq!(service.enabled_providers(), vec!["gps", "passive"]);
    }

    #[test]
    fn test_emit_once_per_sink() {
        let service = SimulatedLocationService::new();
        let (sink, mut rx) = platform::channel();
        for p in Provider::PRIORITY {
            service
                .request_location_updates(p, Duration::from_secs(1), 1.0, sink.clone())
                .unwrap();
        }

        service.emit_provider_disabled("gps");
        assert_eq!(rx.try_recv().unwrap(), PlatformEvent::ProviderDisabled("gps".into()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_remove_updates_stops_delivery() {
        let service = SimulatedLocationService::new();
        let (sink, mut rx) = platform::channel();
        service
            .request_location_updates(Provider::Gps, Duration::from_secs(1), 1.0, sink.clone())
            .unwrap();
        service.remove_updates(sink.id()).unwrap();

        service.emit_location(Location::new(0.0, 0.0));
        assert!(rx.try_recv().is_err());
        assert_eq!(service.removal_count(), 1);
    }

    #[test]
    fn test_permission_denied() {
        let service = SimulatedLocationService::new();
        service.deny_permission(true);
        let (sink, _rx) = platform::channel();
        assert!(service.last_known_location(Provider::Gps).is_err());
        assert!(service
            .request_location_updates(Provider::Gps, Duration::from_secs(1), 1.0, sink)
            .is_err());
        assert!(service.registrations().is_empty());
    }
}
