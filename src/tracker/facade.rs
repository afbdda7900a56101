//! The location tracker: start/stop/quick-fix over a platform service.
//!
//! State machine: Idle --start--> Listening --stop--> Idle.
//! Starting while listening and stopping while idle do nothing.
//! A quick fix works in both states and never changes state.

use super::listeners::{BehaviorListener, ListenerSet, LocationListener};
use super::platform::{self, LocationService, PlatformEvent, UpdateSink};
use super::providers::{self, Provider};
use super::settings::TrackerSettings;
use super::types::{Location, ProviderError, TrackerError, TrackerState};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

/// Tracks the device location through a [`LocationService`] and notifies
/// registered listeners.
///
/// The tracker has a single owner. Platform callbacks are queued through its
/// [`UpdateSink`] and applied by [`dispatch_pending`](Self::dispatch_pending)
/// or [`dispatch_next`](Self::dispatch_next) on the owner's thread.
pub struct LocationTracker {
    settings: TrackerSettings,
    state: TrackerState,
    service: Option<Arc<dyn LocationService>>,
    listeners: ListenerSet<dyn LocationListener>,
    behavior_listeners: ListenerSet<dyn BehaviorListener>,
    sink: UpdateSink,
    events: UnboundedReceiver<PlatformEvent>,
}

impl Default for LocationTracker {
    fn default() -> Self {
        Self::new(TrackerSettings::default())
    }
}

impl LocationTracker {
    pub fn new(settings: TrackerSettings) -> Self {
        let (sink, events) = platform::channel();
        Self {
            settings,
            state: TrackerState::default(),
            service: None,
            listeners: ListenerSet::new(),
            behavior_listeners: ListenerSet::new(),
            sink,
            events,
        }
    }

    // ─── Listener registry ──────────────────────────────────────

    pub fn add_listener(&mut self, listener: Arc<dyn LocationListener>) -> bool {
        self.listeners.insert(listener)
    }

    pub fn remove_listener(&mut self, listener: &Arc<dyn LocationListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn add_behavior_listener(&mut self, listener: Arc<dyn BehaviorListener>) -> bool {
        self.behavior_listeners.insert(listener)
    }

    pub fn remove_behavior_listener(&mut self, listener: &Arc<dyn BehaviorListener>) -> bool {
        self.behavior_listeners.remove(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn behavior_listener_count(&self) -> usize {
        self.behavior_listeners.len()
    }

    // ─── Accessors ──────────────────────────────────────────────

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state.is_listening
    }

    pub fn has_location_found(&self) -> bool {
        self.state.has_location_found
    }

    pub fn last_known_location(&self) -> Option<&Location> {
        self.state.last_known_location.as_ref()
    }

    /// The callback handle this tracker registers with the platform.
    pub fn sink(&self) -> &UpdateSink {
        &self.sink
    }

    // ─── Lifecycle ──────────────────────────────────────────────

    /// Start listening for location updates.
    ///
    /// The caller must have obtained location permission beforehand; if not,
    /// the platform's error is returned as is and the tracker stays idle.
    /// Configured providers that are disabled are reported once to every
    /// location listener as a [`ProviderError`] and skipped.
    pub fn start_listening(&mut self, service: Arc<dyn LocationService>) -> Result<(), TrackerError> {
        if self.state.is_listening {
            info!("Relax, already listening for location updates");
            return Ok(());
        }

        self.refresh_last_known_location(service.as_ref())?;
        self.service = Some(Arc::clone(&service));

        let min_time = self.settings.min_time_between_updates();
        let min_distance = self.settings.min_distance_between_updates();
        let configured: Vec<Provider> = self.settings.providers().collect();
        for provider in configured {
            if providers::is_provider_enabled(service.as_ref(), provider) {
                if let Err(e) = service.request_location_updates(provider, min_time, min_distance, self.sink.clone()) {
                    // Idle holds no subscriptions: undo the providers already registered.
                    if let Err(cleanup) = service.remove_updates(self.sink.id()) {
                        warn!(%cleanup, "Cannot remove partial registrations");
                    }
                    self.discard_pending();
                    return Err(e.into());
                }
                debug!(%provider, ?min_time, min_distance, "Registered for location updates");
            } else {
                warn!(%provider, "Provider is not enabled");
                let error = ProviderError::disabled(provider.as_str());
                for l in self.listeners.iter() {
                    l.on_provider_error(&error);
                }
            }
        }

        self.state.is_listening = true;
        info!("Now listening for location updates");
        Ok(())
    }

    /// Stop listening. With `clear_listeners` the location listeners are
    /// dropped too; behavior listeners are always kept.
    pub fn stop_listening(&mut self, clear_listeners: bool) -> Result<(), TrackerError> {
        if !self.state.is_listening {
            info!("Not listening at this time");
            return Ok(());
        }

        if let Some(service) = &self.service {
            service.remove_updates(self.sink.id())?;
        }
        self.discard_pending();
        self.state.is_listening = false;
        if clear_listeners {
            self.listeners.clear();
        }
        info!("Stop listening for location updates");
        Ok(())
    }

    /// Best effort: refresh the last known location and, if there is one, hand
    /// it to every location listener right away.
    pub fn quick_fix(&mut self, service: Arc<dyn LocationService>) -> Result<(), TrackerError> {
        self.refresh_last_known_location(service.as_ref())?;
        if let Some(location) = &self.state.last_known_location {
            debug!(%location, listeners = self.listeners.len(), "Quick fix");
            for l in self.listeners.iter() {
                l.on_location_found(location);
            }
        }
        Ok(())
    }

    /// First configured provider with a cached fix wins. Keeps the current
    /// value when no provider has one.
    fn refresh_last_known_location(&mut self, service: &dyn LocationService) -> Result<(), TrackerError> {
        for provider in self.settings.providers() {
            if let Some(location) = service.last_known_location(provider)? {
                debug!(%provider, %location, "Last known location");
                self.state.last_known_location = Some(location);
                break;
            }
        }
        Ok(())
    }

    /// Drop callbacks queued before the platform subscription went away.
    fn discard_pending(&mut self) {
        let mut dropped = 0;
        while self.events.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!(dropped, "Discarded queued platform events");
        }
    }

    // ─── Platform callbacks ─────────────────────────────────────

    /// Apply one platform callback and fan it out.
    pub fn handle_event(&mut self, event: &PlatformEvent) {
        match event {
            PlatformEvent::LocationChanged(raw) => {
                let location = raw.clone();
                debug!(%location, listeners = self.listeners.len(), "Location has changed");
                self.state.has_location_found = true;
                let location = self.state.last_known_location.insert(location);
                for l in self.listeners.iter() {
                    l.on_location_found(location);
                }
            }
            PlatformEvent::ProviderEnabled(provider) => {
                info!("Provider `{}` has been enabled", provider);
                for l in self.behavior_listeners.iter() {
                    l.on_provider_enabled(provider);
                }
            }
            PlatformEvent::ProviderDisabled(provider) => {
                info!("Provider `{}` has been disabled", provider);
                for l in self.behavior_listeners.iter() {
                    l.on_provider_disabled(provider);
                }
            }
            PlatformEvent::StatusChanged { provider, status, extras } => {
                info!("Provider `{}` status has changed, new status is `{}`", provider, status);
                for l in self.behavior_listeners.iter() {
                    l.on_status_changed(provider, *status, extras);
                }
            }
        }
    }

    /// Apply every queued callback. Returns how many were handled.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(&event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next callback and apply it.
    pub async fn dispatch_next(&mut self) {
        // The tracker holds a sender itself, so the queue never closes.
        if let Some(event) = self.events.recv().await {
            self.handle_event(&event);
        }
    }
}
