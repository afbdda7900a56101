//! Scripted tracker sessions against the simulated platform.
//!
//! A scenario seeds the [`SimulatedLocationService`], then plays a list of
//! steps: tracker calls (start, stop, quick fix) and platform callbacks
//! (fixes, provider toggles). Every listener notification is journaled.

use crate::tracker::{
    BehaviorListener, Extras, Location, LocationListener, LocationTracker, Provider, ProviderError,
    SimulatedLocationService, TrackerError, TrackerSettings, TrackerState,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Overrides the settings passed to [`run`].
    #[serde(default)]
    pub settings: Option<TrackerSettings>,
    #[serde(default)]
    pub enabled_providers: Vec<Provider>,
    #[serde(default)]
    pub last_known: HashMap<Provider, Location>,
    #[serde(default)]
    pub deny_permission: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Start,
    Stop {
        #[serde(default)]
        clear_listeners: bool,
    },
    QuickFix,
    Location {
        location: Location,
    },
    SetProviderEnabled {
        provider: Provider,
        enabled: bool,
    },
    /// Grant or revoke location permission mid-session.
    SetPermission {
        granted: bool,
    },
    ProviderEnabled {
        provider: String,
    },
    ProviderDisabled {
        provider: String,
    },
    StatusChanged {
        provider: String,
        status: i32,
        #[serde(default)]
        extras: Extras,
    },
}

/// One listener callback, as observed by the journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    LocationFound { location: Location },
    ProviderError { provider: String, message: String },
    ProviderEnabled { provider: String },
    ProviderDisabled { provider: String },
    StatusChanged { provider: String, status: i32, extras: Extras },
}

/// A scenario that stopped on a tracker error, with everything journaled up
/// to that point.
#[derive(Debug, Error)]
#[error("Scenario step {step} failed: {source}")]
pub struct ScenarioFailure {
    pub step: usize,
    pub report: ScenarioReport,
    #[source]
    pub source: TrackerError,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub notifications: Vec<Notification>,
    pub state: TrackerState,
}

/// Listener that records every callback it receives.
#[derive(Default)]
pub struct Journal {
    entries: Mutex<Vec<Notification>>,
}

impl Journal {
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock())
    }

    fn push(&self, n: Notification) {
        self.entries.lock().push(n);
    }
}

impl LocationListener for Journal {
    fn on_location_found(&self, location: &Location) {
        self.push(Notification::LocationFound {
            location: location.clone(),
        });
    }

    fn on_provider_error(&self, error: &ProviderError) {
        self.push(Notification::ProviderError {
            provider: error.provider.clone(),
            message: error.message.clone(),
        });
    }
}

impl BehaviorListener for Journal {
    fn on_provider_disabled(&self, provider: &str) {
        self.push(Notification::ProviderDisabled {
            provider: provider.to_string(),
        });
    }

    fn on_provider_enabled(&self, provider: &str) {
        self.push(Notification::ProviderEnabled {
            provider: provider.to_string(),
        });
    }

    fn on_status_changed(&self, provider: &str, status: i32, extras: &Extras) {
        self.push(Notification::StatusChanged {
            provider: provider.to_string(),
            status,
            extras: extras.clone(),
        });
    }
}

/// Play a scenario. Stops at the first tracker error; the failure still
/// carries the notifications delivered before it.
pub fn run(scenario: &Scenario, settings: TrackerSettings) -> Result<ScenarioReport, ScenarioFailure> {
    let service = Arc::new(SimulatedLocationService::new());
    for provider in &scenario.enabled_providers {
        service.set_provider_enabled(*provider, true);
    }
    for (provider, location) in &scenario.last_known {
        service.set_last_known_location(*provider, Some(location.clone()));
    }
    service.deny_permission(scenario.deny_permission);

    let settings = scenario.settings.clone().unwrap_or(settings);
    let mut tracker = LocationTracker::new(settings);
    let journal = Arc::new(Journal::default());
    tracker.add_listener(journal.clone());
    tracker.add_behavior_listener(journal.clone());

    for (i, step) in scenario.steps.iter().enumerate() {
        tracing::debug!(step = i, ?step, "Scenario step");
        if let Err(source) = play_step(step, &mut tracker, &service) {
            return Err(ScenarioFailure {
                step: i,
                report: ScenarioReport {
                    notifications: journal.take(),
                    state: tracker.state().clone(),
                },
                source,
            });
        }
        tracker.dispatch_pending();
    }

    Ok(ScenarioReport {
        notifications: journal.take(),
        state: tracker.state().clone(),
    })
}

fn play_step(
    step: &Step,
    tracker: &mut LocationTracker,
    service: &Arc<SimulatedLocationService>,
) -> Result<(), TrackerError> {
    match step {
        Step::Start => tracker.start_listening(service.clone())?,
        Step::Stop { clear_listeners } => tracker.stop_listening(*clear_listeners)?,
        Step::QuickFix => tracker.quick_fix(service.clone())?,
        Step::Location { location } => service.emit_location(location.clone()),
        Step::SetProviderEnabled { provider, enabled } => service.set_provider_enabled(*provider, *enabled),
        Step::SetPermission { granted } => service.deny_permission(!*granted),
        Step::ProviderEnabled { provider } => service.emit_provider_enabled(provider),
        Step::ProviderDisabled { provider } => service.emit_provider_disabled(provider),
        Step::StatusChanged { provider, status, extras } => {
            service.emit_status_changed(provider, *status, extras.clone())
        }
    }
    Ok(())
}
