//! The platform location service seam.
//!
//! The tracker never talks to the OS directly. It drives whatever implements
//! [`LocationService`] and receives callbacks through an [`UpdateSink`], which
//! only enqueues: the tracker's owner applies queued events on its own thread.

use super::providers::Provider;
use super::types::{Extras, Location, PlatformError};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// The OS location subsystem, as seen by the tracker.
pub trait LocationService: Send + Sync {
    /// Names of the providers currently enabled on the device.
    fn enabled_providers(&self) -> Vec<String>;

    /// The provider's cached fix, available without waiting for a new reading.
    fn last_known_location(&self, provider: Provider) -> Result<Option<Location>, PlatformError>;

    /// Subscribe `sink` to continuous updates from `provider`.
    fn request_location_updates(
        &self,
        provider: Provider,
        min_time: Duration,
        min_distance: f32,
        sink: UpdateSink,
    ) -> Result<(), PlatformError>;

    /// Drop every subscription held by the sink with this id.
    fn remove_updates(&self, sink: SinkId) -> Result<(), PlatformError>;
}

/// A raw callback from the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    LocationChanged(Location),
    ProviderEnabled(String),
    ProviderDisabled(String),
    StatusChanged {
        provider: String,
        status: i32,
        extras: Extras,
    },
}

/// Identity of an [`UpdateSink`], unique per tracker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

impl SinkId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sink#{}", self.0)
    }
}

/// Callback handle given to the platform. Cheap to clone and safe to use from
/// any thread.
#[derive(Debug, Clone)]
pub struct UpdateSink {
    id: SinkId,
    tx: UnboundedSender<PlatformEvent>,
}

impl UpdateSink {
    pub fn id(&self) -> SinkId {
        self.id
    }

    pub fn location_changed(&self, location: Location) {
        self.send(PlatformEvent::LocationChanged(location));
    }

    pub fn provider_enabled(&self, provider: &str) {
        self.send(PlatformEvent::ProviderEnabled(provider.to_string()));
    }

    pub fn provider_disabled(&self, provider: &str) {
        self.send(PlatformEvent::ProviderDisabled(provider.to_string()));
    }

    pub fn status_changed(&self, provider: &str, status: i32, extras: Extras) {
        self.send(PlatformEvent::StatusChanged {
            provider: provider.to_string(),
            status,
            extras,
        });
    }

    pub fn send(&self, event: PlatformEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!(sink = %self.id, "Tracker dropped, discarding platform event");
        }
    }
}

/// Create a sink and the queue it feeds.
pub(crate) fn channel() -> (UpdateSink, UnboundedReceiver<PlatformEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UpdateSink { id: SinkId::next(), tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_ids_are_unique() {
        let (a, _rx_a) = channel();
        let (b, _rx_b) = channel();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_sink_enqueues_in_order() {
        let (sink, mut rx) = channel();
        sink.provider_disabled("gps");
        sink.location_changed(Location::new(1.0, 2.0));

        assert_eq!(rx.try_recv().unwrap(), PlatformEvent::ProviderDisabled("gps".into()));
        assert_eq!(rx.try_recv().unwrap(), PlatformEvent::LocationChanged(Location::new(1.0, 2.0)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (sink, rx) = channel();
        drop(rx);
        sink.provider_enabled("network");
    }
}
