//! Maps a driver or rider identity to the push channel of its live connection.
//!
//! Delivery is at-most-once: an event for an identity with no channel, or a
//! channel whose buffer is full or closed, is dropped and never retried.

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::event::RideEvent;
use crate::observability::metrics::Metrics;

pub type EventSender = mpsc::Sender<RideEvent>;

/// Identifies one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChannelId(Uuid);

impl ChannelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Offline,
    Dropped,
}

impl Delivery {
    fn as_str(self) -> &'static str {
        match self {
            Delivery::Delivered => "delivered",
            Delivery::Offline => "offline",
            Delivery::Dropped => "dropped",
        }
    }
}

struct Binding {
    channel: ChannelId,
    sender: EventSender,
}

pub struct PresenceRegistry {
    bindings: DashMap<Uuid, Binding>,
    metrics: Metrics,
}

impl PresenceRegistry {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            bindings: DashMap::new(),
            metrics,
        }
    }

    /// Binds `channel` to `id`, replacing whatever `id` was bound to before.
    pub fn register(&self, id: Uuid, channel: ChannelId, sender: EventSender) -> Option<ChannelId> {
        let replaced = self
            .bindings
            .insert(id, Binding { channel, sender })
            .map(|previous| previous.channel);

        self.metrics.connected_channels.set(self.bindings.len() as i64);
        info!(%id, %channel, replaced = ?replaced, "presence registered");
        replaced
    }

    /// Clears every identity still bound to exactly `channel`.
    ///
    /// Identities that have since rebound to a newer channel keep it.
    pub fn unregister(&self, channel: ChannelId) -> Vec<Uuid> {
        let candidates: Vec<Uuid> = self
            .bindings
            .iter()
            .filter(|entry| entry.value().channel == channel)
            .map(|entry| *entry.key())
            .collect();

        let cleared: Vec<Uuid> = candidates
            .into_iter()
            .filter(|id| {
                self.bindings
                    .remove_if(id, |_, binding| binding.channel == channel)
                    .is_some()
            })
            .collect();

        self.metrics.connected_channels.set(self.bindings.len() as i64);
        if cleared.is_empty() {
            debug!(%channel, "stale or unknown channel disconnected");
        } else {
            info!(%channel, cleared = ?cleared, "presence unregistered");
        }
        cleared
    }

    /// Best-effort push; never blocks and never fails the caller.
    pub fn notify(&self, id: Uuid, event: RideEvent) -> Delivery {
        let sender = self.bindings.get(&id).map(|binding| binding.sender.clone());
        let kind = event.kind();

        let delivery = match sender {
            None => {
                debug!(%id, event = kind, "no channel bound; notification dropped");
                Delivery::Offline
            }
            Some(sender) => match sender.try_send(event) {
                Ok(()) => Delivery::Delivered,
                Err(TrySendError::Full(_)) => {
                    warn!(%id, event = kind, "push buffer full; notification dropped");
                    Delivery::Dropped
                }
                Err(TrySendError::Closed(_)) => {
                    warn!(%id, event = kind, "push channel closed; notification dropped");
                    Delivery::Dropped
                }
            },
        };

        self.metrics
            .notifications_total
            .with_label_values(&[delivery.as_str()])
            .inc();
        delivery
    }

    pub fn is_connected(&self, id: Uuid) -> bool {
        self.bindings.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use super::{ChannelId, Delivery, PresenceRegistry};
    use crate::models::event::RideEvent;
    use crate::models::ride::{Location, Ride, RideClass};
    use crate::observability::metrics::Metrics;

    fn event() -> RideEvent {
        let point = Location {
            latitude: 24.86,
            longitude: 67.0,
            name: "Clifton".to_string(),
        };
        RideEvent::RideAccepted {
            ride: Ride::new(Uuid::new_v4(), point.clone(), point, RideClass::Standard),
        }
    }

    #[test]
    fn notify_delivers_to_registered_channel() {
        let registry = PresenceRegistry::new(Metrics::new());
        let driver_id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(4);

        registry.register(driver_id, ChannelId::new(), tx);

        assert_eq!(registry.notify(driver_id, event()), Delivery::Delivered);
        assert!(matches!(rx.try_recv(), Ok(RideEvent::RideAccepted { .. })));
    }

    #[test]
    fn notify_without_channel_is_silently_dropped() {
        let registry = PresenceRegistry::new(Metrics::new());
        assert_eq!(registry.notify(Uuid::new_v4(), event()), Delivery::Offline);
    }

    #[test]
    fn register_replaces_prior_binding() {
        let registry = PresenceRegistry::new(Metrics::new());
        let driver_id = Uuid::new_v4();
        let (old_tx, mut old_rx) = mpsc::channel(4);
        let (new_tx, mut new_rx) = mpsc::channel(4);
        let old_channel = ChannelId::new();

        registry.register(driver_id, old_channel, old_tx);
        let replaced = registry.register(driver_id, ChannelId::new(), new_tx);

        assert_eq!(replaced, Some(old_channel));
        registry.notify(driver_id, event());
        assert!(old_rx.try_recv().is_err());
        assert!(new_rx.try_recv().is_ok());
    }

    #[test]
    fn stale_unregister_keeps_fresher_binding() {
        let registry = PresenceRegistry::new(Metrics::new());
        let driver_id = Uuid::new_v4();
        let (old_tx, _old_rx) = mpsc::channel(4);
        let (new_tx, _new_rx) = mpsc::channel(4);
        let old_channel = ChannelId::new();
        let new_channel = ChannelId::new();

        registry.register(driver_id, old_channel, old_tx);
        registry.register(driver_id, new_channel, new_tx);

        assert!(registry.unregister(old_channel).is_empty());
        assert!(registry.is_connected(driver_id));

        assert_eq!(registry.unregister(new_channel), vec![driver_id]);
        assert!(!registry.is_connected(driver_id));
    }

    #[test]
    fn full_buffer_drops_instead_of_blocking() {
        let registry = PresenceRegistry::new(Metrics::new());
        let rider_id = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(1);
        registry.register(rider_id, ChannelId::new(), tx);

        assert_eq!(registry.notify(rider_id, event()), Delivery::Delivered);
        assert_eq!(registry.notify(rider_id, event()), Delivery::Dropped);
    }

    #[test]
    fn closed_channel_drops() {
        let registry = PresenceRegistry::new(Metrics::new());
        let rider_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(1);
        registry.register(rider_id, ChannelId::new(), tx);
        drop(rx);

        assert_eq!(registry.notify(rider_id, event()), Delivery::Dropped);
    }
}
