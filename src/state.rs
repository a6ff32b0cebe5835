use std::sync::Arc;

use crate::observability::metrics::Metrics;
use crate::presence::PresenceRegistry;
use crate::store::{MemoryStore, RideStore};

pub struct AppState {
    pub store: Arc<dyn RideStore>,
    pub presence: PresenceRegistry,
    pub metrics: Metrics,
    pub notify_buffer_size: usize,
}

impl AppState {
    pub fn new(notify_buffer_size: usize) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), notify_buffer_size)
    }

    pub fn with_store(store: Arc<dyn RideStore>, notify_buffer_size: usize) -> Self {
        let metrics = Metrics::new();

        Self {
            store,
            presence: PresenceRegistry::new(metrics.clone()),
            metrics,
            notify_buffer_size,
        }
    }
}
