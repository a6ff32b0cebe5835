use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub ride_transitions_total: IntCounterVec,
    pub accept_conflicts_total: IntCounter,
    pub pending_rides: IntGauge,
    pub notifications_total: IntCounterVec,
    pub connected_channels: IntGauge,
    pub settled_fare: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let ride_transitions_total = IntCounterVec::new(
            Opts::new("ride_transitions_total", "Ride lifecycle transitions by target"),
            &["transition"],
        )
        .expect("valid ride_transitions_total metric");

        let accept_conflicts_total = IntCounter::new(
            "accept_conflicts_total",
            "Accept attempts that lost the race for a ride",
        )
        .expect("valid accept_conflicts_total metric");

        let pending_rides = IntGauge::new("pending_rides", "Rides currently waiting for a driver")
            .expect("valid pending_rides metric");

        let notifications_total = IntCounterVec::new(
            Opts::new("notifications_total", "Push notifications by outcome"),
            &["outcome"],
        )
        .expect("valid notifications_total metric");

        let connected_channels =
            IntGauge::new("connected_channels", "Identities with a bound push channel")
                .expect("valid connected_channels metric");

        let settled_fare = Histogram::with_opts(
            HistogramOpts::new("settled_fare", "Fare settled on ride completion").buckets(vec![
                100.0, 200.0, 400.0, 800.0, 1600.0, 3200.0,
            ]),
        )
        .expect("valid settled_fare metric");

        registry
            .register(Box::new(ride_transitions_total.clone()))
            .expect("register ride_transitions_total");
        registry
            .register(Box::new(accept_conflicts_total.clone()))
            .expect("register accept_conflicts_total");
        registry
            .register(Box::new(pending_rides.clone()))
            .expect("register pending_rides");
        registry
            .register(Box::new(notifications_total.clone()))
            .expect("register notifications_total");
        registry
            .register(Box::new(connected_channels.clone()))
            .expect("register connected_channels");
        registry
            .register(Box::new(settled_fare.clone()))
            .expect("register settled_fare");

        Self {
            registry,
            ride_transitions_total,
            accept_conflicts_total,
            pending_rides,
            notifications_total,
            connected_channels,
            settled_fare,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
