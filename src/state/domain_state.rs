use std::time::{Duration, Instant};

/// Tracks the requests the collector has made to one domain
///
/// The collector consults this before dispatching a fetch so a domain never
/// has more requests in flight than its limit rule allows, and so every
/// request after the first one waits out the rule's delay.
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// Number of requests dispatched to this domain in the current run
    pub request_count: u32,

    /// Requests dispatched but not yet completed
    pub in_flight: u32,

    /// When the last request to this domain was dispatched
    pub last_request_time: Option<Instant>,
}

impl DomainState {
    /// Creates a new DomainState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether another request may be dispatched
    ///
    /// # Arguments
    ///
    /// * `parallelism` - Maximum in-flight requests for the domain
    pub fn can_dispatch(&self, parallelism: u32) -> bool {
        self.in_flight < parallelism.max(1)
    }

    /// Whether the politeness delay applies to the next request
    ///
    /// The first request to a domain goes out immediately.
    pub fn needs_delay(&self) -> bool {
        self.request_count > 0
    }

    /// Records that a request was dispatched
    pub fn record_dispatch(&mut self, now: Instant) {
        self.request_count += 1;
        self.in_flight += 1;
        self.last_request_time = Some(now);
    }

    /// Records that a dispatched request finished (successfully or not)
    pub fn record_completion(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Time elapsed since the last dispatch, if any
    pub fn since_last_request(&self, now: Instant) -> Option<Duration> {
        self.last_request_time
            .map(|last| now.saturating_duration_since(last))
    }
}
