//! Scheduler for the collector's request queue and rate limiting
//!
//! This module handles:
//! - FIFO queue of requests waiting to be fetched
//! - Per-domain parallelism limits from the matching limit rule
//! - Randomized politeness delay before every request but the first
//! - Per-domain request counting

use crate::config::LimitConfig;
use crate::state::DomainState;
use crate::url::matches_glob;
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use url::Url;

/// A request waiting in (or taken from) the queue
#[derive(Debug, Clone)]
pub struct Request<C> {
    /// Sequence number, unique within a run
    pub id: u64,

    /// The URL to fetch
    pub url: Url,

    /// The domain of this URL
    pub domain: String,

    /// 1 for the start URL, parent depth + 1 for discovered links
    pub depth: u32,

    /// Caller data carried from the visit that queued this request
    pub ctx: C,
}

/// Inclusive range a politeness delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// No delay at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    /// Draws a delay uniformly from the range, at millisecond resolution
    pub fn draw(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if max <= min {
            return self.min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// Rate limit applied to every domain matching a glob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitRule {
    /// Glob over the domain name (`*` matches any run of characters)
    pub domain_glob: String,

    /// Maximum requests in flight per matching domain
    pub parallelism: u32,

    /// Delay before each request after a domain's first
    pub delay: DelayRange,
}

impl LimitRule {
    /// Builds the rule from configuration, picking the slow range on request
    pub fn from_config(config: &LimitConfig, slow: bool) -> Self {
        let (min, max) = config.delay_range(slow);
        Self {
            domain_glob: config.domain_glob.clone(),
            parallelism: config.parallelism,
            delay: DelayRange::new(min, max),
        }
    }

    pub fn matches(&self, domain: &str) -> bool {
        matches_glob(&self.domain_glob, domain)
    }
}

/// Scheduler owns the request queue and the per-domain state
///
/// Requests to a domain that no rule matches go out without delay and with
/// no parallelism limit.
pub struct Scheduler<C> {
    /// Queue of requests to fetch, in visit order
    frontier: VecDeque<Request<C>>,

    /// Per-domain state tracking
    domain_states: HashMap<String, DomainState>,

    /// Limit rules; the first match wins
    rules: Vec<LimitRule>,
}

impl<C> Scheduler<C> {
    pub fn new(rules: Vec<LimitRule>) -> Self {
        Self {
            frontier: VecDeque::new(),
            domain_states: HashMap::new(),
            rules,
        }
    }

    /// Adds a request to the back of the queue
    pub fn push(&mut self, request: Request<C>) {
        self.frontier.push_back(request);
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Total requests dispatched and not yet completed
    pub fn in_flight(&self) -> u32 {
        self.domain_states.values().map(|s| s.in_flight).sum()
    }

    pub fn get_domain_state(&self, domain: &str) -> Option<&DomainState> {
        self.domain_states.get(domain)
    }

    fn rule_for(&self, domain: &str) -> Option<&LimitRule> {
        self.rules.iter().find(|rule| rule.matches(domain))
    }

    /// Takes the oldest request whose domain has a free slot
    ///
    /// Domains no rule matches get one request in flight and no delay. The
    /// request is recorded as dispatched. The returned duration is the delay
    /// the caller must wait out before fetching.
    pub fn next_ready(&mut self, now: Instant) -> Option<(Request<C>, Duration)> {
        let position = self.frontier.iter().position(|request| {
            let parallelism = self
                .rule_for(&request.domain)
                .map_or(1, |rule| rule.parallelism);
            self.domain_states
                .get(&request.domain)
                .map_or(true, |state| state.can_dispatch(parallelism))
        })?;
        let request = self.frontier.remove(position)?;

        let delay_range = self
            .rule_for(&request.domain)
            .map(|rule| rule.delay)
            .unwrap_or_else(DelayRange::none);

        let state = self
            .domain_states
            .entry(request.domain.clone())
            .or_default();

        let delay = if state.needs_delay() && !delay_range.is_zero() {
            delay_range.draw()
        } else {
            Duration::ZERO
        };

        tracing::trace!(
            "Dispatching {} (last request {:?} ago, waiting {:?})",
            request.url,
            state.since_last_request(now),
            delay
        );
        state.record_dispatch(now);

        Some((request, delay))
    }

    /// Marks a dispatched request to `domain` as finished
    pub fn complete(&mut self, domain: &str) {
        if let Some(state) = self.domain_states.get_mut(domain) {
            state.record_completion();
        }
    }
}
