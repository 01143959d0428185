//! Callback-driven page collector
//!
//! The collector fetches queued requests under the scheduler's limits and
//! hands each response to a `CrawlHandler`:
//!
//! 1. `on_html` once per element matching each handler selector, selectors in
//!    registration order and elements in document order
//! 2. `on_scraped` once the element callbacks for the page are done
//! 3. `on_error` instead of both when the fetch fails
//!
//! Fetches run on spawned tasks but every callback runs on the driver loop
//! with `&mut` access to the handler, so handler state needs no lock.

use crate::crawler::fetcher::{FetchError, FetchedPage, Fetcher};
use crate::crawler::parser::{is_html, resolve_link, HtmlElement};
use crate::crawler::scheduler::{LimitRule, Request, Scheduler};
use crate::url::{extract_domain, matches_wildcard};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinSet;
use url::Url;

/// Reasons a visit is refused before anything is queued
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VisitError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("Domain {0} is not in the allowed domains")]
    ForbiddenDomain(String),

    #[error("Max depth {max} reached (depth {depth})")]
    MaxDepth { depth: u32, max: u32 },

    #[error("URL already visited: {0}")]
    AlreadyVisited(String),
}

/// Collector settings
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Allow-list patterns (`example.com` or `*.example.com`); empty allows all
    pub allowed_domains: Vec<String>,

    /// Deepest request accepted; the start URL has depth 1, 0 disables the check
    pub max_depth: u32,

    /// Rate limit rules, first match wins
    pub limit_rules: Vec<LimitRule>,
}

/// Counters for one collector run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorStats {
    /// Requests dispatched
    pub requests: u32,

    /// Requests that ended in `on_error`
    pub failures: u32,
}

/// Receives the collector's callbacks
pub trait CrawlHandler {
    /// Data carried from a visit to the request it creates
    type Context: Send + 'static;

    /// Selectors for `on_html`; a hook is the index into this list
    fn selectors(&self) -> Vec<Selector>;

    /// Called for every element matching selector `hook`
    fn on_html(
        &mut self,
        hook: usize,
        element: &HtmlElement<'_>,
        request: &Request<Self::Context>,
        visits: &mut Visits<'_, Self::Context>,
    );

    /// Called after all element callbacks of a fetched page
    fn on_scraped(&mut self, request: &Request<Self::Context>, page: &FetchedPage);

    /// Called when fetching a request failed
    fn on_error(&mut self, request: &Request<Self::Context>, error: &FetchError);
}

/// Registry of visited URLs and the allow-list/depth checks
struct VisitGate {
    allowed_domains: Vec<String>,
    max_depth: u32,
    visited: HashSet<String>,
    next_id: u64,
}

impl VisitGate {
    fn new(config: &CollectorConfig) -> Self {
        Self {
            allowed_domains: config.allowed_domains.clone(),
            max_depth: config.max_depth,
            visited: HashSet::new(),
            next_id: 0,
        }
    }

    fn admit<C>(&mut self, url: Url, depth: u32, ctx: C) -> Result<Request<C>, VisitError> {
        let domain =
            extract_domain(&url).ok_or_else(|| VisitError::MissingHost(url.to_string()))?;

        if !self.allowed_domains.is_empty()
            && !self
                .allowed_domains
                .iter()
                .any(|pattern| matches_wildcard(pattern, &domain))
        {
            return Err(VisitError::ForbiddenDomain(domain));
        }

        if self.max_depth > 0 && depth > self.max_depth {
            return Err(VisitError::MaxDepth {
                depth,
                max: self.max_depth,
            });
        }

        if !self.visited.insert(url.as_str().to_string()) {
            return Err(VisitError::AlreadyVisited(url.to_string()));
        }

        let id = self.next_id;
        self.next_id += 1;

        Ok(Request {
            id,
            url,
            domain,
            depth,
            ctx,
        })
    }
}

/// Visit handle passed to `on_html`
///
/// Links resolve against the final URL of the page being processed and are
/// queued one level deeper than its request.
pub struct Visits<'a, C> {
    gate: &'a mut VisitGate,
    base_url: &'a Url,
    depth: u32,
    queued: Vec<Request<C>>,
}

impl<'a, C> Visits<'a, C> {
    /// Queues `href` for fetching with `ctx` attached
    pub fn visit(&mut self, href: &str, ctx: C) -> Result<Url, VisitError> {
        let url = resolve_link(href, self.base_url)
            .ok_or_else(|| VisitError::InvalidUrl(href.to_string()))?;
        let request = self.gate.admit(url.clone(), self.depth, ctx)?;
        self.queued.push(request);
        Ok(url)
    }
}

/// Fetches pages and drives a `CrawlHandler`
pub struct Collector<F> {
    fetcher: Arc<F>,
    config: CollectorConfig,
}

impl<F: Fetcher + 'static> Collector<F> {
    pub fn new(fetcher: F, config: CollectorConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            config,
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Visits `start_url` and runs until no request is queued or in flight
    ///
    /// # Returns
    ///
    /// * `Ok(CollectorStats)` - The queue drained; fetch failures went to `on_error`
    /// * `Err(VisitError)` - The start URL itself was refused
    pub async fn run<H: CrawlHandler>(
        &self,
        start_url: &str,
        ctx: H::Context,
        handler: &mut H,
    ) -> Result<CollectorStats, VisitError> {
        let start = Url::parse(start_url)
            .map_err(|e| VisitError::InvalidUrl(format!("{}: {}", start_url, e)))?;

        let mut gate = VisitGate::new(&self.config);
        let mut scheduler = Scheduler::new(self.config.limit_rules.clone());
        scheduler.push(gate.admit(start, 1, ctx)?);

        let selectors = handler.selectors();
        let mut tasks = JoinSet::new();
        let mut stats = CollectorStats::default();

        loop {
            while let Some((request, delay)) = scheduler.next_ready(Instant::now()) {
                tracing::debug!("Visiting {} (depth {})", request.url, request.depth);
                let fetcher = Arc::clone(&self.fetcher);
                tasks.spawn(async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let result = fetcher.fetch(&request.url).await;
                    (request, result)
                });
                stats.requests += 1;
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            match joined {
                Ok((request, result)) => {
                    scheduler.complete(&request.domain);
                    let queued = Self::dispatch(
                        handler, &selectors, &mut gate, request, result, &mut stats,
                    );
                    for next in queued {
                        scheduler.push(next);
                    }
                }
                Err(e) => {
                    tracing::error!("Fetch task failed: {}", e);
                }
            }
        }

        if !scheduler.is_empty() {
            tracing::warn!(
                "Collector stopped with {} queued requests",
                scheduler.frontier_size()
            );
        }

        Ok(stats)
    }

    /// Fires the callbacks for one finished request and returns new requests
    fn dispatch<H: CrawlHandler>(
        handler: &mut H,
        selectors: &[Selector],
        gate: &mut VisitGate,
        request: Request<H::Context>,
        result: Result<FetchedPage, FetchError>,
        stats: &mut CollectorStats,
    ) -> Vec<Request<H::Context>> {
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                stats.failures += 1;
                handler.on_error(&request, &e);
                return Vec::new();
            }
        };

        tracing::debug!(
            "Fetched {} (status {}, {} bytes)",
            page.final_url,
            page.status_code,
            page.body.len()
        );

        let mut visits = Visits {
            gate,
            base_url: &page.final_url,
            depth: request.depth + 1,
            queued: Vec::new(),
        };

        if is_html(&page.content_type) {
            let document = Html::parse_document(&page.body);
            for (hook, selector) in selectors.iter().enumerate() {
                for element in document.select(selector) {
                    handler.on_html(hook, &HtmlElement::new(element), &request, &mut visits);
                }
            }
        } else {
            tracing::debug!(
                "Skipping element callbacks for {} ({})",
                page.final_url,
                page.content_type
            );
        }

        let queued = visits.queued;
        handler.on_scraped(&request, &page);
        queued
    }
}
