//! Pagination state of one crawl run
//!
//! The controller owns the only `CrawlState` of a run and is the only code
//! that mutates it. The collector runs callbacks one at a time, so no lock is
//! involved; see `crawler::collector`.

use std::collections::BTreeSet;

/// Outcome of a "next page" link on page `from`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The chain moves on; `log_scraped` is set the first time page `from`
    /// is reported
    Advanced { from: u32, to: u32, log_scraped: bool },

    /// Following the link would reach the page cap
    CapReached,

    /// The link belongs to a page the chain already moved past
    Stale,
}

/// Counters and flags of the pagination state machine
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    /// 0-based index of the page at the head of the chain; never decreases
    current_page: u32,

    /// Matches written from the current page
    page_matches: u64,

    /// Matches written over the whole run
    total_matches: u64,

    /// Last page index a progress line was logged for
    last_logged_page: Option<u32>,

    /// Page indices whose fetch completed
    scraped_pages: BTreeSet<u32>,

    /// Page indices whose fetch failed
    failed_pages: BTreeSet<u32>,

    discarded_blocks: u64,
    write_failures: u64,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_matches(&self) -> u64 {
        self.page_matches
    }

    pub fn total_matches(&self) -> u64 {
        self.total_matches
    }

    pub fn last_logged_page(&self) -> Option<u32> {
        self.last_logged_page
    }

    /// Number of distinct pages that completed
    pub fn pages_visited(&self) -> u32 {
        self.scraped_pages.len() as u32
    }

    /// Number of distinct pages whose fetch failed
    pub fn failed_pages(&self) -> u32 {
        self.failed_pages.len() as u32
    }

    pub fn discarded_blocks(&self) -> u64 {
        self.discarded_blocks
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    /// Counts a record that reached the sink
    pub fn record_match(&mut self) {
        self.page_matches += 1;
        self.total_matches += 1;
    }

    /// Counts a matching record the sink failed to store
    pub fn record_write_failure(&mut self) {
        self.write_failures += 1;
    }

    /// Counts a result block with neither title nor snippet
    pub fn record_discarded(&mut self) {
        self.discarded_blocks += 1;
    }

    /// Handles a qualifying "Next" link seen on page `page`
    ///
    /// Advances only when `page` is the head of the chain and the next index
    /// stays below `max_pages`, so a page advances the chain at most once and
    /// `current_page` stays below the cap.
    pub fn try_advance(&mut self, page: u32, max_pages: u32) -> Advance {
        if page != self.current_page {
            return Advance::Stale;
        }
        if page.saturating_add(1) >= max_pages {
            return Advance::CapReached;
        }

        let log_scraped = self.mark_logged(page);
        self.page_matches = 0;
        self.current_page = page + 1;

        Advance::Advanced {
            from: page,
            to: self.current_page,
            log_scraped,
        }
    }

    /// Records that the fetch of `page` completed
    ///
    /// Returns true when a progress snapshot should be logged for the page,
    /// which happens at most once per page index however often this is called.
    pub fn mark_scraped(&mut self, page: u32) -> bool {
        self.scraped_pages.insert(page);
        self.mark_logged(page)
    }

    /// Records that the fetch of `page` failed
    ///
    /// The chain does not roll back: `current_page` keeps pointing at the
    /// failed page.
    pub fn mark_failed(&mut self, page: u32) {
        self.failed_pages.insert(page);
    }

    fn mark_logged(&mut self, page: u32) -> bool {
        if self.last_logged_page == Some(page) {
            return false;
        }
        self.last_logged_page = Some(page);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = CrawlState::new();
        assert_eq!(state.current_page(), 0);
        assert_eq!(state.total_matches(), 0);
        assert_eq!(state.pages_visited(), 0);
        assert_eq!(state.last_logged_page(), None);
    }

    #[test]
    fn test_advance_resets_page_counter() {
        let mut state = CrawlState::new();
        state.record_match();
        state.record_match();
        assert_eq!(state.page_matches(), 2);

        let advance = state.try_advance(0, 10);
        assert_eq!(
            advance,
            Advance::Advanced {
                from: 0,
                to: 1,
                log_scraped: true
            }
        );
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.page_matches(), 0);
        assert_eq!(state.total_matches(), 2);
    }

    #[test]
    fn test_second_next_link_on_same_page_is_stale() {
        let mut state = CrawlState::new();
        assert!(matches!(state.try_advance(0, 10), Advance::Advanced { .. }));
        assert_eq!(state.try_advance(0, 10), Advance::Stale);
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn test_cap_blocks_advance() {
        let mut state = CrawlState::new();
        assert!(matches!(state.try_advance(0, 2), Advance::Advanced { .. }));
        assert_eq!(state.try_advance(1, 2), Advance::CapReached);
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn test_single_page_cap() {
        let mut state = CrawlState::new();
        assert_eq!(state.try_advance(0, 1), Advance::CapReached);
        assert_eq!(state.current_page(), 0);
    }

    #[test]
    fn test_scraped_is_idempotent() {
        let mut state = CrawlState::new();
        assert!(state.mark_scraped(0));
        assert!(!state.mark_scraped(0));
        assert_eq!(state.pages_visited(), 1);
    }

    #[test]
    fn test_scraped_after_advance_is_not_relogged() {
        let mut state = CrawlState::new();
        assert!(matches!(
            state.try_advance(0, 5),
            Advance::Advanced {
                log_scraped: true,
                ..
            }
        ));
        // Page 0 completes after its "Next" link already logged it
        assert!(!state.mark_scraped(0));
        assert_eq!(state.pages_visited(), 1);

        // Last page has no next link; its completion logs the snapshot
        assert!(state.mark_scraped(1));
        assert_eq!(state.pages_visited(), 2);
    }

    #[test]
    fn test_failure_keeps_advance() {
        let mut state = CrawlState::new();
        state.try_advance(0, 5);
        state.mark_failed(1);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.failed_pages(), 1);
        assert_eq!(state.pages_visited(), 0);
    }

    #[test]
    fn test_first_page_failure_is_counted() {
        let mut state = CrawlState::new();
        state.mark_failed(0);
        state.mark_failed(0);
        assert_eq!(state.failed_pages(), 1);
        assert_eq!(state.current_page(), 0);
    }

    #[test]
    fn test_problem_counters() {
        let mut state = CrawlState::new();
        state.record_discarded();
        state.record_write_failure();
        state.record_write_failure();
        assert_eq!(state.discarded_blocks(), 1);
        assert_eq!(state.write_failures(), 2);
        assert_eq!(state.total_matches(), 0);
    }
}
