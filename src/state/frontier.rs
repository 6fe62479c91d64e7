//! Frontier bookkeeping for one crawl run
//!
//! Tracks which URLs have been extracted (`visited`), which are discovered but
//! not yet handed out (`pending`), which are currently being processed
//! (`in_flight`) and which failed. Every URL lives in at most one of these
//! sets. `pending` is served FIFO, which gives a breadth-first traversal.

use std::collections::{HashSet, VecDeque};

/// Visited/pending URL sets driving crawl termination
#[derive(Debug, Default)]
pub struct Frontier {
    visited: HashSet<String>,
    pending: VecDeque<String>,
    pending_set: HashSet<String>,
    in_flight: HashSet<String>,
    failed: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every set
    pub fn reset(&mut self) {
        self.visited.clear();
        self.pending.clear();
        self.pending_set.clear();
        self.in_flight.clear();
        self.failed.clear();
    }

    /// Marks the start page visited without consulting any filter
    pub fn seed(&mut self, url: &str) {
        self.mark_visited(url);
    }

    /// Queues candidates that are new to this run and pass `predicate`
    ///
    /// # Arguments
    ///
    /// * `urls` - Candidate URLs, usually a page's same-origin links
    /// * `predicate` - Filter evaluated once, at discovery time
    ///
    /// # Returns
    ///
    /// The number of URLs added to `pending`
    pub fn discover<I, S, F>(&mut self, urls: I, predicate: F) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> bool,
    {
        let mut added = 0;

        for url in urls {
            let url = url.as_ref();
            if self.is_known(url) || !predicate(url) {
                continue;
            }

            self.pending_set.insert(url.to_string());
            self.pending.push_back(url.to_string());
            added += 1;
        }

        added
    }

    /// Hands out the oldest pending URL and marks it in flight
    pub fn pop_next(&mut self) -> Option<String> {
        let url = self.pending.pop_front()?;
        self.pending_set.remove(&url);
        self.in_flight.insert(url.clone());
        Some(url)
    }

    /// Records a URL as extracted
    ///
    /// Returns true if the URL was not visited before. Also withdraws it from
    /// `pending`, which happens when a redirect lands on a queued URL.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.in_flight.remove(url);
        if self.pending_set.remove(url) {
            self.pending.retain(|p| p != url);
        }
        self.visited.insert(url.to_string())
    }

    /// Records the final location of a redirect as visited
    ///
    /// Unlike [`Frontier::mark_visited`], a URL that is in flight stays in
    /// flight until its own step completes.
    pub fn mark_redirect_target(&mut self, url: &str) -> bool {
        if self.pending_set.remove(url) {
            self.pending.retain(|p| p != url);
        }
        self.visited.insert(url.to_string())
    }

    /// Returns an in-flight URL to the front of `pending` without processing it
    pub fn requeue(&mut self, url: &str) {
        if self.in_flight.remove(url) && self.pending_set.insert(url.to_string()) {
            self.pending.push_front(url.to_string());
        }
    }

    /// Records a URL as failed; it will not be queued again in this run
    pub fn mark_failed(&mut self, url: &str) {
        self.in_flight.remove(url);
        self.failed.insert(url.to_string());
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending_set.contains(url)
    }

    /// True if the URL is in any of the sets
    pub fn is_known(&self, url: &str) -> bool {
        self.visited.contains(url)
            || self.pending_set.contains(url)
            || self.in_flight.contains(url)
            || self.failed.contains(url)
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn failed_len(&self) -> usize {
        self.failed.len()
    }

    /// True when nothing is pending or in flight
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }
}
