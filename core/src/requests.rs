use std::collections::VecDeque;

use crate::error::Result;
use crate::ranker::{DocumentFilter, SearchHit};
use crate::server::SearchServer;

/// Number of requests remembered: one per minute of a day.
pub const REQUEST_WINDOW: usize = 1440;

/// Tracks how many of the most recent requests found nothing.
pub struct RequestQueue<'a> {
    server: &'a SearchServer,
    window: VecDeque<bool>,
    capacity: usize,
    no_result_requests: usize,
}

impl<'a> RequestQueue<'a> {
    pub fn new(server: &'a SearchServer) -> Self {
        Self::with_capacity(server, REQUEST_WINDOW)
    }

    pub fn with_capacity(server: &'a SearchServer, capacity: usize) -> Self {
        Self { server, window: VecDeque::with_capacity(capacity), capacity, no_result_requests: 0 }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<SearchHit>> {
        let hits = self.server.find_top_documents(raw_query)?;
        self.record(hits.is_empty());
        Ok(hits)
    }

    pub fn add_find_request_filtered<P: DocumentFilter>(&mut self, raw_query: &str, filter: P) -> Result<Vec<SearchHit>> {
        let hits = self.server.find_top_documents_filtered(raw_query, filter)?;
        self.record(hits.is_empty());
        Ok(hits)
    }

    /// Empty results among the requests still inside the window.
    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    fn record(&mut self, empty: bool) {
        self.window.push_back(empty);
        if empty {
            self.no_result_requests += 1;
        }
        if self.window.len() > self.capacity && self.window.pop_front() == Some(true) {
            self.no_result_requests -= 1;
        }
    }
}
