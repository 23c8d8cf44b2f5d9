//! Scripted provider for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ProviderError, StatsProvider};
use crate::models::{Handle, Rating, StoredMatch};

/// Canned ratings and match lists keyed by handle text. Unknown handles get
/// the default rating and an empty history.
#[derive(Default)]
pub struct MockProvider {
    ratings: HashMap<String, Rating>,
    matches: HashMap<String, Vec<StoredMatch>>,
    rating_failures: HashSet<String>,
    match_failures: HashSet<String>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rating(mut self, handle: &str, rating: Rating) -> Self {
        self.ratings.insert(handle.to_string(), rating);
        self
    }

    pub fn with_matches(mut self, handle: &str, matches: Vec<StoredMatch>) -> Self {
        self.matches.insert(handle.to_string(), matches);
        self
    }

    /// Rating requests for `handle` answer HTTP 500.
    pub fn with_rating_failure(mut self, handle: &str) -> Self {
        self.rating_failures.insert(handle.to_string());
        self
    }

    /// Match requests for `handle` answer HTTP 500.
    pub fn with_match_failure(mut self, handle: &str) -> Self {
        self.match_failures.insert(handle.to_string());
        self
    }

    /// Sizes passed to `fetch_matches`, in call order.
    pub fn requested_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(|(_, s)| *s).collect()
    }

    /// Handles passed to `fetch_matches`, in call order.
    pub fn requested_handles(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(h, _)| h.clone()).collect()
    }
}

fn server_error() -> ProviderError {
    ProviderError::HttpStatus {
        status: 500,
        message: "scripted failure".to_string(),
    }
}

#[async_trait]
impl StatsProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_rating(&self, handle: &Handle) -> Result<Rating, ProviderError> {
        let key = handle.to_string();
        if self.rating_failures.contains(&key) {
            return Err(server_error());
        }
        Ok(self.ratings.get(&key).cloned().unwrap_or_default())
    }

    async fn fetch_matches(
        &self,
        handle: &Handle,
        size: usize,
    ) -> Result<Vec<StoredMatch>, ProviderError> {
        let key = handle.to_string();
        self.calls.lock().unwrap().push((key.clone(), size));
        if self.match_failures.contains(&key) {
            return Err(server_error());
        }
        let mut matches = self.matches.get(&key).cloned().unwrap_or_default();
        matches.truncate(size);
        Ok(matches)
    }
}
