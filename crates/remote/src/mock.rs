//! In-memory page source for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use crate::error::{ErrorKind, Result};
use crate::source::PageSource;

/// Page source backed by a map of canned documents.
///
/// Unknown URLs produce the same fetch error a dead network would, and
/// every fetch is counted so tests can assert on how often a page was
/// actually requested (the "one hash fetch per release" invariant).
#[derive(Debug, Default)]
pub struct MockPageSource {
    pages: HashMap<String, String>,
    fetches: Mutex<HashMap<String, u64>>,
}

impl MockPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn insert(&mut self, url: &Url, body: impl Into<String>) {
        self.pages.insert(url.as_str().to_string(), body.into());
    }

    /// Stop serving `url`; subsequent fetches of it fail.
    pub fn remove(&mut self, url: &Url) {
        self.pages.remove(url.as_str());
    }

    /// How many times `url` has been fetched.
    pub fn fetch_count(&self, url: &Url) -> u64 {
        self.fetches.lock().unwrap().get(url.as_str()).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PageSource for MockPageSource {
    async fn fetch(&self, url: &Url) -> Result<String> {
        *self.fetches.lock().unwrap().entry(url.as_str().to_string()).or_insert(0) += 1;
        match self.pages.get(url.as_str()) {
            Some(body) => Ok(body.clone()),
            None => exn::bail!(ErrorKind::Fetch),
        }
    }
}
