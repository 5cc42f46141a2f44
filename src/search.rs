//! Query-state controller: turns search keystrokes into URL navigations.
//!
//! The URL query string is the only state shared with the server. Every
//! helper here preserves parameters it does not own, in their original order.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::form_urlencoded;

pub const QUERY_PARAM: &str = "query";
pub const PAGE_PARAM: &str = "page";

/// Quiet period after the last keystroke before a navigation is emitted.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

fn parse_pairs(query_string: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query_string.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

fn serialize_pairs(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// First value of `key`, if present.
pub fn get_param(query_string: &str, key: &str) -> Option<String> {
    parse_pairs(query_string)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

/// Replace the first `key` in place (dropping later duplicates) or append it.
pub fn set_param(query_string: &str, key: &str, value: &str) -> String {
    let mut pairs = parse_pairs(query_string);
    match pairs.iter().position(|(k, _)| k == key) {
        Some(first) => {
            pairs[first].1 = value.to_string();
            let mut index = 0;
            pairs.retain(|(k, _)| {
                let keep = k != key || index == first;
                index += 1;
                keep
            });
        }
        None => pairs.push((key.to_string(), value.to_string())),
    }
    serialize_pairs(&pairs)
}

pub fn remove_param(query_string: &str, key: &str) -> String {
    let mut pairs = parse_pairs(query_string);
    pairs.retain(|(k, _)| k != key);
    serialize_pairs(&pairs)
}

/// Query string after the user searched for `term`: a non-blank term sets
/// `query` to the trimmed term, a blank one removes `query` entirely.
/// `page` is left alone.
pub fn next_query_string(current: &str, term: &str) -> String {
    let term = term.trim();
    if term.is_empty() {
        remove_param(current, QUERY_PARAM)
    } else {
        set_param(current, QUERY_PARAM, term)
    }
}

/// `path?query_string`, or just `path` when there are no parameters.
pub fn href(path: &str, query_string: &str) -> String {
    if query_string.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query_string}")
    }
}

/// Link to `page` of the current listing, keeping every other parameter.
pub fn page_url(path: &str, current: &str, page: i64) -> String {
    href(path, &set_param(current, PAGE_PARAM, &page.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Replace the current history entry instead of pushing a new one.
    Replace(String),
}

/// Cancel-and-reschedule timer: only the last call within the window runs.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Run `f` after the quiet period unless another call arrives first.
    /// Must be called from within a tokio runtime.
    pub fn call<F>(&mut self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Current address: path plus raw query string (without `?`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query_string: String,
}

impl Location {
    pub fn new(path: impl Into<String>, query_string: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query_string: query_string.into().trim_start_matches('?').to_string(),
        }
    }

    pub fn href(&self) -> String {
        href(&self.path, &self.query_string)
    }
}

/// Watches a search box and emits one `Navigation::Replace` per burst of input.
pub struct SearchController {
    location: Arc<Mutex<Location>>,
    debouncer: Debouncer,
    navigations: mpsc::UnboundedSender<Navigation>,
}

impl SearchController {
    pub fn new(location: Location) -> (Self, mpsc::UnboundedReceiver<Navigation>) {
        Self::with_delay(location, SEARCH_DEBOUNCE)
    }

    pub fn with_delay(
        location: Location,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Navigation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            location: Arc::new(Mutex::new(location)),
            debouncer: Debouncer::new(delay),
            navigations: tx,
        };
        (controller, rx)
    }

    /// Handle a change event from the search input.
    pub fn on_input(&mut self, term: &str) {
        let term = term.to_string();
        let location = Arc::clone(&self.location);
        let navigations = self.navigations.clone();

        self.debouncer.call(move || {
            let Ok(mut location) = location.lock() else {
                return;
            };
            location.query_string = next_query_string(&location.query_string, &term);
            // receiver gone means the page went away
            let _ = navigations.send(Navigation::Replace(location.href()));
        });
    }

    pub fn location(&self) -> Location {
        match self.location.lock() {
            Ok(location) => location.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
