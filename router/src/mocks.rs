//! In-memory history for tests and demos.
//!
//! [`MemoryHistory`] behaves like a browser's session history: a list of
//! entries and a cursor. Application-initiated traversal moves the cursor
//! silently (the router re-reads the URL itself); user-initiated traversal
//! through [`MemoryHistory::user_back`] and [`MemoryHistory::user_forward`]
//! also notifies pop-state listeners.

use crate::history::{History, HistoryError, PopStateListener};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

/// A recorded call into the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryCall {
    /// `push_url`
    Push(String),
    /// `replace_url`
    Replace(String),
    /// `go_back`
    Back,
    /// `go_forward`
    Forward,
    /// `redirect`
    Redirect(String),
}

type SharedListener = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    entries: Vec<String>,
    cursor: usize,
    calls: Vec<HistoryCall>,
    failures: VecDeque<HistoryError>,
    listeners: Vec<SharedListener>,
}

/// Mock host history.
///
/// Clones share the same entries.
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryHistory {
    /// Create a history with a single entry.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: vec![href.into()],
                cursor: 0,
                calls: Vec::new(),
                failures: VecDeque::new(),
                listeners: Vec::new(),
            })),
        }
    }

    /// Make the next mutating call (push, replace, traversal, redirect) fail.
    ///
    /// Failures queue up; each one is consumed by a single call.
    pub fn fail_next(&self, error: HistoryError) {
        self.lock().failures.push_back(error);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the history has no entries (never true once constructed).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Index of the current entry.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.lock().cursor
    }

    /// All entries (for testing).
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    /// Every call made so far, in order, including failed ones.
    #[must_use]
    pub fn calls(&self) -> Vec<HistoryCall> {
        self.lock().calls.clone()
    }

    /// Number of registered pop-state listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Simulate the user pressing back. Returns false at the first entry.
    pub fn user_back(&self) -> bool {
        self.user_traverse(|cursor, _| cursor.checked_sub(1))
    }

    /// Simulate the user pressing forward. Returns false at the last entry.
    pub fn user_forward(&self) -> bool {
        self.user_traverse(|cursor, len| (cursor + 1 < len).then_some(cursor + 1))
    }

    fn user_traverse(&self, step: impl FnOnce(usize, usize) -> Option<usize>) -> bool {
        let listeners = {
            let mut inner = self.lock();
            let Some(cursor) = step(inner.cursor, inner.entries.len()) else {
                return false;
            };
            inner.cursor = cursor;
            inner.listeners.clone()
        };

        // Listeners re-enter the history, so the lock is released first.
        for listener in listeners {
            listener();
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: HistoryCall) -> Result<MutexGuard<'_, Inner>, HistoryError> {
        let mut inner = self.lock();
        inner.calls.push(call);
        match inner.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(inner),
        }
    }
}

impl Inner {
    fn current(&self) -> &str {
        self.entries.get(self.cursor).map_or("", String::as_str)
    }

    /// Resolve `url` against the current entry, the way a browser would.
    fn resolve(&self, url: &str) -> String {
        Url::parse(self.current())
            .and_then(|current| current.join(url))
            .map_or_else(|_| url.to_string(), String::from)
    }

    fn push(&mut self, url: &str) {
        let resolved = self.resolve(url);
        self.entries.truncate(self.cursor + 1);
        self.entries.push(resolved);
        self.cursor = self.entries.len() - 1;
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("http://localhost:3000/")
    }
}

impl std::fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryHistory")
            .field("entries", &inner.entries)
            .field("cursor", &inner.cursor)
            .finish_non_exhaustive()
    }
}

impl History for MemoryHistory {
    fn current_href(&self) -> String {
        self.lock().current().to_string()
    }

    fn push_url(&self, url: &str) -> Result<(), HistoryError> {
        self.record(HistoryCall::Push(url.to_string()))?.push(url);
        Ok(())
    }

    fn replace_url(&self, url: &str) -> Result<(), HistoryError> {
        let mut inner = self.record(HistoryCall::Replace(url.to_string()))?;
        let resolved = inner.resolve(url);
        let cursor = inner.cursor;
        if let Some(entry) = inner.entries.get_mut(cursor) {
            *entry = resolved;
        }
        Ok(())
    }

    fn go_back(&self) -> Result<(), HistoryError> {
        let mut inner = self.record(HistoryCall::Back)?;
        inner.cursor = inner.cursor.saturating_sub(1);
        Ok(())
    }

    fn go_forward(&self) -> Result<(), HistoryError> {
        let mut inner = self.record(HistoryCall::Forward)?;
        if inner.cursor + 1 < inner.entries.len() {
            inner.cursor += 1;
        }
        Ok(())
    }

    fn redirect(&self, url: &str) -> Result<(), HistoryError> {
        self.record(HistoryCall::Redirect(url.to_string()))?.push(url);
        Ok(())
    }

    fn on_pop_state(&self, listener: PopStateListener) {
        self.lock().listeners.push(Arc::from(listener));
    }
}
