//! The host's URL/history capability.
//!
//! The router never touches a browser directly. Hosts implement [`History`]
//! over whatever navigation primitive they have; tests use
//! [`MemoryHistory`](crate::mocks::MemoryHistory).

use thiserror::Error;

/// Callback invoked when the user (not the application) moves through history.
pub type PopStateListener = Box<dyn Fn() + Send + Sync>;

/// Host-level history failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Back/forward traversal failed.
    #[error("History traversal failed: {0}")]
    Traversal(String),

    /// Appending an entry failed.
    #[error("Failed to push URL: {0}")]
    Push(String),

    /// Replacing the current entry failed.
    #[error("Failed to replace URL: {0}")]
    Replace(String),

    /// Full-page navigation failed.
    #[error("Redirect failed: {0}")]
    Redirect(String),

    /// The history backend is not usable.
    #[error("History unavailable: {0}")]
    Unavailable(String),
}

/// Capability the host provides for reading and changing the current URL.
///
/// All methods are synchronous. Implementations must be shareable across
/// threads; the router holds them behind an `Arc`.
pub trait History: Send + Sync {
    /// The full current URL.
    fn current_href(&self) -> String;

    /// Append a history entry without reloading.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the host refuses the navigation.
    fn push_url(&self, url: &str) -> Result<(), HistoryError>;

    /// Replace the current history entry.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the host refuses the navigation.
    fn replace_url(&self, url: &str) -> Result<(), HistoryError>;

    /// Move one entry back.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if traversal fails.
    fn go_back(&self) -> Result<(), HistoryError>;

    /// Move one entry forward.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if traversal fails.
    fn go_forward(&self) -> Result<(), HistoryError>;

    /// Full navigation to `url`, abandoning in-memory application state.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the host refuses the navigation.
    fn redirect(&self, url: &str) -> Result<(), HistoryError>;

    /// Register a listener for user-driven history changes.
    fn on_pop_state(&self, listener: PopStateListener);
}
