//! Router state.

use crate::route::ParsedRoute;
use crate::table::RouteTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a navigation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Target template is not in the route table. Caught before any host mutation.
    InvalidPattern,
    /// Pushing or replacing the URL failed.
    NavigationError,
    /// Back/forward traversal failed.
    BrowserNavigationError,
    /// Hard redirect failed.
    RedirectError,
}

impl ErrorKind {
    /// Wire name (`invalid_pattern`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPattern => "invalid_pattern",
            Self::NavigationError => "navigation_error",
            Self::BrowserNavigationError => "browser_navigation_error",
            Self::RedirectError => "redirect_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation lifecycle. Exactly one variant is active at a time.
///
/// `current_route` is carried into failure and not-found states so the host
/// can keep showing the last known context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "current", rename_all = "camelCase")]
pub enum RouterStatus {
    /// Not initialized yet.
    #[default]
    Initial,

    /// Settled on a route.
    #[serde(rename_all = "camelCase")]
    Ready {
        /// The route being shown.
        current_route: ParsedRoute,
    },

    /// A navigation has started and not yet settled.
    #[serde(rename_all = "camelCase")]
    NavigationInProgress {
        /// Candidate route.
        current_route: Option<ParsedRoute>,
    },

    /// The last navigation failed. Recoverable.
    #[serde(rename_all = "camelCase")]
    NavigationFailure {
        /// Last known route, if any.
        current_route: Option<ParsedRoute>,
        /// Human-readable reason.
        error_message: String,
        /// Failure category.
        error_kind: ErrorKind,
    },

    /// No template matches the URL.
    #[serde(rename_all = "camelCase")]
    RouteNotFound {
        /// Last known route, if any.
        current_route: Option<ParsedRoute>,
        /// The path nothing matched.
        requested_path: Option<String>,
    },
}

impl RouterStatus {
    /// Variant name, for logs and assertions.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Ready { .. } => "Ready",
            Self::NavigationInProgress { .. } => "NavigationInProgress",
            Self::NavigationFailure { .. } => "NavigationFailure",
            Self::RouteNotFound { .. } => "RouteNotFound",
        }
    }

    /// The route attached to the active variant, if any.
    #[must_use]
    pub const fn current_route(&self) -> Option<&ParsedRoute> {
        match self {
            Self::Initial => None,
            Self::Ready { current_route } => Some(current_route),
            Self::NavigationInProgress { current_route }
            | Self::NavigationFailure { current_route, .. }
            | Self::RouteNotFound { current_route, .. } => current_route.as_ref(),
        }
    }
}

/// The router's single mutable cell: lifecycle status plus the route table
/// snapshot taken at initialization.
pub struct RouterState<U = ()> {
    /// Active lifecycle variant.
    pub status: RouterStatus,
    /// Route table stored by the last initialization.
    pub routes: RouteTable<U>,
}

impl<U> RouterState<U> {
    /// Variant name of the current status.
    #[must_use]
    pub const fn status_name(&self) -> &'static str {
        self.status.name()
    }

    /// The route of any status that carries one.
    #[must_use]
    pub const fn current_route(&self) -> Option<&ParsedRoute> {
        self.status.current_route()
    }

    /// The current route only when settled.
    #[must_use]
    pub const fn ready_route(&self) -> Option<&ParsedRoute> {
        match &self.status {
            RouterStatus::Ready { current_route } => Some(current_route),
            _ => None,
        }
    }

    /// Whether the router has settled on a route.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.status, RouterStatus::Ready { .. })
    }

    /// Message and kind of the last failure, when failed.
    #[must_use]
    pub fn error(&self) -> Option<(&str, ErrorKind)> {
        match &self.status {
            RouterStatus::NavigationFailure {
                error_message,
                error_kind,
                ..
            } => Some((error_message.as_str(), *error_kind)),
            _ => None,
        }
    }
}

impl<U> Default for RouterState<U> {
    fn default() -> Self {
        Self {
            status: RouterStatus::Initial,
            routes: RouteTable::new(),
        }
    }
}

impl<U> Clone for RouterState<U> {
    fn clone(&self) -> Self {
        Self {
            status: self.status.clone(),
            routes: self.routes.clone(),
        }
    }
}

impl<U> fmt::Debug for RouterState<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterState")
            .field("status", &self.status)
            .field("routes", &self.routes)
            .finish()
    }
}

impl<U> PartialEq for RouterState<U> {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status && self.routes == other.routes
    }
}
