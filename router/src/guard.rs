//! Route access checks.
//!
//! Authentication is always checked before the route's guard: a missing user
//! on a route that requires authentication is denied without ever calling the
//! guard. Guard failures (an `Err` or a panic) are normalized to an
//! authorization denial and never propagate.

use crate::table::RouteConfig;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// Authorization predicate over the (possibly absent) current user.
pub type Guard<U> = Arc<dyn Fn(Option<&U>) -> Result<bool, GuardError> + Send + Sync>;

/// A guard could not reach a decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Guard failed: {message}")]
pub struct GuardError {
    /// What went wrong.
    pub message: String,
}

impl GuardError {
    /// Create a guard error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenialReason {
    /// The route requires a user and there is none.
    Authentication,
    /// The route's guard refused or failed.
    Authorization,
}

/// Result of [`check_route_access`]. Produced fresh per check, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardResult {
    /// Whether the user may enter the route.
    pub allowed: bool,
    /// Set when denied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
    /// Human-readable explanation when denied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GuardResult {
    /// Access granted.
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            message: None,
        }
    }

    /// Access denied.
    #[must_use]
    pub fn deny(reason: DenialReason, message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            message: Some(message.into()),
        }
    }
}

/// Decide whether `user` may enter a route configured with `config`.
///
/// Pure: touches no router state.
///
/// ```
/// use waypoint_router::{check_route_access, DenialReason, RouteConfig};
///
/// let admin_only = RouteConfig::<String>::new()
///     .requires_authentication()
///     .with_predicate(|user| user.is_some_and(|name| name == "admin"));
///
/// let anonymous = check_route_access(&admin_only, None);
/// assert_eq!(anonymous.reason, Some(DenialReason::Authentication));
///
/// let admin = "admin".to_string();
/// assert!(check_route_access(&admin_only, Some(&admin)).allowed);
/// ```
pub fn check_route_access<U>(config: &RouteConfig<U>, user: Option<&U>) -> GuardResult {
    if config.requires_authentication && user.is_none() {
        return GuardResult::deny(DenialReason::Authentication, "Authentication required");
    }

    let Some(guard) = &config.guard else {
        return GuardResult::allow();
    };

    match catch_unwind(AssertUnwindSafe(|| guard(user))) {
        Ok(Ok(true)) => GuardResult::allow(),
        Ok(Ok(false)) => GuardResult::deny(DenialReason::Authorization, "Insufficient permissions"),
        Ok(Err(error)) => {
            tracing::warn!(%error, "Route guard returned an error, denying access");
            GuardResult::deny(DenialReason::Authorization, "Guard function error")
        },
        Err(_) => {
            tracing::warn!("Route guard panicked, denying access");
            GuardResult::deny(DenialReason::Authorization, "Guard function error")
        },
    }
}
