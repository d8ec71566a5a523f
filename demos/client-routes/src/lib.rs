//! Client Management routes
//!
//! The route table of a small client/car management app, loaded from JSON
//! with guards attached in code, plus the host-side navigation helper that
//! consults guards before navigating.

use waypoint_router::parser::resolve;
use waypoint_router::{
    DenialReason, GuardError, GuardResult, History, RouteTable, RouteTarget, Router,
    RouterError,
};

/// Route declarations, in match order.
pub const ROUTES_JSON: &str = include_str!("routes.json");

/// Roles a signed-in user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Full access, including `/admin`
    Admin,
    /// May create clients
    Staff,
    /// Read-only access
    Viewer,
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Display name
    pub name: String,
    /// Granted roles; empty means the account is suspended
    pub roles: Vec<Role>,
}

impl User {
    /// Create a user with the given roles.
    #[must_use]
    pub fn new(name: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            name: name.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Whether the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Load the route table and attach its guards.
///
/// # Errors
///
/// Returns [`RouterError::RouteTable`] if the embedded JSON is malformed.
pub fn client_routes() -> Result<RouteTable<User>, RouterError> {
    let mut routes = RouteTable::from_json(ROUTES_JSON)?;

    routes.guard("/admin", |user: Option<&User>| {
        Ok(user.is_some_and(|user| user.has_role(Role::Admin)))
    });
    routes.guard("/clients/new", |user: Option<&User>| match user {
        Some(user) if user.roles.is_empty() => {
            Err(GuardError::new(format!("account {} is suspended", user.name)))
        },
        Some(user) => Ok(user.has_role(Role::Admin) || user.has_role(Role::Staff)),
        None => Ok(false),
    });

    Ok(routes)
}

/// Navigate to `target` if `user` may access it.
///
/// Unauthenticated users are redirected to `/login` with the requested path
/// in `redirect`. Unauthorized navigation leaves the router untouched.
/// Targets that resolve to no declared route are handed to the router as
/// is, which records the failure.
pub fn navigate_guarded<H: History + 'static>(
    router: &Router<H, User>,
    target: impl Into<RouteTarget>,
    user: Option<&User>,
) -> GuardResult {
    let target = target.into();
    let route = router.with_state(|state| resolve(&target, &state.routes));

    let Some(access) = router.check_route_access(&route.template, user) else {
        router.navigate_to(target);
        return GuardResult::allow();
    };

    match access.reason {
        None => router.navigate_to(target),
        Some(DenialReason::Authentication) => {
            tracing::info!(path = %route.path, "Sign-in required, redirecting to login");
            router.navigate_to(
                RouteTarget::template("/login").with_query_param("redirect", route.path.clone()),
            );
        },
        Some(DenialReason::Authorization) => {
            tracing::warn!(
                template = %route.template,
                message = access.message.as_deref().unwrap_or_default(),
                "Navigation denied"
            );
        },
    }
    access
}

/// Where a successful sign-in should land: the `redirect` query parameter of
/// the current `/login` route, else `/clients`.
#[must_use]
pub fn post_login_target<H: History + 'static>(router: &Router<H, User>) -> RouteTarget {
    let redirect = router
        .current_route()
        .filter(|route| route.template == "/login")
        .and_then(|route| route.query_param("redirect").map(str::to_string));

    match redirect {
        Some(path) => RouteTarget::from(path),
        None => RouteTarget::template("/clients").with_query_param("page", "1"),
    }
}
