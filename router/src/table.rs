//! The route table: templates and what each route expects.

use crate::config::RouteTableConfig;
use crate::error::RouterError;
use crate::guard::{Guard, GuardError};
use crate::matcher::{match_route, RouteMatch};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Configuration attached to one template.
pub struct RouteConfig<U> {
    /// Query parameter names this route surfaces, in order. Anything else in
    /// the URL is dropped.
    pub expected_query_params: Vec<String>,

    /// Whether an absent user is denied before the guard runs.
    pub requires_authentication: bool,

    /// Optional authorization predicate.
    pub guard: Option<Guard<U>>,
}

impl<U> RouteConfig<U> {
    /// A route with no expected query parameters, open to anyone.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            expected_query_params: Vec::new(),
            requires_authentication: false,
            guard: None,
        }
    }

    /// Declare the expected query parameters.
    #[must_use]
    pub fn with_query_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_query_params = names.into_iter().map(Into::into).collect();
        self
    }

    /// Require an authenticated user.
    #[must_use]
    pub const fn requires_authentication(mut self) -> Self {
        self.requires_authentication = true;
        self
    }

    /// Attach a fallible guard.
    #[must_use]
    pub fn with_guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(Option<&U>) -> Result<bool, GuardError> + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }

    /// Attach an infallible guard.
    #[must_use]
    pub fn with_predicate<F>(self, predicate: F) -> Self
    where
        F: Fn(Option<&U>) -> bool + Send + Sync + 'static,
    {
        self.with_guard(move |user| Ok(predicate(user)))
    }

    /// Whether the route declares at least one expected query parameter.
    #[must_use]
    pub fn expects_query_params(&self) -> bool {
        !self.expected_query_params.is_empty()
    }
}

impl<U> Default for RouteConfig<U> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impls: a derive would demand `U: Clone`/`U: Debug`.
impl<U> Clone for RouteConfig<U> {
    fn clone(&self) -> Self {
        Self {
            expected_query_params: self.expected_query_params.clone(),
            requires_authentication: self.requires_authentication,
            guard: self.guard.clone(),
        }
    }
}

impl<U> fmt::Debug for RouteConfig<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteConfig")
            .field("expected_query_params", &self.expected_query_params)
            .field("requires_authentication", &self.requires_authentication)
            .field("guard", &self.guard.as_ref().map(|_| "<guard>"))
            .finish()
    }
}

impl<U> PartialEq for RouteConfig<U> {
    /// Guards compare by identity.
    fn eq(&self, other: &Self) -> bool {
        let same_guard = match (&self.guard, &other.guard) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        same_guard
            && self.requires_authentication == other.requires_authentication
            && self.expected_query_params == other.expected_query_params
    }
}

/// Template → configuration, in declared order.
///
/// Declared order matters: [`RouteTable::find_match`] returns the first
/// template that fits, with no specificity ranking. Declare
/// `/clients/new` before `/clients/:id`.
///
/// ```
/// use waypoint_router::{RouteConfig, RouteTable};
///
/// let routes: RouteTable = RouteTable::new()
///     .route("/", RouteConfig::new())
///     .route("/clients/new", RouteConfig::new())
///     .route("/clients/:id", RouteConfig::new().with_query_params(["tab"]));
///
/// let (template, hit) = routes.find_match("/clients/new").unwrap();
/// assert_eq!(template, "/clients/new");
/// assert!(hit.params.is_empty());
/// ```
pub struct RouteTable<U = ()> {
    routes: IndexMap<String, RouteConfig<U>>,
}

impl<U> RouteTable<U> {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: IndexMap::new(),
        }
    }

    /// Add (or replace in place) the configuration for `template`.
    #[must_use]
    pub fn route(mut self, template: impl Into<String>, config: RouteConfig<U>) -> Self {
        self.routes.insert(template.into(), config);
        self
    }

    /// Attach a guard to an already declared template.
    ///
    /// Unknown templates are left alone; returns whether the guard was set.
    pub fn guard<F>(&mut self, template: &str, guard: F) -> bool
    where
        F: Fn(Option<&U>) -> Result<bool, GuardError> + Send + Sync + 'static,
    {
        match self.routes.get_mut(template) {
            Some(config) => {
                config.guard = Some(Arc::new(guard));
                true
            },
            None => {
                tracing::warn!(template, "Cannot attach guard to undeclared route");
                false
            },
        }
    }

    /// Load a table from its JSON form.
    ///
    /// ```
    /// use waypoint_router::RouteTable;
    ///
    /// let routes: RouteTable = RouteTable::from_json(
    ///     r#"{ "/": {}, "/users/:id": { "params": ["tab"], "requiresAuth": true } }"#,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(routes.templates(), vec!["/", "/users/:id"]);
    /// assert!(routes.get("/users/:id").unwrap().requires_authentication);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::RouteTable`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, RouterError> {
        let config: RouteTableConfig = serde_json::from_str(json)?;
        Ok(Self::from(config))
    }

    /// Configuration for an exact template.
    #[must_use]
    pub fn get(&self, template: &str) -> Option<&RouteConfig<U>> {
        self.routes.get(template)
    }

    /// Whether `template` is declared.
    #[must_use]
    pub fn contains(&self, template: &str) -> bool {
        self.routes.contains_key(template)
    }

    /// Declared templates, in order.
    #[must_use]
    pub fn templates(&self) -> Vec<&str> {
        self.routes.keys().map(String::as_str).collect()
    }

    /// Iterate `(template, config)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteConfig<U>)> {
        self.routes.iter().map(|(template, config)| (template.as_str(), config))
    }

    /// Number of declared templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no template is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// First template (in declared order) matching a normalized path.
    #[must_use]
    pub fn find_match(&self, path: &str) -> Option<(&str, RouteMatch)> {
        self.routes.keys().find_map(|template| {
            let result = match_route(template, path);
            result.matched.then_some((template.as_str(), result))
        })
    }
}

impl<U> Default for RouteTable<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> Clone for RouteTable<U> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
        }
    }
}

impl<U> fmt::Debug for RouteTable<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.routes.iter()).finish()
    }
}

impl<U> PartialEq for RouteTable<U> {
    fn eq(&self, other: &Self) -> bool {
        self.routes.len() == other.routes.len()
            && self
                .routes
                .iter()
                .zip(other.routes.iter())
                .all(|(a, b)| a == b)
    }
}

impl<U, S: Into<String>> FromIterator<(S, RouteConfig<U>)> for RouteTable<U> {
    fn from_iter<I: IntoIterator<Item = (S, RouteConfig<U>)>>(iter: I) -> Self {
        Self {
            routes: iter
                .into_iter()
                .map(|(template, config)| (template.into(), config))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn client_routes() -> RouteTable {
        RouteTable::new()
            .route("/", RouteConfig::new())
            .route("/clients", RouteConfig::new().with_query_params(["search", "page"]))
            .route("/clients/new", RouteConfig::new())
            .route("/clients/:id", RouteConfig::new())
            .route(
                "/clients/:id/cars/:carId",
                RouteConfig::new().with_query_params(["action", "modal"]),
            )
    }

    #[test]
    fn test_declared_order_is_preserved() {
        assert_eq!(
            client_routes().templates(),
            vec!["/", "/clients", "/clients/new", "/clients/:id", "/clients/:id/cars/:carId"]
        );
    }

    #[test]
    fn test_first_match_wins() {
        let routes = client_routes();
        assert_eq!(routes.find_match("/clients/new").unwrap().0, "/clients/new");

        let (template, hit) = routes.find_match("/clients/42").unwrap();
        assert_eq!(template, "/clients/:id");
        assert_eq!(hit.params["id"], "42");
    }

    #[test]
    fn test_declared_order_beats_specificity() {
        let routes: RouteTable = RouteTable::new()
            .route("/clients/:id", RouteConfig::new())
            .route("/clients/new", RouteConfig::new());
        assert_eq!(routes.find_match("/clients/new").unwrap().0, "/clients/:id");
    }

    #[test]
    fn test_reinsert_replaces_in_place() {
        let routes = client_routes().route("/clients", RouteConfig::new());
        assert_eq!(routes.len(), 5);
        assert_eq!(routes.templates()[1], "/clients");
        assert!(!routes.get("/clients").unwrap().expects_query_params());
    }

    #[test]
    fn test_no_match() {
        assert!(client_routes().find_match("/settings").is_none());
        assert!(RouteTable::<()>::new().find_match("/").is_none());
    }

    #[test]
    fn test_attach_guard() {
        let mut routes = client_routes();
        assert!(routes.guard("/clients/new", |_| Ok(false)));
        assert!(!routes.guard("/missing", |_| Ok(true)));
        assert!(routes.get("/clients/new").unwrap().guard.is_some());
    }

    #[test]
    fn test_clone_keeps_guard_identity() {
        let mut routes = client_routes();
        routes.guard("/", |_| Ok(true));
        assert_eq!(routes.clone(), routes);
        assert_ne!(routes, client_routes());
    }

    #[test]
    fn test_debug_hides_guard() {
        let config = RouteConfig::<()>::new().with_predicate(|_| true);
        assert!(format!("{config:?}").contains("<guard>"));
    }
}
