//! Navigation effects.
//!
//! The boundary between the router and the host's history. Reads the current
//! URL, builds URLs from templates and pushes, replaces, traverses or
//! redirects through a [`History`] implementation.
//!
//! # URL building
//!
//! Query parameters are form-URL-encoded in insertion order. Route parameters
//! are substituted verbatim: callers pre-encode path values if they need to.
//!
//! ```
//! use std::sync::Arc;
//! use waypoint_router::mocks::MemoryHistory;
//! use waypoint_router::{params, NavigationEffects, RouterConfig};
//!
//! let history = Arc::new(MemoryHistory::new("http://localhost:3000/"));
//! let navigation = NavigationEffects::new(history, &RouterConfig::default()).unwrap();
//!
//! let url = navigation.build_url(
//!     "/clients/:id",
//!     &params([("id", "a b")]),
//!     &params([("tab", "cars & trucks")]),
//! );
//! assert_eq!(url, "http://localhost:3000/clients/a b?tab=cars+%26+trucks");
//! ```

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::history::{History, HistoryError};
use crate::matcher::fill_template;
use crate::parser::{encode_query, match_url, normalize_path, resolve};
use crate::route::{Params, ParsedRoute, RouteTarget};
use crate::table::RouteTable;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Navigation through the host failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The URL cannot be resolved against the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The host's history rejected the operation.
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Navigation capability bundle: the host history plus the base URL.
pub struct NavigationEffects<H> {
    history: Arc<H>,
    base_url: Url,
}

impl<H: History> NavigationEffects<H> {
    /// Create navigation effects over `history`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidBaseUrl`] if the configured base URL
    /// does not parse.
    pub fn new(history: Arc<H>, config: &RouterConfig) -> Result<Self, RouterError> {
        Ok(Self {
            history,
            base_url: config.parsed_base_url()?,
        })
    }

    /// The underlying host history.
    #[must_use]
    pub const fn history(&self) -> &Arc<H> {
        &self.history
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Current path: base path stripped, trailing slash stripped, `/` when empty.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.current_url()
            .map_or_else(|| "/".to_string(), |url| self.app_path(&url).to_string())
    }

    /// [`current_path`](Self::current_path) plus `?query` when present.
    #[must_use]
    pub fn current_path_with_query(&self) -> String {
        let Some(url) = self.current_url() else {
            return "/".to_string();
        };

        let mut path = self.app_path(&url).to_string();
        if let Some(query) = url.query().filter(|query| !query.is_empty()) {
            path.push('?');
            path.push_str(query);
        }
        path
    }

    /// The route the host is currently on, or `None` if no template matches.
    #[must_use]
    pub fn current_route<U>(&self, routes: &RouteTable<U>) -> Option<ParsedRoute> {
        let url = self.current_url()?;
        match_url(&url, self.app_path(&url), routes)
    }

    /// The route an absolute or base-relative URL points at.
    #[must_use]
    pub fn route_from_url<U>(&self, url: &str, routes: &RouteTable<U>) -> Option<ParsedRoute> {
        let url = self.base_url.join(url).ok()?;
        match_url(&url, self.app_path(&url), routes)
    }

    /// Resolve a navigation target with the base path taken into account.
    ///
    /// Absolute URLs are matched on their path below the base path, so
    /// [`build_url`](Self::build_url) output resolves back to its template.
    /// Relative strings and descriptors go through [`resolve`].
    #[must_use]
    pub fn resolve_target<U>(&self, target: &RouteTarget, routes: &RouteTable<U>) -> ParsedRoute {
        let RouteTarget::Url(raw) = target else {
            return resolve(target, routes);
        };
        let Ok(url) = Url::parse(raw) else {
            return resolve(target, routes);
        };

        let path = self.app_path(&url);
        match_url(&url, path, routes).unwrap_or_else(|| ParsedRoute::literal(path))
    }

    /// Absolute URL for a template and its parameters.
    #[must_use]
    pub fn build_url(&self, template: &str, route_params: &Params, query_params: &Params) -> String {
        let mut url = format!("{}{}", self.base_url(), fill_template(template, route_params));
        if !query_params.is_empty() {
            url.push('?');
            url.push_str(&encode_query(query_params));
        }
        url
    }

    /// Append a history entry.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the host refuses.
    pub fn push_url(&self, url: &str) -> Result<(), HistoryError> {
        tracing::debug!(url, "Pushing history entry");
        self.history.push_url(url)
    }

    /// Replace the current history entry.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the host refuses.
    pub fn replace_url(&self, url: &str) -> Result<(), HistoryError> {
        tracing::debug!(url, "Replacing history entry");
        self.history.replace_url(url)
    }

    /// Traverse one entry back.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if traversal fails.
    pub fn go_back(&self) -> Result<(), HistoryError> {
        self.history.go_back()
    }

    /// Traverse one entry forward.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if traversal fails.
    pub fn go_forward(&self) -> Result<(), HistoryError> {
        self.history.go_forward()
    }

    /// Full navigation, abandoning in-app state.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the host refuses.
    pub fn hard_redirect(&self, url: &str) -> Result<(), HistoryError> {
        tracing::debug!(url, "Hard redirect");
        self.history.redirect(url)
    }

    /// Build a URL and push it.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::History`] if the push fails.
    pub fn navigate_to_route(
        &self,
        template: &str,
        route_params: &Params,
        query_params: &Params,
    ) -> Result<(), NavigationError> {
        Ok(self.push_url(&self.build_url(template, route_params, query_params))?)
    }

    /// Build a URL and replace the current entry with it.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::History`] if the replace fails.
    pub fn replace_route(
        &self,
        template: &str,
        route_params: &Params,
        query_params: &Params,
    ) -> Result<(), NavigationError> {
        Ok(self.replace_url(&self.build_url(template, route_params, query_params))?)
    }

    /// Build a URL and hard-redirect to it.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::History`] if the redirect fails.
    pub fn redirect_to_route(
        &self,
        template: &str,
        route_params: &Params,
        query_params: &Params,
    ) -> Result<(), NavigationError> {
        Ok(self.hard_redirect(&self.build_url(template, route_params, query_params))?)
    }

    /// Push a raw URL.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::InvalidUrl`] if the URL does not resolve
    /// against the base URL, or [`NavigationError::History`] if the push fails.
    pub fn navigate_to_url(&self, url: &str) -> Result<(), NavigationError> {
        if !self.is_valid_url(url) {
            tracing::error!(url, "Invalid URL");
            return Err(NavigationError::InvalidUrl(url.to_string()));
        }
        Ok(self.push_url(url)?)
    }

    /// Hard-redirect to a raw URL.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::InvalidUrl`] if the URL does not resolve
    /// against the base URL, or [`NavigationError::History`] if the redirect fails.
    pub fn redirect_to_url(&self, url: &str) -> Result<(), NavigationError> {
        if !self.is_valid_url(url) {
            tracing::error!(url, "Invalid URL");
            return Err(NavigationError::InvalidUrl(url.to_string()));
        }
        Ok(self.hard_redirect(url)?)
    }

    /// Whether `url` leaves the origin the host is currently on.
    ///
    /// Relative URLs resolve against the current URL. Opaque origins
    /// (`mailto:`, `data:`) count as external. Unparseable URLs are not
    /// external. An unreadable current URL falls back to the base URL.
    #[must_use]
    pub fn is_external(&self, url: &str) -> bool {
        let current = self.current_url().unwrap_or_else(|| self.base_url.clone());
        current
            .join(url)
            .is_ok_and(|resolved| resolved.origin() != current.origin())
    }

    /// Whether `url` resolves against the base URL.
    ///
    /// Nearly every short string does, as a relative path.
    #[must_use]
    pub fn is_valid_url(&self, url: &str) -> bool {
        self.base_url.join(url).is_ok()
    }

    /// Whether `template` is declared in `routes`.
    #[must_use]
    pub fn validate_route<U>(&self, template: &str, routes: &RouteTable<U>) -> bool {
        routes.contains(template)
    }

    /// Declared templates, in order.
    #[must_use]
    pub fn route_templates<'a, U>(&self, routes: &'a RouteTable<U>) -> Vec<&'a str> {
        routes.templates()
    }

    fn current_url(&self) -> Option<Url> {
        let href = self.history.current_href();
        match Url::parse(&href) {
            Ok(url) => Some(url),
            Err(error) => {
                tracing::error!(href, %error, "Error reading current URL");
                None
            },
        }
    }

    /// Pathname relative to the base path, normalized.
    fn app_path<'u>(&self, url: &'u Url) -> &'u str {
        let base_path = self.base_url.path().trim_end_matches('/');
        let path = url.path();
        let relative = path
            .strip_prefix(base_path)
            .filter(|rest| !base_path.is_empty() && (rest.is_empty() || rest.starts_with('/')))
            .unwrap_or(path);
        normalize_path(relative)
    }
}

impl<H> std::fmt::Debug for NavigationEffects<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationEffects")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::mocks::MemoryHistory;
    use crate::route::params;
    use crate::table::RouteConfig;

    fn navigation(href: &str, base_url: &str) -> NavigationEffects<MemoryHistory> {
        NavigationEffects::new(Arc::new(MemoryHistory::new(href)), &RouterConfig::new(base_url)).unwrap()
    }

    fn routes() -> RouteTable {
        RouteTable::new()
            .route("/", RouteConfig::new())
            .route("/clients", RouteConfig::new().with_query_params(["search", "page"]))
            .route("/clients/:id", RouteConfig::new())
    }

    #[test]
    fn test_base_url_trailing_slash_removed() {
        assert_eq!(navigation("http://localhost:3000/", "http://localhost:3000/").base_url(), "http://localhost:3000");
        assert_eq!(
            navigation("http://x.test/app/", "http://x.test/app/").base_url(),
            "http://x.test/app"
        );
    }

    #[test]
    fn test_current_path_normalization() {
        let base = "http://localhost:3000";
        assert_eq!(navigation("http://localhost:3000", base).current_path(), "/");
        assert_eq!(navigation("http://localhost:3000/clients/", base).current_path(), "/clients");
        assert_eq!(
            navigation("http://localhost:3000/clients/?page=2", base).current_path_with_query(),
            "/clients?page=2"
        );
        assert_eq!(navigation("http://localhost:3000/clients?", base).current_path_with_query(), "/clients");
    }

    #[test]
    fn test_current_path_strips_base_path() {
        let base = "http://x.test/admin";
        assert_eq!(navigation("http://x.test/admin", base).current_path(), "/");
        assert_eq!(navigation("http://x.test/admin/clients", base).current_path(), "/clients");
        assert_eq!(navigation("http://x.test/administrator", base).current_path(), "/administrator");
    }

    #[test]
    fn test_unparseable_href_reads_as_root() {
        let navigation = navigation("not a url", "http://localhost:3000");
        assert_eq!(navigation.current_path(), "/");
        assert_eq!(navigation.current_path_with_query(), "/");
        assert_eq!(navigation.current_route(&routes()), None);
    }

    #[test]
    fn test_current_route_filters_query() {
        let navigation = navigation("http://localhost:3000/clients?search=a%20b&x=1", "http://localhost:3000");
        let route = navigation.current_route(&routes()).unwrap();
        assert_eq!(route.template, "/clients");
        assert_eq!(route.query_params, Some(params([("search", "a b")])));
    }

    #[test]
    fn test_route_from_url() {
        let navigation = navigation("http://localhost:3000/", "http://localhost:3000");
        let route = navigation.route_from_url("/clients/5", &routes()).unwrap();
        assert_eq!(route.route_param("id"), Some("5"));
        assert!(navigation.route_from_url("/nope/nope", &routes()).is_none());
    }

    #[test]
    fn test_build_url_without_query() {
        let navigation = navigation("http://localhost:3000/", "http://localhost:3000");
        assert_eq!(
            navigation.build_url("/clients/:id", &params([("id", "7")]), &Params::new()),
            "http://localhost:3000/clients/7"
        );
    }

    #[test]
    fn test_navigate_and_replace_delegate() {
        let navigation = navigation("http://localhost:3000/", "http://localhost:3000");
        navigation
            .navigate_to_route("/clients", &Params::new(), &params([("page", "2")]))
            .unwrap();
        navigation
            .replace_route("/clients", &Params::new(), &params([("page", "3")]))
            .unwrap();

        assert_eq!(navigation.history().len(), 2);
        assert_eq!(navigation.current_path_with_query(), "/clients?page=3");
    }

    #[test]
    fn test_external_urls() {
        let navigation = navigation("http://localhost:3000/", "http://localhost:3000");
        assert!(!navigation.is_external("/clients"));
        assert!(!navigation.is_external("http://localhost:3000/a"));
        assert!(navigation.is_external("https://example.com"));
        assert!(navigation.is_external("http://localhost:4000/"));
        assert!(navigation.is_external("mailto:someone@example.com"));
        assert!(!navigation.is_external("http://[::1"));
    }

    #[test]
    fn test_external_is_relative_to_current_origin() {
        let staging = navigation("http://staging.test:8080/clients", "http://localhost:3000");
        assert!(!staging.is_external("/clients/5"));
        assert!(!staging.is_external("http://staging.test:8080/admin"));
        assert!(staging.is_external("http://localhost:3000/clients"));

        let unreadable = navigation("not a url", "http://localhost:3000");
        assert!(!unreadable.is_external("http://localhost:3000/clients"));
        assert!(unreadable.is_external("https://example.com"));
    }

    #[test]
    fn test_resolve_target_strips_base_path() {
        let navigation = navigation("http://x.test/app/", "http://x.test/app");
        let routes = routes();

        let url = navigation.build_url("/clients", &Params::new(), &params([("page", "2")]));
        let route = navigation.resolve_target(&url.as_str().into(), &routes);
        assert_eq!(route.template, "/clients");
        assert_eq!(route.path, "/clients");
        assert_eq!(route.query_param("page"), Some("2"));

        assert_eq!(
            navigation.resolve_target(&"http://x.test/app/nope/nope".into(), &routes),
            ParsedRoute::literal("/nope/nope")
        );
        assert_eq!(
            navigation.resolve_target(&"/clients/5".into(), &routes).route_param("id"),
            Some("5")
        );
    }

    #[test]
    fn test_valid_urls() {
        let navigation = navigation("http://localhost:3000/", "http://localhost:3000");
        assert!(navigation.is_valid_url("clients"));
        assert!(navigation.is_valid_url("https://example.com"));
        assert!(!navigation.is_valid_url("http://[::1"));

        assert_eq!(
            navigation.navigate_to_url("http://[::1"),
            Err(NavigationError::InvalidUrl("http://[::1".into()))
        );
        assert_eq!(navigation.history().len(), 1);
    }

    #[test]
    fn test_history_failure_surfaces() {
        let navigation = navigation("http://localhost:3000/", "http://localhost:3000");
        navigation.history().fail_next(HistoryError::Push("quota".into()));
        assert_eq!(
            navigation.navigate_to_url("/clients"),
            Err(NavigationError::History(HistoryError::Push("quota".into())))
        );
    }

    #[test]
    fn test_validate_and_list_templates() {
        let navigation = navigation("http://localhost:3000/", "http://localhost:3000");
        let routes = routes();
        assert!(navigation.validate_route("/clients/:id", &routes));
        assert!(!navigation.validate_route("/clients/1", &routes));
        assert_eq!(navigation.route_templates(&routes), vec!["/", "/clients", "/clients/:id"]);
    }
}
