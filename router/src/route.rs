//! Route value types.
//!
//! [`ParsedRoute`] is what the router stores and what hosts render from;
//! [`RouteTarget`] is what hosts hand to `navigate_to`/`redirect_to`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered parameter map (route or query parameters).
pub type Params = IndexMap<String, String>;

/// A navigation target resolved against the route table.
///
/// Presence of the optional maps is part of the contract:
/// - `route_params` is present iff the matched template has parameter segments
/// - `query_params` is present (possibly empty) iff the route declares at least
///   one expected query parameter
///
/// Serializes with camelCase keys and omits absent maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRoute {
    /// The matched template, or the literal target when nothing matched.
    pub template: String,

    /// The concrete path.
    pub path: String,

    /// Values bound from `:name` segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_params: Option<Params>,

    /// Query parameters restricted to the route's expected names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<Params>,
}

impl ParsedRoute {
    /// A route with no parameters of either kind.
    #[must_use]
    pub fn new(template: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            path: path.into(),
            route_params: None,
            query_params: None,
        }
    }

    /// The literal fallback: the string is both template and path.
    ///
    /// Used for unmatched targets and markers such as `browser_back`.
    #[must_use]
    pub fn literal(target: impl Into<String>) -> Self {
        let target = target.into();
        Self::new(target.clone(), target)
    }

    /// Attach route parameters.
    #[must_use]
    pub fn with_route_params(mut self, params: Params) -> Self {
        self.route_params = Some(params);
        self
    }

    /// Attach query parameters.
    #[must_use]
    pub fn with_query_params(mut self, params: Params) -> Self {
        self.query_params = Some(params);
        self
    }

    /// Look up a route parameter.
    #[must_use]
    pub fn route_param(&self, name: &str) -> Option<&str> {
        self.route_params.as_ref()?.get(name).map(String::as_str)
    }

    /// Look up a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.as_ref()?.get(name).map(String::as_str)
    }
}

/// Where to navigate.
///
/// Either a bare path/URL string (optionally with `?query`) or a structured
/// descriptor naming a template and its parameters.
///
/// # Example
///
/// ```
/// use waypoint_router::RouteTarget;
///
/// let by_url = RouteTarget::from("/users/123?tab=profile");
/// let by_template = RouteTarget::template("/users/:id")
///     .with_route_param("id", "123")
///     .with_query_param("tab", "profile");
/// # let _ = (by_url, by_template);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteTarget {
    /// A path or URL string.
    Url(String),

    /// A template with parameters to substitute.
    #[serde(rename_all = "camelCase")]
    Route {
        /// Route template, e.g. `/clients/:id`.
        template: String,
        /// Values for the template's `:name` segments.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        route_params: Option<Params>,
        /// Query parameters to append.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query_params: Option<Params>,
    },
}

impl RouteTarget {
    /// Start a structured target for `template`.
    #[must_use]
    pub fn template(template: impl Into<String>) -> Self {
        Self::Route {
            template: template.into(),
            route_params: None,
            query_params: None,
        }
    }

    /// Add a route parameter. Converts a `Url` target into a literal template.
    #[must_use]
    pub fn with_route_param(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (template, mut route_params, query_params) = self.into_parts();
        route_params
            .get_or_insert_with(Params::new)
            .insert(name.into(), value.into());
        Self::Route {
            template,
            route_params,
            query_params,
        }
    }

    /// Add a query parameter. Converts a `Url` target into a literal template.
    #[must_use]
    pub fn with_query_param(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (template, route_params, mut query_params) = self.into_parts();
        query_params
            .get_or_insert_with(Params::new)
            .insert(name.into(), value.into());
        Self::Route {
            template,
            route_params,
            query_params,
        }
    }

    fn into_parts(self) -> (String, Option<Params>, Option<Params>) {
        match self {
            Self::Url(url) => (url, None, None),
            Self::Route {
                template,
                route_params,
                query_params,
            } => (template, route_params, query_params),
        }
    }
}

impl From<&str> for RouteTarget {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for RouteTarget {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<ParsedRoute> for RouteTarget {
    fn from(route: ParsedRoute) -> Self {
        Self::Route {
            template: route.template,
            route_params: route.route_params,
            query_params: route.query_params,
        }
    }
}

/// Build a [`Params`] map from pairs.
///
/// ```
/// let params = waypoint_router::params([("id", "123")]);
/// assert_eq!(params["id"], "123");
/// ```
pub fn params<K, V, I>(pairs: I) -> Params
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_serialization_omits_absent_maps() {
        let root = ParsedRoute::new("/", "/");
        assert_eq!(
            serde_json::to_value(&root).unwrap(),
            serde_json::json!({ "template": "/", "path": "/" })
        );

        let login = ParsedRoute::new("/login", "/login").with_query_params(Params::new());
        assert_eq!(
            serde_json::to_value(&login).unwrap(),
            serde_json::json!({ "template": "/login", "path": "/login", "queryParams": {} })
        );
    }

    #[test]
    fn test_target_builders() {
        let target = RouteTarget::template("/clients/:id")
            .with_route_param("id", "7")
            .with_query_param("tab", "cars");

        assert_eq!(
            target,
            RouteTarget::Route {
                template: "/clients/:id".into(),
                route_params: Some(params([("id", "7")])),
                query_params: Some(params([("tab", "cars")])),
            }
        );
    }

    #[test]
    fn test_target_deserializes_both_shapes() {
        let url: RouteTarget = serde_json::from_str(r#""/clients?page=2""#).unwrap();
        assert_eq!(url, RouteTarget::from("/clients?page=2"));

        let route: RouteTarget =
            serde_json::from_str(r#"{ "template": "/clients/:id", "routeParams": { "id": "9" } }"#)
                .unwrap();
        assert_eq!(route, RouteTarget::template("/clients/:id").with_route_param("id", "9"));
    }

    #[test]
    fn test_param_accessors() {
        let route = ParsedRoute::new("/users/:id", "/users/1")
            .with_route_params(params([("id", "1")]))
            .with_query_params(params([("tab", "profile")]));

        assert_eq!(route.route_param("id"), Some("1"));
        assert_eq!(route.query_param("tab"), Some("profile"));
        assert_eq!(route.query_param("missing"), None);
        assert_eq!(ParsedRoute::literal("browser_back").route_param("id"), None);
    }
}
