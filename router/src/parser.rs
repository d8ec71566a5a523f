//! Route resolution.
//!
//! Turns a [`RouteTarget`] into a canonical [`ParsedRoute`] using the route
//! table. Resolution never fails: anything that cannot be matched becomes a
//! literal route whose template and path are the input itself.
//!
//! Relative strings (`/clients/7`, `/clients?page=2`, `browser_back`) are
//! split at `?` by hand. Their path is matched raw, with or without a query,
//! and only the query is form-decoded. Absolute URLs are parsed with [`Url`],
//! which percent-encodes the path (`a b` becomes `a%20b`), so bound values
//! come back in their serialized form. In both cases the path is
//! trailing-slash-normalized and the query filtered to the route's expected
//! parameters.

use crate::matcher::fill_template;
use crate::route::{Params, ParsedRoute, RouteTarget};
use crate::table::RouteTable;
use url::form_urlencoded;
use url::{ParseError, Url};

/// Resolve a navigation target against `routes`.
///
/// ```
/// use waypoint_router::{parser::resolve, params, RouteConfig, RouteTable};
///
/// let routes: RouteTable = RouteTable::new()
///     .route("/", RouteConfig::new())
///     .route("/clients/:id/cars/:carId", RouteConfig::new().with_query_params(["action", "modal"]));
///
/// let route = resolve(&"/clients/123/cars/456?action=edit&modal=true&x=1".into(), &routes);
/// assert_eq!(route.template, "/clients/:id/cars/:carId");
/// assert_eq!(route.path, "/clients/123/cars/456");
/// assert_eq!(route.route_params, Some(params([("id", "123"), ("carId", "456")])));
/// assert_eq!(route.query_params, Some(params([("action", "edit"), ("modal", "true")])));
///
/// let root = resolve(&"/".into(), &routes);
/// assert_eq!((root.route_params, root.query_params), (None, None));
/// ```
#[must_use]
pub fn resolve<U>(target: &RouteTarget, routes: &RouteTable<U>) -> ParsedRoute {
    match target {
        RouteTarget::Route {
            template,
            route_params,
            query_params,
        } => resolve_descriptor(template, route_params.as_ref(), query_params.as_ref()),
        RouteTarget::Url(target) => match Url::parse(target) {
            Ok(url) => resolve_url(&url, routes),
            Err(ParseError::RelativeUrlWithoutBase) => resolve_relative(target, routes),
            Err(error) => {
                tracing::debug!(route_target = target.as_str(), %error, "Unparseable route target, using literal fallback");
                ParsedRoute::literal(target.as_str())
            },
        },
    }
}

fn resolve_descriptor(
    template: &str,
    route_params: Option<&Params>,
    query_params: Option<&Params>,
) -> ParsedRoute {
    let mut path = route_params.map_or_else(
        || template.to_string(),
        |params| fill_template(template, params),
    );
    if let Some(query) = query_params.filter(|query| !query.is_empty()) {
        path.push('?');
        path.push_str(&encode_query(query));
    }

    ParsedRoute {
        template: template.to_string(),
        path,
        route_params: route_params.cloned(),
        query_params: query_params.cloned(),
    }
}

fn resolve_url<U>(url: &Url, routes: &RouteTable<U>) -> ParsedRoute {
    let path = normalize_path(url.path());
    match_url(url, path, routes).unwrap_or_else(|| ParsedRoute::literal(path))
}

fn resolve_relative<U>(target: &str, routes: &RouteTable<U>) -> ParsedRoute {
    let without_fragment = target.split_once('#').map_or(target, |(rest, _)| rest);
    let (path, query) = without_fragment.split_once('?').unwrap_or((without_fragment, ""));
    let path = normalize_path(path);

    match_path(path, routes, |name| {
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    })
    .unwrap_or_else(|| ParsedRoute::literal(path))
}

/// Match an already normalized path, pulling expected query values from `url`.
pub(crate) fn match_url<U>(url: &Url, path: &str, routes: &RouteTable<U>) -> Option<ParsedRoute> {
    match_path(path, routes, |name| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    })
}

/// Match `path` against the table, filling expected query parameters via
/// `lookup` in the route's declared order.
fn match_path<U, F>(path: &str, routes: &RouteTable<U>, lookup: F) -> Option<ParsedRoute>
where
    F: Fn(&str) -> Option<String>,
{
    let (template, matched) = routes.find_match(path)?;
    let config = routes.get(template)?;

    let mut route = ParsedRoute::new(template, path);
    if !matched.params.is_empty() {
        route.route_params = Some(matched.params);
    }
    if config.expects_query_params() {
        let query = config
            .expected_query_params
            .iter()
            .filter_map(|name| lookup(name).map(|value| (name.clone(), value)))
            .collect();
        route.query_params = Some(query);
    }

    tracing::trace!(template, path, "Resolved route");
    Some(route)
}

/// Strip one trailing slash; an empty path becomes `/`.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    match path.strip_suffix('/').unwrap_or(path) {
        "" => "/",
        stripped => stripped,
    }
}

/// `application/x-www-form-urlencoded` serialization, in insertion order.
///
/// ```
/// use waypoint_router::{parser::encode_query, params};
///
/// assert_eq!(encode_query(&params([("search", "Jane Doe"), ("page", "2")])), "search=Jane+Doe&page=2");
/// ```
#[must_use]
pub fn encode_query(query: &Params) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish()
}
